//! Recorded history of the pieces applied to a dataset.
//!
//! A [`History`] is the ordered list of pieces that produced a dataset. It is
//! additive only: merging appends newly applied pieces after the existing ones
//! and never drops or reorders an entry. Replaying a history against another
//! dataset runs the same pieces in the same order, now in predict mode.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::{MungeError, Result};
use crate::piece::{PieceParams, PieceRef};

/// Ordered, shared list of applied pieces.
///
/// Cloning a history clones the `Arc`s, not the pieces. Two histories are equal
/// when they hold the same pieces (by identity) in the same order.
#[derive(Clone, Debug, Default)]
pub struct History {
    pieces: Vec<PieceRef>,
}

impl History {
    pub fn new(pieces: Vec<PieceRef>) -> Self {
        Self { pieces }
    }

    pub fn pieces(&self) -> &[PieceRef] {
        &self.pieces
    }

    pub fn into_pieces(self) -> Vec<PieceRef> {
        self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PieceRef> {
        self.pieces.iter()
    }

    /// Names of the pieces in order (`None` for unnamed pieces).
    pub fn names(&self) -> Vec<Option<&str>> {
        self.pieces.iter().map(|p| p.name()).collect()
    }

    /// Merge newly applied pieces into an existing history.
    ///
    /// With nothing applied the existing history is returned verbatim (an
    /// absent history stays absent). Otherwise the result is the existing
    /// pieces followed by the applied ones.
    pub fn merge(existing: Option<History>, applied: &[PieceRef]) -> Option<History> {
        if applied.is_empty() {
            return existing;
        }
        let mut pieces = existing.map(History::into_pieces).unwrap_or_default();
        pieces.extend(applied.iter().cloned());
        Some(History::new(pieces))
    }

    /// Snapshot the learned parameters of every piece, in order.
    pub fn extract_params(&self) -> HistoryParams {
        HistoryParams {
            pieces: self.pieces.iter().map(|p| p.extract_params()).collect(),
        }
    }

    /// Load parameters into the pieces of this history, position by position.
    ///
    /// # Errors
    /// - [`MungeError::ParamsMismatch`] if the lengths differ
    /// - [`MungeError::Serialization`] if a named entry does not match the
    ///   name of the piece at its position
    ///
    /// Every pairing is checked first; on error no piece is modified.
    pub fn restore_params(&self, params: HistoryParams) -> Result<()> {
        if params.pieces.len() != self.pieces.len() {
            return Err(MungeError::ParamsMismatch {
                expected: self.pieces.len(),
                got: params.pieces.len(),
            });
        }
        for (piece, piece_params) in self.pieces.iter().zip(&params.pieces) {
            piece.check_params(piece_params)?;
        }
        for (piece, piece_params) in self.pieces.iter().zip(params.pieces) {
            piece.restore_params(piece_params)?;
        }
        Ok(())
    }

    /// Save the learned parameters of every piece to a file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(&self.extract_params())?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl PartialEq for History {
    fn eq(&self, other: &Self) -> bool {
        self.pieces.len() == other.pieces.len()
            && self
                .pieces
                .iter()
                .zip(&other.pieces)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl From<Vec<PieceRef>> for History {
    fn from(pieces: Vec<PieceRef>) -> Self {
        Self::new(pieces)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a PieceRef;
    type IntoIter = std::slice::Iter<'a, PieceRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.pieces.iter()
    }
}

/// Serializable learned parameters of a whole history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryParams {
    pub pieces: Vec<PieceParams>,
}

impl HistoryParams {
    /// Load parameters written by [`History::save_to_file`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    /// Human-readable dump for inspection.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
