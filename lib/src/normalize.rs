//! Resolving call-site shorthand into a canonical sequence of pieces.
//!
//! Callers describe the transformations to apply with [`Spec`] values. Every
//! shape is resolved here, once, into [`PieceRef`]s; nothing downstream looks
//! at a `Spec` again.
//!
//! Recognized forms, in priority order:
//! 1. No specs: an empty sequence.
//! 2. A single [`Spec::Replay`]: the pieces of that history, unchanged.
//! 3. A single [`Spec::List`] whose elements each describe one piece: the
//!    list is unpacked and each element parsed.
//! 4. Otherwise every spec is parsed into exactly one piece by [`parse_piece`].

use crate::dataset::Dataset;
use crate::error::{MungeError, Result};
use crate::history::History;
use crate::piece::{MungePiece, PieceArgs, PieceRef, Procedure};

/// Shorthand for one or more pieces.
#[derive(Clone, Debug)]
pub enum Spec {
    /// One procedure used for both training and prediction.
    Procedure(Procedure),
    /// Distinct train and predict procedures.
    Pair { train: Procedure, predict: Procedure },
    /// An already constructed piece; passed through as is.
    Piece(PieceRef),
    /// A procedure or pair plus the arguments to call it with.
    Configured { spec: Box<Spec>, args: PieceArgs },
    /// Several specs wrapped in one argument.
    List(Vec<Spec>),
    /// Replay the recorded history of another dataset.
    Replay(History),
}

impl Spec {
    pub fn pair(train: Procedure, predict: Procedure) -> Self {
        Spec::Pair { train, predict }
    }

    /// Replay the pieces recorded on `dataset` (none if it has no history).
    pub fn replay(dataset: &Dataset) -> Self {
        Spec::Replay(dataset.history().cloned().unwrap_or_default())
    }

    /// Attach trailing arguments, e.g. the target columns.
    pub fn with_args(self, args: PieceArgs) -> Self {
        Spec::Configured {
            spec: Box::new(self),
            args,
        }
    }

    /// Whether this spec has the shape of a single piece.
    fn describes_piece(&self) -> bool {
        matches!(
            self,
            Spec::Procedure(_) | Spec::Pair { .. } | Spec::Piece(_) | Spec::Configured { .. }
        )
    }
}

impl From<Procedure> for Spec {
    fn from(procedure: Procedure) -> Self {
        Spec::Procedure(procedure)
    }
}

impl From<(Procedure, Procedure)> for Spec {
    fn from((train, predict): (Procedure, Procedure)) -> Self {
        Spec::Pair { train, predict }
    }
}

impl From<PieceRef> for Spec {
    fn from(piece: PieceRef) -> Self {
        Spec::Piece(piece)
    }
}

impl From<MungePiece> for Spec {
    fn from(piece: MungePiece) -> Self {
        Spec::Piece(piece.into_ref())
    }
}

impl From<&Dataset> for Spec {
    fn from(dataset: &Dataset) -> Self {
        Spec::replay(dataset)
    }
}

impl From<History> for Spec {
    fn from(history: History) -> Self {
        Spec::Replay(history)
    }
}

impl From<Vec<Spec>> for Spec {
    fn from(specs: Vec<Spec>) -> Self {
        Spec::List(specs)
    }
}

/// Resolve call-site specs into the ordered pieces to run.
///
/// # Errors
/// [`MungeError::Normalization`] naming the 1-based position of the first
/// spec that cannot be resolved. No piece has run at that point.
pub fn normalize<I>(specs: I) -> Result<Vec<PieceRef>>
where
    I: IntoIterator<Item = Spec>,
{
    let specs: Vec<Spec> = specs.into_iter().collect();
    if specs.is_empty() {
        return Ok(Vec::new());
    }

    // A dataset-typed single argument wins over list unpacking.
    let specs = match <[Spec; 1]>::try_from(specs) {
        Ok([Spec::Replay(history)]) => return Ok(history.into_pieces()),
        Ok([Spec::List(items)]) if items.iter().all(Spec::describes_piece) => items,
        Ok([single]) => vec![single],
        Err(specs) => specs,
    };

    let pieces = specs
        .into_iter()
        .enumerate()
        .map(|(idx, spec)| parse_at(idx + 1, spec))
        .collect::<Result<Vec<_>>>()?;
    log::debug!("normalized {} piece(s)", pieces.len());
    Ok(pieces)
}

/// Parse one spec into exactly one piece.
///
/// A procedure becomes a piece that trains and predicts with it, a pair keeps
/// its two procedures, an existing piece is returned as is (same `Arc`).
pub fn parse_piece(spec: Spec) -> Result<PieceRef> {
    parse_at(1, spec)
}

fn parse_at(position: usize, spec: Spec) -> Result<PieceRef> {
    let fail = |reason: &str| MungeError::Normalization {
        position,
        reason: reason.to_string(),
    };

    match spec {
        Spec::Procedure(procedure) => Ok(MungePiece::from_procedure(procedure).into_ref()),
        Spec::Pair { train, predict } => Ok(MungePiece::new(train, predict).into_ref()),
        Spec::Piece(piece) => Ok(piece),
        Spec::Configured { spec, args } => match *spec {
            Spec::Procedure(procedure) => Ok(MungePiece::from_procedure(procedure)
                .with_args(args)
                .into_ref()),
            Spec::Pair { train, predict } => {
                Ok(MungePiece::new(train, predict).with_args(args).into_ref())
            }
            Spec::Piece(_) => Err(fail("an existing piece already carries its arguments")),
            Spec::Configured { .. } => Err(fail("arguments were attached twice")),
            Spec::List(_) => Err(fail("a list of specs cannot take arguments")),
            Spec::Replay(_) => Err(fail("a replayed history cannot take arguments")),
        },
        Spec::List(items) => Err(fail(&format!(
            "a list of {} specs does not describe a single piece",
            items.len()
        ))),
        Spec::Replay(_) => Err(fail(
            "a dataset can only be replayed when it is the only argument",
        )),
    }
}
