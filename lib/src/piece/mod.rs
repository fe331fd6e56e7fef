//! Transformation pieces: reusable, stateful train/predict steps.
//!
//! A [`MungePiece`] couples a [`MungeBit`] (the train and predict procedures
//! plus their trained flag and learned state) with the arguments each
//! procedure is called with. Pieces are shared as [`PieceRef`] between the
//! input dataset's history, the sequence being executed and the output
//! dataset's history; they are never cloned during a run, so the state they
//! learn is visible to whoever replays them later.
//!
//! # Example
//!
//! ```rust
//! use mungeflow::dataset::{Dataset, DatasetHandle};
//! use mungeflow::piece::{Mode, MungePiece, Procedure};
//!
//! let double = Procedure::new(|data, _inv| {
//!     for v in data.float_column_mut("X")? {
//!         *v *= 2.0;
//!     }
//!     Ok(())
//! });
//! let triple = Procedure::new(|data, _inv| {
//!     for v in data.float_column_mut("X")? {
//!         *v *= 3.0;
//!     }
//!     Ok(())
//! });
//! let piece = MungePiece::new(double, triple).with_name("scale");
//!
//! let data = Dataset::new().with_column("X", vec![1.0, 2.0]).unwrap();
//! let mut handle = DatasetHandle::wrap(data);
//! assert_eq!(piece.run(&mut handle).unwrap(), Mode::Train);
//! assert_eq!(piece.run(&mut handle).unwrap(), Mode::Predict);
//! assert_eq!(handle.float_column("X").unwrap(), &[6.0, 12.0]);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::dataset::DatasetHandle;
use crate::error::{MungeError, Result};

mod args;
mod bit;
pub mod builtin;
mod column;
mod procedure;
mod value;

pub use self::args::PieceArgs;
pub use self::bit::MungeBit;
pub use self::column::column_transformation;
pub use self::procedure::{Invocation, Mode, Procedure};
pub use self::value::{LearnedState, Value};

/// Shared handle to a piece.
pub type PieceRef = Arc<MungePiece>;

/// Serializable snapshot of what a piece has learned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceParams {
    /// Display name of the piece, if it has one.
    pub name: Option<String>,
    /// Whether the piece had been trained.
    pub trained: bool,
    /// Learned parameters.
    pub state: LearnedState,
}

/// A train/predict step together with the arguments it runs with.
pub struct MungePiece {
    name: Option<String>,
    bit: MungeBit,
    train_args: PieceArgs,
    predict_args: PieceArgs,
}

impl MungePiece {
    /// Piece with distinct train and predict procedures.
    pub fn new(train: Procedure, predict: Procedure) -> Self {
        Self::from_bit(MungeBit::new(train, predict))
    }

    /// Piece whose train and predict behaviour is the same procedure.
    ///
    /// The procedure can still branch on [`Invocation::mode`].
    pub fn from_procedure(procedure: Procedure) -> Self {
        Self::new(procedure.clone(), procedure)
    }

    pub fn from_bit(bit: MungeBit) -> Self {
        Self {
            name: None,
            bit,
            train_args: PieceArgs::default(),
            predict_args: PieceArgs::default(),
        }
    }

    /// Name shown in progress notices.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Use the same arguments for training and prediction.
    pub fn with_args(mut self, args: PieceArgs) -> Self {
        self.predict_args = args.clone();
        self.train_args = args;
        self
    }

    pub fn with_train_args(mut self, args: PieceArgs) -> Self {
        self.train_args = args;
        self
    }

    pub fn with_predict_args(mut self, args: PieceArgs) -> Self {
        self.predict_args = args;
        self
    }

    /// See [`MungeBit::enforce_train`].
    pub fn enforce_train(mut self, enforce: bool) -> Self {
        self.bit = self.bit.enforce_train(enforce);
        self
    }

    pub fn into_ref(self) -> PieceRef {
        Arc::new(self)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn bit(&self) -> &MungeBit {
        &self.bit
    }

    pub fn train_args(&self) -> &PieceArgs {
        &self.train_args
    }

    pub fn predict_args(&self) -> &PieceArgs {
        &self.predict_args
    }

    pub fn is_trained(&self) -> bool {
        self.bit.is_trained()
    }

    /// Snapshot of the learned parameters.
    pub fn learned(&self) -> LearnedState {
        self.bit.learned()
    }

    /// Run against the handle's dataset, training on first use and replaying
    /// afterwards. Returns the mode that ran.
    pub fn run(&self, handle: &mut DatasetHandle) -> Result<Mode> {
        self.bit.run(handle, &self.train_args, &self.predict_args)
    }

    pub fn extract_params(&self) -> PieceParams {
        PieceParams {
            name: self.name.clone(),
            trained: self.bit.is_trained(),
            state: self.bit.learned(),
        }
    }

    /// Load previously extracted parameters into this piece.
    ///
    /// # Errors
    /// Returns [`MungeError::Serialization`] if both the piece and the
    /// parameters are named and the names differ.
    pub fn restore_params(&self, params: PieceParams) -> Result<()> {
        self.check_params(&params)?;
        self.bit.restore(params.trained, params.state);
        Ok(())
    }

    /// Whether `params` may be restored into this piece, without touching it.
    pub(crate) fn check_params(&self, params: &PieceParams) -> Result<()> {
        if let (Some(ours), Some(theirs)) = (&self.name, &params.name) {
            if ours != theirs {
                return Err(MungeError::Serialization(format!(
                    "parameters for '{}' cannot restore piece '{}'",
                    theirs, ours
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for MungePiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MungePiece")
            .field("name", &self.name)
            .field("trained", &self.bit.is_trained())
            .field("train_args", &self.train_args)
            .field("predict_args", &self.predict_args)
            .finish()
    }
}
