//! # mungeflow
//!
//! Replayable data-munging pipelines with a strict separation between the
//! training and prediction phases.
//!
//! ## Core Design Principles
//!
//! - **Train once, replay forever**: Every piece runs its train procedure the
//!   first time it is applied and its predict procedure every time after,
//!   reusing what it learned.
//! - **History travels with the data**: A dataset produced by
//!   [`apply_pipeline`] records the pieces that made it. Passing that dataset
//!   back as the only spec replays the same pieces, in the same order, on new
//!   data.
//! - **Shared, not copied**: Pieces are reference counted. The history of the
//!   training output and every replay point at the same pieces.
//! - **Fail fast**: The first failing piece aborts the run; the output history
//!   is never updated by a failed run.
//!
//! ## Quick Start
//!
//! ```rust
//! use mungeflow::piece::builtin::{impute, standardize, ImputeStrategy};
//! use mungeflow::{apply_pipeline, Dataset, Spec};
//!
//! let train = Dataset::new()
//!     .with_column("age", vec![20.0, f64::NAN, 40.0])
//!     .unwrap();
//!
//! let trained = apply_pipeline(
//!     train,
//!     vec![
//!         Spec::from(impute(["age"], ImputeStrategy::Mean)),
//!         Spec::from(standardize(["age"])),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(trained.history().unwrap().len(), 2);
//!
//! // Same pieces, predict mode, statistics learned from `train`.
//! let test = Dataset::new().with_column("age", vec![f64::NAN]).unwrap();
//! let replayed = apply_pipeline(test, [Spec::from(&trained)]).unwrap();
//! assert_eq!(replayed.float_column("age").unwrap(), &[0.0]);
//! ```
//!
//! ## Module Structure
//!
//! - `dataset`: Named columns plus the recorded history
//! - `piece`: Procedures, learned state and ready-made pieces
//! - `normalize`: Call-site shorthand resolved into pieces
//! - `executor`: Sequential, fail-fast execution
//! - `history`: Additive history merging and parameter persistence
//! - `pipeline`: The `apply_pipeline` entry points
//! - `config`: Progress reporting options
//! - `error`: Crate-wide error type

pub mod config;
pub mod dataset;
pub mod error;
pub mod executor;
pub mod history;
pub mod normalize;
pub mod piece;
pub mod pipeline;

pub use config::PipelineConfig;
pub use dataset::{Dataset, DatasetHandle, HISTORY_PROPERTY};
pub use error::{MungeError, Result};
pub use history::{History, HistoryParams};
pub use normalize::Spec;
pub use piece::{Invocation, Mode, MungePiece, PieceArgs, PieceRef, Procedure};
pub use pipeline::{apply_pipeline, apply_pipeline_in_place, apply_pipeline_with};
