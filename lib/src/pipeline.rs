//! Orchestration entry points.
//!
//! [`apply_pipeline`] normalizes the specs, runs the resulting pieces in order
//! against a handle wrapping the dataset, and records them on the output as
//! history after whatever history the input already had.
//!
//! # Example
//!
//! ```rust
//! use mungeflow::dataset::Dataset;
//! use mungeflow::normalize::Spec;
//! use mungeflow::piece::Procedure;
//! use mungeflow::pipeline::apply_pipeline;
//!
//! fn scale(factor: f64) -> Procedure {
//!     Procedure::new(move |data, _inv| {
//!         for v in data.float_column_mut("X")? {
//!             *v *= factor;
//!         }
//!         Ok(())
//!     })
//! }
//!
//! let train = Dataset::new().with_column("X", vec![1.0, 2.0, 3.0]).unwrap();
//! let trained = apply_pipeline(train, [Spec::pair(scale(2.0), scale(3.0))]).unwrap();
//! assert_eq!(trained.float_column("X").unwrap(), &[2.0, 4.0, 6.0]);
//!
//! // Replay the recorded pieces, now in predict mode, on fresh data.
//! let fresh = Dataset::new().with_column("X", vec![1.0, 2.0, 3.0]).unwrap();
//! let replayed = apply_pipeline(fresh, [Spec::from(&trained)]).unwrap();
//! assert_eq!(replayed.float_column("X").unwrap(), &[3.0, 6.0, 9.0]);
//! ```

use crate::config::PipelineConfig;
use crate::dataset::{Dataset, DatasetHandle};
use crate::error::Result;
use crate::executor::execute;
use crate::history::History;
use crate::normalize::{normalize, Spec};

/// Apply the pieces described by `specs` to `dataset` with the default config.
pub fn apply_pipeline<I>(dataset: Dataset, specs: I) -> Result<Dataset>
where
    I: IntoIterator<Item = Spec>,
{
    apply_pipeline_with(dataset, specs, &PipelineConfig::default())
}

/// Apply the pieces described by `specs` to `dataset`.
///
/// The returned dataset carries the input's history followed by the pieces
/// just applied. If no piece results from `specs` the dataset is returned
/// untouched.
pub fn apply_pipeline_with<I>(
    mut dataset: Dataset,
    specs: I,
    config: &PipelineConfig,
) -> Result<Dataset>
where
    I: IntoIterator<Item = Spec>,
{
    apply_pipeline_in_place(&mut dataset, specs, config)?;
    Ok(dataset)
}

/// Apply the pieces described by `specs` to `dataset` in place.
///
/// On failure the dataset keeps any column changes made by the pieces that
/// already ran, but its history is exactly what it was before the call. Such
/// a dataset must not be used as a replay source.
pub fn apply_pipeline_in_place<I>(
    dataset: &mut Dataset,
    specs: I,
    config: &PipelineConfig,
) -> Result<()>
where
    I: IntoIterator<Item = Spec>,
{
    let pieces = normalize(specs)?;
    if pieces.is_empty() {
        return Ok(());
    }

    let existing = dataset.take_history();
    let mut run = RunGuard {
        handle: DatasetHandle::wrap(std::mem::take(dataset)),
        history: existing,
        slot: dataset,
    };

    execute(&mut run.handle, &pieces, config)?;

    let merged = History::merge(run.history.take(), &pieces);
    log::debug!(
        "recorded {} piece(s) in history ({} total)",
        pieces.len(),
        merged.as_ref().map_or(0, History::len)
    );
    run.history = merged;
    Ok(())
}

/// Puts the dataset back into the caller's slot when the run ends, including
/// by error or panic, with whichever history is current at that point.
struct RunGuard<'a> {
    slot: &'a mut Dataset,
    handle: DatasetHandle,
    history: Option<History>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *self.slot = std::mem::take(&mut *self.handle);
        self.slot.set_history(self.history.take());
    }
}
