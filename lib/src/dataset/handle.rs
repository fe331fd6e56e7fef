//! Mutable wrapper that owns a dataset while a pipeline runs.

use std::ops::{Deref, DerefMut};

use super::Dataset;

/// Single-owner handle around a [`Dataset`].
///
/// Pieces receive `&mut DatasetHandle` and mutate the wrapped dataset in place,
/// so no step has to return and thread a new copy. The handle is unwrapped
/// exactly once, with [`DatasetHandle::into_inner`], when the run ends.
#[derive(Debug)]
pub struct DatasetHandle {
    inner: Dataset,
}

impl DatasetHandle {
    /// Take ownership of a dataset for the duration of a run.
    pub fn wrap(dataset: Dataset) -> Self {
        Self { inner: dataset }
    }

    /// Release the dataset with its final column contents.
    pub fn into_inner(self) -> Dataset {
        self.inner
    }
}

impl From<Dataset> for DatasetHandle {
    fn from(dataset: Dataset) -> Self {
        Self::wrap(dataset)
    }
}

impl Deref for DatasetHandle {
    type Target = Dataset;

    fn deref(&self) -> &Dataset {
        &self.inner
    }
}

impl DerefMut for DatasetHandle {
    fn deref_mut(&mut self) -> &mut Dataset {
        &mut self.inner
    }
}
