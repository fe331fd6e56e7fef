//! Shared fixtures for the mungeflow benchmarks.
//!
//! Datasets are generated deterministically so runs are comparable without any
//! external data files.

use mungeflow::piece::builtin::{impute, standardize, ImputeStrategy};
use mungeflow::{Dataset, Result, Spec};

/// Column names used by [`synthetic_dataset`].
pub fn feature_names(n_features: usize) -> Vec<String> {
    (0..n_features).map(|i| format!("f{}", i)).collect()
}

/// Float table with `n_rows` rows and `n_features` columns.
///
/// Every seventh value is NaN so imputation has work to do.
pub fn synthetic_dataset(n_rows: usize, n_features: usize) -> Result<Dataset> {
    let mut data = Dataset::new();
    for (j, name) in feature_names(n_features).iter().enumerate() {
        let values: Vec<f64> = (0..n_rows)
            .map(|i| {
                if (i + j) % 7 == 0 {
                    f64::NAN
                } else {
                    ((i * 31 + j * 17) % 101) as f64 * 0.5
                }
            })
            .collect();
        data = data.with_column(name, values)?;
    }
    Ok(data)
}

/// Impute-then-standardize over every feature column.
pub fn preprocessing_specs(n_features: usize) -> Vec<Spec> {
    let names = feature_names(n_features);
    vec![
        Spec::from(impute(names.clone(), ImputeStrategy::Mean)),
        Spec::from(standardize(names)),
    ]
}
