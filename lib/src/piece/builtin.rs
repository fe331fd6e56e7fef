//! Ready-made pieces for common numeric preprocessing.
//!
//! - [`standardize`]: Z-score normalization with the mean and population
//!   standard deviation learned at train time.
//! - [`impute`]: Fill NaN values with a statistic learned at train time.
//! - [`drop_columns`]: Remove columns; nothing is learned.
//!
//! Integer columns are widened to floats by the numeric pieces.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::dataset::{ColumnData, ColumnType};
use crate::error::{MungeError, Result};

use super::column::column_transformation;
use super::procedure::{Invocation, Procedure};
use super::{MungePiece, PieceArgs};

/// Statistic used to fill missing (NaN) values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Mean of the non-missing training values.
    Mean,
    /// Median of the non-missing training values.
    Median,
    /// A fixed value.
    Constant(f64),
}

/// Standardize the given columns: `z = (x - mean) / std`.
///
/// A column with zero standard deviation is only centered. Training fails
/// with [`MungeError::EmptyData`] on an empty column and with
/// [`MungeError::MissingValues`] if it contains NaN; impute first.
pub fn standardize<I, S>(columns: I) -> MungePiece
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let train = column_transformation(|data, inv| {
        let values = numeric(data, inv)?;
        let (mean, std) = mean_and_std(&values, inv.scope().unwrap_or_default())?;
        inv.learn("mean", mean)?;
        inv.learn("std", std)?;
        Ok(ColumnData::Float(
            values.iter().map(|x| (x - mean) / std).collect(),
        ))
    });
    let predict = column_transformation(|data, inv| {
        let values = numeric(data, inv)?;
        let mean = inv.learned_f64("mean")?;
        let std = inv.learned_f64("std")?;
        Ok(ColumnData::Float(
            values.iter().map(|x| (x - mean) / std).collect(),
        ))
    });

    MungePiece::new(train, predict)
        .with_name("standardize")
        .with_args(PieceArgs::columns(columns))
}

/// Replace NaN values in the given columns with a learned fill value.
///
/// A column with no non-missing training values is filled with `0.0`.
pub fn impute<I, S>(columns: I, strategy: ImputeStrategy) -> MungePiece
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let proc = column_transformation(move |data, inv| {
        let values = numeric(data, inv)?;
        if inv.is_training() {
            inv.learn("fill", fill_value(&values, &strategy))?;
        }
        let fill = inv.learned_f64("fill")?;
        Ok(ColumnData::Float(
            values
                .into_iter()
                .map(|v| if v.is_nan() { fill } else { v })
                .collect(),
        ))
    });

    MungePiece::from_procedure(proc)
        .with_name("impute")
        .with_args(PieceArgs::columns(columns))
}

/// Remove the given columns. Missing columns are an error.
pub fn drop_columns<I, S>(columns: I) -> MungePiece
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let proc = Procedure::new(|data, inv| {
        for name in &inv.args().columns {
            data.remove_column(name)?;
        }
        Ok(())
    });

    MungePiece::from_procedure(proc)
        .with_name("drop_columns")
        .with_args(PieceArgs::columns(columns))
}

fn numeric(data: &ColumnData, inv: &Invocation<'_>) -> Result<Vec<f64>> {
    data.to_floats().ok_or_else(|| MungeError::ColumnTypeMismatch {
        name: inv.scope().unwrap_or_default().to_string(),
        expected: ColumnType::Float,
        found: data.column_type(),
    })
}

/// Mean and population standard deviation (ddof = 0); zero std becomes 1.
fn mean_and_std(values: &[f64], column: &str) -> Result<(f64, f64)> {
    if values.is_empty() {
        return Err(MungeError::EmptyData(format!(
            "cannot standardize empty column {}",
            column
        )));
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(MungeError::MissingValues(format!(
            "column {} contains NaN; impute before standardizing",
            column
        )));
    }
    let view = ArrayView1::from(values);
    let mean = view.mean().unwrap_or(0.0);
    let std = view.std(0.0);
    let std = if std == 0.0 || !std.is_finite() { 1.0 } else { std };
    Ok((mean, std))
}

fn fill_value(values: &[f64], strategy: &ImputeStrategy) -> f64 {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return match strategy {
            ImputeStrategy::Constant(v) => *v,
            _ => 0.0,
        };
    }
    match strategy {
        ImputeStrategy::Mean => ArrayView1::from(&present[..]).mean().unwrap_or(0.0),
        ImputeStrategy::Median => {
            let mut sorted = present;
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let n = sorted.len();
            if n % 2 == 0 {
                (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
            } else {
                sorted[n / 2]
            }
        }
        ImputeStrategy::Constant(v) => *v,
    }
}
