//! Per-column procedures.

use std::collections::BTreeSet;

use crate::dataset::ColumnData;
use crate::error::{MungeError, Result};

use super::procedure::{Invocation, Procedure};

/// Build a procedure that applies `f` to every column named in the
/// invocation's `args.columns`, replacing each column with the result.
///
/// Each call of `f` gets an invocation scoped to the column name, so a
/// parameter learned as `"mean"` for column `X` is stored as `"X/mean"` and
/// columns never overwrite each other's state. A column named twice would
/// share one scope, so duplicates fail with [`MungeError::DuplicateColumn`]
/// before any column is touched.
pub fn column_transformation<F>(f: F) -> Procedure
where
    F: Fn(&ColumnData, &mut Invocation<'_>) -> Result<ColumnData> + Send + Sync + 'static,
{
    Procedure::new(move |data, invocation| {
        let columns = &invocation.args().columns;
        let mut seen = BTreeSet::new();
        if let Some(dup) = columns.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(MungeError::DuplicateColumn(dup.clone()));
        }
        for name in columns {
            let column = data.require(name)?;
            let updated = f(column.data(), &mut invocation.scoped(name))?;
            data.insert_column(name, updated)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, DatasetHandle};
    use crate::piece::{MungePiece, PieceArgs};

    fn shift_by_first() -> MungePiece {
        let proc = column_transformation(|data, inv| {
            let values = data.as_floats().unwrap_or_default();
            if inv.is_training() {
                inv.learn("first", values.first().copied().unwrap_or(0.0))?;
            }
            let first = inv.learned_f64("first")?;
            Ok(ColumnData::Float(values.iter().map(|v| v - first).collect()))
        });
        MungePiece::from_procedure(proc).with_args(PieceArgs::columns(["A", "B"]))
    }

    #[test]
    fn test_state_is_scoped_per_column() {
        let piece = shift_by_first();
        let data = Dataset::new()
            .with_column("A", vec![1.0, 2.0])
            .unwrap()
            .with_column("B", vec![10.0, 20.0])
            .unwrap();
        let mut handle = DatasetHandle::wrap(data);
        piece.run(&mut handle).unwrap();

        assert_eq!(handle.float_column("A").unwrap(), &[0.0, 1.0]);
        assert_eq!(handle.float_column("B").unwrap(), &[0.0, 10.0]);
        let learned = piece.learned();
        assert_eq!(learned.get("A/first").and_then(|v| v.as_f64()), Some(1.0));
        assert_eq!(learned.get("B/first").and_then(|v| v.as_f64()), Some(10.0));
    }

    #[test]
    fn test_missing_column_fails() {
        let piece = shift_by_first();
        let data = Dataset::new().with_column("A", vec![1.0]).unwrap();
        let result = piece.run(&mut DatasetHandle::wrap(data));
        assert!(matches!(result, Err(MungeError::ColumnNotFound(name)) if name == "B"));
    }

    #[test]
    fn test_duplicate_target_column_is_rejected() {
        let proc = column_transformation(|data, inv| {
            let values = data.as_floats().unwrap_or_default();
            if inv.is_training() {
                inv.learn("first", values.first().copied().unwrap_or(0.0))?;
            }
            let first = inv.learned_f64("first")?;
            Ok(ColumnData::Float(values.iter().map(|v| v - first + 1.0).collect()))
        });
        let piece = MungePiece::from_procedure(proc).with_args(PieceArgs::columns(["X", "X"]));
        let mut handle = DatasetHandle::wrap(Dataset::new().with_column("X", vec![5.0, 7.0]).unwrap());

        let result = piece.run(&mut handle);
        assert!(matches!(result, Err(MungeError::DuplicateColumn(name)) if name == "X"));
        assert_eq!(handle.float_column("X").unwrap(), &[5.0, 7.0]);
        assert!(!piece.is_trained());
    }
}
