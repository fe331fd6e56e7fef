//! Trailing configuration a piece is called with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::Value;

/// Arguments handed to a procedure on every run: the target columns plus
/// named options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PieceArgs {
    /// Column names the piece operates on.
    pub columns: Vec<String>,
    /// Named options, e.g. a fill value.
    pub options: BTreeMap<String, Value>,
}

impl PieceArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments targeting the given columns.
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_builder() {
        let args = PieceArgs::columns(["X", "Y"]).with_option("fill", 0.0);
        assert_eq!(args.columns, vec!["X".to_string(), "Y".to_string()]);
        assert_eq!(args.option("fill"), Some(&Value::Float(0.0)));
        assert!(args.option("missing").is_none());
    }
}
