//! Configuration for pipeline runs.

use log::Level;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options for one orchestration call.
///
/// # Example
/// ```rust
/// use mungeflow::config::PipelineConfig;
///
/// let quiet = PipelineConfig::default().with_progress(false);
/// assert!(!quiet.announce_progress);
///
/// let parsed = PipelineConfig::from_json(r#"{"announce_progress": false}"#).unwrap();
/// assert_eq!(parsed, quiet);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Emit a progress notice naming each named piece before it runs.
    pub announce_progress: bool,
    /// Log level of progress notices.
    pub progress_level: Level,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            announce_progress: true,
            progress_level: Level::Info,
        }
    }
}

impl PipelineConfig {
    pub fn with_progress(mut self, announce: bool) -> Self {
        self.announce_progress = announce;
        self
    }

    pub fn with_progress_level(mut self, level: Level) -> Self {
        self.progress_level = level;
        self
    }

    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!(config.announce_progress);
        assert_eq!(config.progress_level, Level::Info);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PipelineConfig::default()
            .with_progress(false)
            .with_progress_level(Level::Debug);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(PipelineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(PipelineConfig::from_json("not json").is_err());
    }
}
