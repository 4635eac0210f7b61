//! Pipeline configuration. Every field has a default, so a partial document
//! (or none at all) is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::control::ControllerConfig;
use crate::error::{Result, SignalError};
use crate::optimizer::OptimizerConfig;
use crate::tracker::TrackerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Approach the camera watches; stamped onto every detection.
    pub approach_id: String,
    pub tracker: TrackerConfig,
    pub optimizer: OptimizerConfig,
    pub controller: ControllerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            approach_id: "N".to_string(),
            tracker: TrackerConfig::default(),
            optimizer: OptimizerConfig::default(),
            controller: ControllerConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SignalError::io(path, e))?;
        Self::from_json_str(&text)
    }
}
