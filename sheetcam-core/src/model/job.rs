//! Job document consumed by the pipeline.

use serde::{Deserialize, Serialize};

use super::{OperationAssignment, PlacementItem, SolidDescriptor, StockSettings};
use crate::config::PostProcessorConfig;
use crate::detect::DetectOptions;
use crate::error::{CamError, Result};
use crate::nesting::NestingOptions;

/// A complete machining job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    pub solids: Vec<SolidDescriptor>,
    pub stock: StockSettings,
    /// User assignments; derived from detected operations when empty.
    #[serde(default)]
    pub assignments: Vec<OperationAssignment>,
    /// User placements; nesting fills them in when empty and `nest` is set.
    #[serde(default)]
    pub placements: Vec<PlacementItem>,
    /// Run automatic nesting when no placements are given.
    #[serde(default)]
    pub nest: bool,
    #[serde(default)]
    pub post_processor: PostProcessorConfig,
    #[serde(default)]
    pub detection: DetectOptions,
    #[serde(default)]
    pub nesting: NestingOptions,
}

impl Job {
    /// Parse a job from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a job from a JSON file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Err(CamError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Err(CamError::EmptyFile {
                path: path.to_path_buf(),
            });
        }
        Self::from_json_str(&content)
    }
}
