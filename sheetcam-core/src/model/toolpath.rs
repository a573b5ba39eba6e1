//! Generated toolpaths.

use serde::{Deserialize, Serialize};

use super::{MachiningSettings, Point2};
use crate::error::SkipReason;

/// Index range of a pass path lifted to a bridge height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TabSegment {
    /// First lifted vertex (inclusive).
    pub start_index: usize,
    /// Last lifted vertex (inclusive).
    pub end_index: usize,
    /// Z of the bridge top.
    pub z_tab: f64,
}

impl TabSegment {
    /// Whether a vertex index falls inside this tab.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index
    }
}

/// One constant-Z traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolpathPass {
    /// 1-based pass number.
    pub pass_number: u32,
    pub z_depth: f64,
    pub path: Vec<Point2>,
    #[serde(default)]
    pub tabs: Vec<TabSegment>,
}

impl ToolpathPass {
    /// Z to cut vertex `index` at, honoring tabs.
    pub fn z_at(&self, index: usize) -> f64 {
        self.tabs
            .iter()
            .find(|t| t.contains(index))
            .map(|t| t.z_tab)
            .unwrap_or(self.z_depth)
    }
}

/// Ordered passes of one path of one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toolpath {
    pub operation_id: String,
    pub passes: Vec<ToolpathPass>,
    /// Settings snapshot used for emission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<MachiningSettings>,
}

impl Toolpath {
    /// First vertex of the first pass.
    pub fn start_point(&self) -> Option<Point2> {
        self.passes.first().and_then(|p| p.path.first().copied())
    }
}

/// Output of the toolpath generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolpathResult {
    pub toolpaths: Vec<Toolpath>,
    /// Sheet width of the resolved stock (X).
    pub stock_width: Option<f64>,
    /// Sheet depth of the resolved stock (Y).
    pub stock_depth: Option<f64>,
    /// Assignments dropped during generation.
    #[serde(skip)]
    pub skipped: Vec<SkipReason>,
}
