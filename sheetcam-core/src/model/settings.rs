//! Machining settings attached to operations and assignments.

use serde::{Deserialize, Serialize};

use super::OffsetSide;

/// Cutter geometry family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    #[default]
    Endmill,
    Ballnose,
    VBit,
}

/// Cutting tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Cutter diameter in mm.
    pub diameter: f64,
    /// Number of flutes.
    pub flutes: u32,
    /// Cutter type.
    #[serde(rename = "type", default)]
    pub tool_type: ToolType,
}

impl Tool {
    /// Two-flute flat end mill of the given diameter.
    pub fn endmill(diameter: f64) -> Self {
        Self {
            diameter,
            flutes: 2,
            tool_type: ToolType::Endmill,
        }
    }
}

/// Feed rates in mm/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedRate {
    /// Horizontal feed.
    pub xy: f64,
    /// Plunge feed.
    pub z: f64,
}

/// Milling direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutDirection {
    #[default]
    Climb,
    Conventional,
}

/// Holding tabs left on the final pass of a profile cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TabSettings {
    pub enabled: bool,
    /// Height of the bridge above the final pass Z.
    pub height: f64,
    /// Length of each bridge along the path.
    pub width: f64,
    /// Number of bridges per path.
    pub count: u32,
}

impl TabSettings {
    /// Tabs switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            height: 0.0,
            width: 0.0,
            count: 0,
        }
    }
}

/// Pocket clearing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PocketPattern {
    /// Successive inward offsets of the boundary.
    #[default]
    ContourParallel,
    /// Alternating-direction horizontal scanlines.
    Raster,
}

/// Settings that only make sense for one operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation_type", rename_all = "snake_case")]
pub enum KindSettings {
    Contour,
    Pocket {
        pattern: PocketPattern,
        /// Step between rings/scanlines as a fraction of the tool diameter.
        stepover: f64,
    },
    Drill {
        /// Depth of each peck.
        peck_depth: f64,
    },
}

/// Complete set of cutting parameters for one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachiningSettings {
    /// Kind-specific parameters.
    pub operation: KindSettings,
    pub tool: Tool,
    pub feed_rate: FeedRate,
    /// Rapid move speed in mm/s.
    pub jog_speed: f64,
    /// Spindle speed in RPM.
    pub spindle_speed: u32,
    pub depth_per_pass: f64,
    pub total_depth: f64,
    pub direction: CutDirection,
    pub offset_side: OffsetSide,
    pub tabs: TabSettings,
}

impl MachiningSettings {
    /// Depth of a single Z step for this operation.
    ///
    /// Drill operations step by their peck depth, everything else by
    /// `depth_per_pass`.
    pub fn step_depth(&self) -> f64 {
        match self.operation {
            KindSettings::Drill { peck_depth } => peck_depth,
            _ => self.depth_per_pass,
        }
    }
}
