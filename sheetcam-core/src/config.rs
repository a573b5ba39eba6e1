//! Configuration constants and settings for the CAM pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CamError, Result};
use crate::model::{
    CutDirection, FeedRate, KindSettings, MachiningSettings, OffsetSide, OperationKind,
    PocketPattern, TabSettings, Tool,
};

/// Floating-point comparison epsilon.
pub const EPS: f64 = 0.0001;

/// How far the final through-cut pass goes below the stock bottom.
pub const PENETRATION_MARGIN: f64 = 0.3;

/// Decimal places kept on every emitted coordinate.
pub const COORD_DECIMALS: i32 = 4;

/// Tolerance when comparing a cylinder depth against the solid thickness.
pub const DEPTH_TOLERANCE: f64 = 0.01;

/// Scale factor for integer polygon clipping.
pub const CLIPPER_SCALE: f64 = 1000.0;

/// Allowed rotation increment in degrees.
pub const ROTATION_STEP_DEG: u16 = 45;

/// Default cutter diameter (1/4").
pub const DEFAULT_TOOL_DIAMETER: f64 = 6.35;

/// Grid step of the nesting position scan.
pub const NESTING_GRID_STEP: f64 = 5.0;

/// Default gap between nested parts, on top of the tool radius.
pub const DEFAULT_CLEARANCE: f64 = 5.0;

/// Smallest planar pocket region kept by the detector (mm²).
pub const MIN_POCKET_AREA: f64 = 1.0;

/// Segments used to polygonize a circular pocket.
pub const CIRCLE_SEGMENTS: usize = 64;

/// Spindle speeds below this trigger a warning.
pub const MIN_SPINDLE_SPEED: u32 = 5000;

/// Conversion factor: mm to inch.
pub const CONV_MM_INCH: f64 = 25.4;

/// Default retract height above the stock bottom.
pub const DEFAULT_SAFE_Z: f64 = 38.0;

/// Default ATC slot.
pub const DEFAULT_TOOL_NUMBER: u32 = 3;

/// Default spindle warm-up in seconds.
pub const DEFAULT_WARMUP_PAUSE: u32 = 2;

/// Unit of the emitted program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Mm,
    Inch,
}

impl Unit {
    /// Factor dividing millimeter values into this unit.
    pub fn from_mm_factor(&self) -> f64 {
        match self {
            Unit::Mm => 1.0,
            Unit::Inch => CONV_MM_INCH,
        }
    }

    /// First line of the program.
    pub fn header(&self) -> &'static str {
        match self {
            Unit::Mm => "'SHOPBOT ROUTER FILE IN MM",
            Unit::Inch => "'SHOPBOT ROUTER FILE IN INCHES",
        }
    }

    /// Guard jumping to the error label when the controller runs in the other unit.
    ///
    /// System variable 25 is 0 for inches and 1 for millimeters.
    pub fn guard(&self) -> &'static str {
        match self {
            Unit::Mm => "IF %(25)=0 THEN GOTO UNIT_ERROR",
            Unit::Inch => "IF %(25)=1 THEN GOTO UNIT_ERROR",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Mm => write!(f, "mm"),
            Unit::Inch => write!(f, "inch"),
        }
    }
}

/// Post-processor (machine) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessorConfig {
    pub machine_name: String,
    pub unit: Unit,
    /// Machine bed size `[x, y]` in mm.
    pub bed_size: [f64; 2],
    /// Retract height in mm.
    pub safe_z: f64,
    /// Park position `[x, y]` at program end.
    pub home_position: [f64; 2],
    pub tool_number: u32,
    /// Spindle warm-up in seconds.
    pub warmup_pause: u32,
}

impl Default for PostProcessorConfig {
    fn default() -> Self {
        Self {
            machine_name: "ShopBot PRS-alpha 96-48".to_string(),
            unit: Unit::Mm,
            bed_size: [1220.0, 2440.0],
            safe_z: DEFAULT_SAFE_Z,
            home_position: [0.0, 0.0],
            tool_number: DEFAULT_TOOL_NUMBER,
            warmup_pause: DEFAULT_WARMUP_PAUSE,
        }
    }
}

/// Default machining settings for each operation kind.
///
/// Built once and passed by reference wherever suggestions are needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindDefaults {
    pub contour: MachiningSettings,
    pub pocket: MachiningSettings,
    pub drill: MachiningSettings,
}

impl KindDefaults {
    /// Stock defaults for a 1/4" two-flute end mill in sheet goods.
    pub fn standard() -> Self {
        let tool = Tool::endmill(DEFAULT_TOOL_DIAMETER);
        Self {
            contour: MachiningSettings {
                operation: KindSettings::Contour,
                tool: tool.clone(),
                feed_rate: FeedRate { xy: 75.0, z: 25.0 },
                jog_speed: 200.0,
                spindle_speed: 18000,
                depth_per_pass: 6.0,
                total_depth: 18.0,
                direction: CutDirection::Climb,
                offset_side: OffsetSide::Outside,
                tabs: TabSettings {
                    enabled: true,
                    height: 8.0,
                    width: 5.0,
                    count: 4,
                },
            },
            pocket: MachiningSettings {
                operation: KindSettings::Pocket {
                    pattern: PocketPattern::ContourParallel,
                    stepover: 0.5,
                },
                tool: tool.clone(),
                feed_rate: FeedRate { xy: 60.0, z: 20.0 },
                jog_speed: 200.0,
                spindle_speed: 18000,
                depth_per_pass: 3.0,
                total_depth: 6.0,
                direction: CutDirection::Conventional,
                offset_side: OffsetSide::Inside,
                tabs: TabSettings::disabled(),
            },
            drill: MachiningSettings {
                operation: KindSettings::Drill { peck_depth: 6.0 },
                tool,
                feed_rate: FeedRate { xy: 50.0, z: 15.0 },
                jog_speed: 200.0,
                spindle_speed: 18000,
                depth_per_pass: 6.0,
                total_depth: 18.0,
                direction: CutDirection::Climb,
                offset_side: OffsetSide::None,
                tabs: TabSettings::disabled(),
            },
        }
    }

    /// Defaults for one kind.
    pub fn for_kind(&self, kind: OperationKind) -> &MachiningSettings {
        match kind {
            OperationKind::Contour => &self.contour,
            OperationKind::Pocket => &self.pocket,
            OperationKind::Drill => &self.drill,
        }
    }

    /// Defaults for one kind with the feature depth and tool diameter filled in.
    pub fn suggest(&self, kind: OperationKind, depth: f64, tool_diameter: f64) -> MachiningSettings {
        let mut settings = self.for_kind(kind).clone();
        settings.total_depth = depth;
        settings.tool.diameter = tool_diameter;
        settings
    }
}

impl Default for KindDefaults {
    fn default() -> Self {
        Self::standard()
    }
}

/// A named machining preset for one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetItem {
    pub id: String,
    pub name: String,
    #[serde(default = "unknown_material")]
    pub material: String,
    pub settings: MachiningSettings,
}

impl PresetItem {
    /// Cutting parameters of this preset laid over `settings`.
    ///
    /// Tool, speeds, step-down and direction come from the preset; the
    /// operation kind, total depth, offset side and tabs are kept.
    pub fn apply_to(&self, settings: &MachiningSettings) -> MachiningSettings {
        MachiningSettings {
            operation: settings.operation,
            total_depth: settings.total_depth,
            offset_side: settings.offset_side,
            tabs: settings.tabs,
            ..self.settings.clone()
        }
    }
}

fn unknown_material() -> String {
    "unknown".to_string()
}

/// Table of named presets, looked up by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetTable {
    pub presets: Vec<PresetItem>,
}

impl PresetTable {
    /// Built-in presets derived from the kind defaults.
    pub fn builtin(defaults: &KindDefaults) -> Self {
        let plywood = defaults.contour.clone();

        let mut mdf = defaults.contour.clone();
        mdf.feed_rate = FeedRate { xy: 90.0, z: 30.0 };
        mdf.total_depth = 12.0;

        let mut acrylic = defaults.contour.clone();
        acrylic.tool = Tool {
            flutes: 1,
            ..Tool::endmill(3.175)
        };
        acrylic.feed_rate = FeedRate { xy: 40.0, z: 10.0 };
        acrylic.spindle_speed = 16000;
        acrylic.depth_per_pass = 2.0;
        acrylic.total_depth = 6.0;
        acrylic.direction = CutDirection::Conventional;

        Self {
            presets: vec![
                PresetItem {
                    id: "plywood_18".to_string(),
                    name: "Plywood 18 mm".to_string(),
                    material: "plywood".to_string(),
                    settings: plywood,
                },
                PresetItem {
                    id: "mdf_12".to_string(),
                    name: "MDF 12 mm".to_string(),
                    material: "mdf".to_string(),
                    settings: mdf,
                },
                PresetItem {
                    id: "acrylic_6".to_string(),
                    name: "Acrylic 6 mm".to_string(),
                    material: "acrylic".to_string(),
                    settings: acrylic,
                },
            ],
        }
    }

    /// Parse a preset table from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a preset table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
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

    /// Look up a preset by id.
    pub fn get(&self, id: &str) -> Result<&PresetItem> {
        self.presets
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CamError::PresetNotFound { id: id.to_string() })
    }
}

/// Utility functions for floating-point comparisons.
pub mod float_cmp {
    use super::EPS;

    /// Check if two floats are approximately equal.
    #[inline]
    pub fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }
}
