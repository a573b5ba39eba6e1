//! Detected machining operations.

use serde::{Deserialize, Serialize};

use super::{Contour, ContourKind, MachiningSettings};

/// Kind of machining feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Profile cut around the part and its large cutouts.
    Contour,
    /// Blind cavity cleared from the top.
    Pocket,
    /// Small through-hole plunged at its center.
    Drill,
}

impl OperationKind {
    /// Lowercase name used in logs and file output.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Contour => "contour",
            OperationKind::Pocket => "pocket",
            OperationKind::Drill => "drill",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which side of the drawn boundary the tool runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetSide {
    #[default]
    Outside,
    Inside,
    None,
}

/// Tool compensation baked into an operation's contours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetApplied {
    pub distance: f64,
    pub side: OffsetSide,
}

impl OffsetApplied {
    /// No compensation.
    pub fn none() -> Self {
        Self {
            distance: 0.0,
            side: OffsetSide::None,
        }
    }
}

/// Geometry of one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationGeometry {
    pub contours: Vec<Contour>,
    pub offset_applied: OffsetApplied,
    /// Feature depth in mm.
    pub depth: f64,
}

impl OperationGeometry {
    /// Contours of a given kind.
    pub fn contours_of(&self, kind: ContourKind) -> impl Iterator<Item = &Contour> {
        self.contours.iter().filter(move |c| c.kind == kind)
    }

    /// Whether any contour carries at least one point.
    pub fn has_points(&self) -> bool {
        self.contours.iter().any(|c| !c.coords.is_empty())
    }
}

/// One detected feature on one solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operation_id: String,
    pub object_id: String,
    #[serde(rename = "operation_type")]
    pub kind: OperationKind,
    pub geometry: OperationGeometry,
    pub suggested_settings: MachiningSettings,
}
