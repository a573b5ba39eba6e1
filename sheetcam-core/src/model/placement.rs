//! Part placement on stock sheets.

use serde::{Deserialize, Serialize};

use crate::config::ROTATION_STEP_DEG;
use crate::error::CamError;

/// Axis-aligned size of a solid in mm.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Footprint area in the XY plane.
    pub fn footprint_area(&self) -> f64 {
        self.x * self.y
    }
}

/// Placement rotation, restricted to multiples of 45 degrees in [0, 360).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct Rotation(u16);

impl Rotation {
    /// No rotation.
    pub const ZERO: Rotation = Rotation(0);

    /// All eight allowed rotations in ascending order.
    pub fn all() -> impl Iterator<Item = Rotation> {
        (0..360)
            .step_by(ROTATION_STEP_DEG as usize)
            .map(|d| Rotation(d as u16))
    }

    /// Rotation in degrees.
    pub fn degrees(&self) -> u16 {
        self.0
    }

    /// Rotation in degrees as a float.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0)
    }

    /// Whether this is the identity rotation.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for Rotation {
    type Error = CamError;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        if (0..360).contains(&degrees) && degrees % i64::from(ROTATION_STEP_DEG) == 0 {
            Ok(Rotation(degrees as u16))
        } else {
            Err(CamError::InvalidRotation { degrees })
        }
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> Self {
        r.0
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Physical pose of one object on one sheet instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementItem {
    pub object_id: String,
    pub material_id: String,
    pub sheet_id: String,
    #[serde(default)]
    pub x_offset: f64,
    #[serde(default)]
    pub y_offset: f64,
    #[serde(default)]
    pub rotation: Rotation,
}

impl PlacementItem {
    /// Create an unrotated placement.
    pub fn new(
        object_id: impl Into<String>,
        material_id: impl Into<String>,
        sheet_id: impl Into<String>,
        x_offset: f64,
        y_offset: f64,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            material_id: material_id.into(),
            sheet_id: sheet_id.into(),
            x_offset,
            y_offset,
            rotation: Rotation::ZERO,
        }
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }
}
