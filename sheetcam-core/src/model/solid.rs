//! Per-solid input supplied by the CAD kernel.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Point2};
use crate::geometry::section::{CrossSection, WireKind};

/// Cylindrical face metadata of a hole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylindricalFace {
    pub radius: f64,
    /// Depth of the cylinder along Z, measured from the top face.
    pub axial_depth: f64,
    /// Whether the cylinder runs through the whole solid.
    pub is_through: bool,
    /// Axis position in model XY coordinates.
    pub center: Point2,
}

impl CylindricalFace {
    /// Hole diameter.
    pub fn diameter(&self) -> f64 {
        self.radius * 2.0
    }
}

/// Everything the detector needs to know about one solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidDescriptor {
    pub object_id: String,
    pub bounding_box: BoundingBox,
    /// Bounding-box minimum in model coordinates.
    #[serde(default)]
    pub origin: [f64; 3],
    pub thickness: f64,
    /// Cross-sections at horizontal face levels, `z` measured from the bottom face.
    #[serde(default)]
    pub sections: Vec<CrossSection>,
    #[serde(default)]
    pub cylinders: Vec<CylindricalFace>,
}

impl SolidDescriptor {
    /// XY origin of the solid.
    pub fn origin_xy(&self) -> [f64; 2] {
        [self.origin[0], self.origin[1]]
    }

    /// Section closest to the bottom face.
    pub fn bottom_section(&self) -> Option<&CrossSection> {
        self.sections
            .iter()
            .min_by(|a, b| a.z.total_cmp(&b.z))
    }

    /// Bottom-face outline relative to the bounding-box minimum.
    ///
    /// Returns the largest exterior wire of the bottom section, or `None` when
    /// the section is missing or has fewer than three points.
    pub fn outline(&self) -> Option<Vec<Point2>> {
        let section = self.bottom_section()?;
        let [ox, oy] = self.origin_xy();
        section
            .typed_wires()
            .into_iter()
            .filter(|w| w.kind == WireKind::Exterior && w.points.len() >= 3)
            .max_by(|a, b| a.area().total_cmp(&b.area()))
            .map(|w| {
                w.points
                    .iter()
                    .map(|p| Point2::new(p.x - ox, p.y - oy))
                    .collect()
            })
    }
}
