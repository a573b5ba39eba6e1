//! Hole and pocket feature recognition.

use geo::{Area, Centroid, MultiPolygon};
use tracing::debug;

use crate::config::{float_cmp, CIRCLE_SEGMENTS, DEPTH_TOLERANCE};
use crate::geometry::polygon::{self, circle_points};
use crate::geometry::section::{CrossSection, TypedWire, WireKind};
use crate::model::{CylindricalFace, Point2, SolidDescriptor};

/// Area deviation accepted when matching a section hole to a drilled cylinder.
const HOLE_AREA_TOLERANCE: f64 = 0.25;

/// Cylindrical faces of one solid, sorted by role.
#[derive(Debug, Default)]
pub struct HoleFeatures {
    /// Small through-holes to plunge.
    pub drills: Vec<CylindricalFace>,
    /// Blind holes to clear as circular pockets.
    pub blind: Vec<CylindricalFace>,
}

/// Whether a cylinder runs the full thickness of the solid.
pub fn is_through(face: &CylindricalFace, thickness: f64) -> bool {
    face.is_through || (face.axial_depth - thickness).abs() <= DEPTH_TOLERANCE
}

/// Split cylinders into drills and blind pockets.
///
/// Through-holes wider than twice the tool diameter are left out: the contour
/// pass cuts them as interior profiles.
pub fn classify_holes(solid: &SolidDescriptor, tool_diameter: f64) -> HoleFeatures {
    let mut features = HoleFeatures::default();
    for face in &solid.cylinders {
        if is_through(face, solid.thickness) {
            if face.diameter() <= 2.0 * tool_diameter {
                features.drills.push(*face);
            }
        } else if face.axial_depth > 0.0 {
            features.blind.push(*face);
        }
    }
    features
}

/// Whether a section hole is the trace of a drilled cylinder.
pub fn matches_cylinder(wire: &TypedWire, face: &CylindricalFace) -> bool {
    if wire.kind != WireKind::Interior {
        return false;
    }
    let expected = std::f64::consts::PI * face.radius * face.radius;
    let area = wire.area();
    if expected <= 0.0 || ((area - expected) / expected).abs() > HOLE_AREA_TOLERANCE {
        return false;
    }
    polygon::to_polygon(&wire.points)
        .centroid()
        .map(|c| Point2::new(c.x(), c.y()).distance_to(&face.center) <= face.radius.max(0.5))
        .unwrap_or(false)
}

/// Boundary ring of a blind cylinder.
pub fn cylinder_ring(face: &CylindricalFace) -> Vec<Point2> {
    circle_points(face.center, face.radius, CIRCLE_SEGMENTS)
}

/// One cavity found by comparing two section levels.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarPocket {
    pub boundary: Vec<Point2>,
    /// Material left standing inside the cavity.
    pub islands: Vec<Vec<Point2>>,
    pub depth: f64,
}

/// Material region of a section: the union of its faces, each minus its own holes.
///
/// Holes are subtracted per face so an island face standing inside another
/// face's hole survives.
fn section_region(section: &CrossSection) -> MultiPolygon<f64> {
    let faces = section
        .sampled_faces()
        .iter()
        .map(|f| polygon::polygon_with_holes(&f.outer, &f.holes))
        .collect();
    polygon::union_all(faces)
}

/// Scan sections top to bottom for regions opened from above.
///
/// Material present at a lower level but missing from the level above is a
/// cavity; its depth runs from the top face down to the lower level.
pub fn planar_pockets(solid: &SolidDescriptor, min_area: f64) -> Vec<PlanarPocket> {
    let mut sections: Vec<&CrossSection> = solid.sections.iter().collect();
    sections.sort_by(|a, b| b.z.total_cmp(&a.z));

    let mut pockets = Vec::new();
    for pair in sections.windows(2) {
        let (upper, lower) = (pair[0], pair[1]);
        if float_cmp::approx_eq(upper.z, lower.z) {
            continue;
        }
        let revealed = polygon::difference(&section_region(lower), &section_region(upper));
        for component in revealed.0 {
            if component.unsigned_area() < min_area {
                debug!(
                    "{}: ignoring {:.3} mm² sliver at z={}",
                    solid.object_id,
                    component.unsigned_area(),
                    lower.z
                );
                continue;
            }
            pockets.push(PlanarPocket {
                boundary: polygon::ring_points(component.exterior()),
                islands: component.interiors().iter().map(polygon::ring_points).collect(),
                depth: solid.thickness - lower.z,
            });
        }
    }
    pockets
}
