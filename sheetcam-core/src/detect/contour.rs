//! Profile contour extraction with tool compensation.

use geo::Area;

use crate::geometry::polygon::{self, Join};
use crate::geometry::section::{TypedWire, WireKind};
use crate::model::{Contour, ContourKind, OffsetApplied, OffsetSide, Point2};

/// Offset distance for exterior boundaries; holes use the opposite sign.
fn exterior_delta(side: OffsetSide, tool_diameter: f64) -> f64 {
    match side {
        OffsetSide::Outside => tool_diameter / 2.0,
        OffsetSide::Inside => -tool_diameter / 2.0,
        OffsetSide::None => 0.0,
    }
}

/// Offset one ring and return the rings of the result.
fn offset_ring(points: &[Point2], delta: f64) -> Vec<Vec<Point2>> {
    let poly = polygon::to_polygon(points);
    if delta == 0.0 {
        return vec![polygon::ring_points(poly.exterior())];
    }
    polygon::buffer(&poly, delta, Join::Miter)
        .0
        .iter()
        .filter(|p| p.unsigned_area() > 0.0)
        .map(|p| polygon::ring_points(p.exterior()))
        .collect()
}

/// Tool-compensated exterior and interior contours of a section.
///
/// Holes smaller than the area the tool can reach (`π·(d/2)²`) are dropped,
/// as are holes that vanish after compensation.
pub fn profile_contours(
    wires: &[TypedWire],
    tool_diameter: f64,
    side: OffsetSide,
) -> (Vec<Contour>, OffsetApplied) {
    let delta = exterior_delta(side, tool_diameter);
    let min_hole_area = std::f64::consts::PI * (tool_diameter / 2.0).powi(2);

    let mut contours = Vec::new();
    let mut n_ext = 0;
    let mut n_int = 0;
    for wire in wires.iter().filter(|w| w.points.len() >= 3) {
        match wire.kind {
            WireKind::Exterior => {
                for ring in offset_ring(&wire.points, delta) {
                    n_ext += 1;
                    contours.push(Contour::closed(
                        format!("ext_{n_ext}"),
                        ContourKind::Exterior,
                        ring,
                    ));
                }
            }
            WireKind::Interior => {
                if wire.area() < min_hole_area {
                    continue;
                }
                for ring in offset_ring(&wire.points, -delta) {
                    n_int += 1;
                    contours.push(Contour::closed(
                        format!("int_{n_int}"),
                        ContourKind::Interior,
                        ring,
                    ));
                }
            }
        }
    }

    let applied = if delta == 0.0 {
        OffsetApplied::none()
    } else {
        OffsetApplied {
            distance: tool_diameter / 2.0,
            side,
        }
    };
    (contours, applied)
}
