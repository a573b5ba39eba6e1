//! Bounds and collision checks over a sheet layout.

use std::collections::{BTreeMap, HashMap};

use geo::{BoundingRect, Intersects, MultiPolygon, Rotate, Translate};
use tracing::debug;

use super::ValidationResult;
use crate::config::EPS;
use crate::geometry::polygon::{self, Join};
use crate::model::{PlacementItem, StockSettings};
use crate::nesting::PartFootprint;

/// Footprint of a placed part in sheet coordinates, without tool clearance.
fn placed_shape(footprint: &PartFootprint, placement: &PlacementItem) -> geo::Polygon<f64> {
    let shape = footprint.polygon();
    let rotated = if placement.rotation.is_zero() {
        shape
    } else {
        shape.rotate_around_point(placement.rotation.as_f64(), footprint.pivot())
    };
    rotated.translate(placement.x_offset, placement.y_offset)
}

/// Check that placements stay on their sheets and do not overlap.
///
/// Parts are compared on the same `sheet_id` only. Each part is grown by half
/// the tool diameter before the overlap test, so two parts closer than one
/// tool width are reported. Every finding is a warning.
pub fn validate_placements(
    placements: &[PlacementItem],
    footprints: &[PartFootprint],
    stock: &StockSettings,
    tool_diameter: f64,
) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let by_id: HashMap<&str, &PartFootprint> =
        footprints.iter().map(|f| (f.object_id.as_str(), f)).collect();

    let mut sheets: BTreeMap<&str, Vec<(&str, MultiPolygon<f64>)>> = BTreeMap::new();

    for p in placements {
        let Some(footprint) = by_id.get(p.object_id.as_str()) else {
            result.add_warning(format!("{}: no bounding box, placement not checked", p.object_id));
            continue;
        };
        let shape = placed_shape(footprint, p);

        match (stock.find(&p.material_id), shape.bounding_rect()) {
            (None, _) => {
                result.add_warning(format!(
                    "{}: material {} not found",
                    p.object_id, p.material_id
                ));
            }
            (Some(sheet), Some(bounds)) => {
                if bounds.max().x > sheet.width + EPS {
                    result.add_warning(format!(
                        "{} exceeds sheet width ({:.1} > {})",
                        p.object_id,
                        bounds.max().x,
                        sheet.width
                    ));
                }
                if bounds.max().y > sheet.depth + EPS {
                    result.add_warning(format!(
                        "{} exceeds sheet depth ({:.1} > {})",
                        p.object_id,
                        bounds.max().y,
                        sheet.depth
                    ));
                }
                if bounds.min().x < -EPS || bounds.min().y < -EPS {
                    result.add_warning(format!("{} has negative position", p.object_id));
                }
            }
            (Some(_), None) => {}
        }

        let grown = polygon::buffer(&shape, tool_diameter / 2.0, Join::Round);
        sheets
            .entry(p.sheet_id.as_str())
            .or_default()
            .push((p.object_id.as_str(), grown));
    }

    for (sheet_id, parts) in &sheets {
        debug!("Checking {} parts on {} for collisions", parts.len(), sheet_id);
        for (i, (a_id, a)) in parts.iter().enumerate() {
            for (b_id, b) in &parts[i + 1..] {
                if a.intersects(b) {
                    result.add_warning(format!("Collision: {} and {} overlap", a_id, b_id));
                }
            }
        }
    }

    result
}
