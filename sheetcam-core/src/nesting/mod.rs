//! Bottom-left-fill nesting with discrete rotation search.
//!
//! Parts are placed largest first. Each part is grown by the tool radius plus
//! a clearance, then tried on every existing sheet and finally a fresh one.
//! On each sheet the eight 45° rotations are tried in turn; for the first
//! rotation that fits, a coarse grid is scanned bottom-up, left to right, and
//! the first free position wins.
//!
//! Nesting never fails. A part that fits nowhere is put at the origin of
//! `sheet_1` and reported in [`NestingResult::unfit`].

use geo::{BoundingRect, Intersects, MultiPolygon, Point, Rect, Rotate, Translate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_CLEARANCE, DEFAULT_TOOL_DIAMETER, EPS, NESTING_GRID_STEP};
use crate::geometry::polygon::{self, Join};
use crate::geometry::round4;
use crate::model::{BoundingBox, PlacementItem, Point2, Rotation, StockMaterial};

/// Nesting parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestingOptions {
    pub tool_diameter: f64,
    /// Gap kept between parts on top of the tool radius.
    pub clearance: f64,
    /// Position scan step in mm.
    pub grid_step: f64,
}

impl Default for NestingOptions {
    fn default() -> Self {
        Self {
            tool_diameter: DEFAULT_TOOL_DIAMETER,
            clearance: DEFAULT_CLEARANCE,
            grid_step: NESTING_GRID_STEP,
        }
    }
}

impl NestingOptions {
    /// Distance each footprint is grown by before placement.
    pub fn margin(&self) -> f64 {
        self.tool_diameter / 2.0 + self.clearance
    }
}

/// Shape of one part as seen from above.
#[derive(Debug, Clone, PartialEq)]
pub struct PartFootprint {
    pub object_id: String,
    pub bounding_box: BoundingBox,
    /// Outline relative to the bounding-box minimum; the box is used without one.
    pub outline: Option<Vec<Point2>>,
}

impl PartFootprint {
    /// Footprint polygon relative to the bounding-box minimum.
    pub fn polygon(&self) -> geo::Polygon<f64> {
        match &self.outline {
            Some(points) if points.len() >= 3 => polygon::to_polygon(points),
            _ => polygon::rect(0.0, 0.0, self.bounding_box.x, self.bounding_box.y),
        }
    }

    /// Rotation pivot: the bounding-box center.
    pub fn pivot(&self) -> Point<f64> {
        Point::new(self.bounding_box.x / 2.0, self.bounding_box.y / 2.0)
    }
}

/// Outcome of a nesting run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestingResult {
    /// One placement per input part, in placement order.
    pub placements: Vec<PlacementItem>,
    /// Number of sheets used.
    pub sheet_count: usize,
    /// Parts that did not fit on a sheet.
    pub unfit: Vec<String>,
    pub warnings: Vec<String>,
}

/// A shape already on a sheet.
struct Placed {
    bounds: Rect<f64>,
    shape: MultiPolygon<f64>,
}

struct Sheet {
    id: String,
    placed: Vec<Placed>,
}

/// Winning pose of one part on one sheet.
struct Fit {
    rotation: Rotation,
    /// Shift applied after rotating about the pivot.
    offset: (f64, f64),
    placed: Placed,
}

/// Scan one sheet for the first free pose of a grown footprint.
fn try_place(
    grown: &MultiPolygon<f64>,
    pivot: Point<f64>,
    sheet: &Sheet,
    template: &StockMaterial,
    step: f64,
) -> Option<Fit> {
    for rotation in Rotation::all() {
        let rotated = if rotation.is_zero() {
            grown.clone()
        } else {
            grown.rotate_around_point(rotation.as_f64(), pivot)
        };
        let Some(bounds) = rotated.bounding_rect() else {
            continue;
        };
        let (w, h) = (bounds.width(), bounds.height());
        if w > template.width + EPS || h > template.depth + EPS {
            continue;
        }

        let mut y = 0.0;
        while y + h <= template.depth + EPS {
            let mut x = 0.0;
            while x + w <= template.width + EPS {
                let dx = x - bounds.min().x;
                let dy = y - bounds.min().y;
                let candidate_bounds = Rect::new((x, y), (x + w, y + h));
                let candidate = rotated.translate(dx, dy);
                let free = sheet
                    .placed
                    .iter()
                    .filter(|p| p.bounds.intersects(&candidate_bounds))
                    .all(|p| !p.shape.intersects(&candidate));
                if free {
                    return Some(Fit {
                        rotation,
                        offset: (round4(dx), round4(dy)),
                        placed: Placed {
                            bounds: candidate_bounds,
                            shape: candidate,
                        },
                    });
                }
                x += step;
            }
            y += step;
        }
    }
    None
}

/// Place every part on as few copies of `template` as the heuristic finds.
///
/// Reported offsets reproduce the nested pose when the un-grown outline is
/// rotated about its bounding-box center and then shifted by the offset.
pub fn auto_nest(
    parts: &[PartFootprint],
    template: &StockMaterial,
    options: &NestingOptions,
) -> NestingResult {
    let mut order: Vec<&PartFootprint> = parts.iter().collect();
    order.sort_by(|a, b| {
        b.bounding_box
            .footprint_area()
            .total_cmp(&a.bounding_box.footprint_area())
    });

    let margin = options.margin();
    let step = if options.grid_step > 0.0 {
        options.grid_step
    } else {
        NESTING_GRID_STEP
    };

    let mut sheets: Vec<Sheet> = Vec::new();
    let mut result = NestingResult::default();

    for part in order {
        let base = part.polygon();
        let grown = if margin > 0.0 {
            polygon::buffer(&base, margin, Join::Miter)
        } else {
            MultiPolygon::new(vec![base])
        };
        let pivot = part.pivot();

        let mut fit = None;
        for (i, sheet) in sheets.iter().enumerate() {
            if let Some(f) = try_place(&grown, pivot, sheet, template, step) {
                fit = Some((i, f));
                break;
            }
        }
        if fit.is_none() {
            let fresh = Sheet {
                id: format!("sheet_{}", sheets.len() + 1),
                placed: Vec::new(),
            };
            if let Some(f) = try_place(&grown, pivot, &fresh, template, step) {
                sheets.push(fresh);
                fit = Some((sheets.len() - 1, f));
            }
        }

        match fit {
            Some((i, f)) => {
                let sheet = &mut sheets[i];
                debug!(
                    "{} -> {} at ({}, {}) {}",
                    part.object_id, sheet.id, f.offset.0, f.offset.1, f.rotation
                );
                result.placements.push(
                    PlacementItem::new(
                        part.object_id.clone(),
                        template.material_id.clone(),
                        sheet.id.clone(),
                        f.offset.0,
                        f.offset.1,
                    )
                    .with_rotation(f.rotation),
                );
                sheet.placed.push(f.placed);
            }
            None => {
                let message = format!(
                    "{} does not fit on a {}x{} sheet; placed at the origin of sheet_1",
                    part.object_id, template.width, template.depth
                );
                warn!("{}", message);
                result.warnings.push(message);
                result.unfit.push(part.object_id.clone());
                result.placements.push(PlacementItem::new(
                    part.object_id.clone(),
                    template.material_id.clone(),
                    "sheet_1",
                    0.0,
                    0.0,
                ));
            }
        }
    }

    result.sheet_count = if result.unfit.is_empty() {
        sheets.len()
    } else {
        sheets.len().max(1)
    };
    info!(
        "Nested {} part(s) on {} sheet(s), {} unfit",
        parts.len(),
        result.sheet_count,
        result.unfit.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn part(id: &str, w: f64, h: f64) -> PartFootprint {
        PartFootprint {
            object_id: id.into(),
            bounding_box: BoundingBox::new(w, h, 18.0),
            outline: None,
        }
    }

    fn sheet(w: f64, h: f64) -> StockMaterial {
        StockMaterial::new("mtl_1", w, h, 18.0)
    }

    /// Grown polygon of a placement, rebuilt from the reported pose.
    fn placed_shape(p: &PlacementItem, footprint: &PartFootprint, margin: f64) -> MultiPolygon<f64> {
        polygon::buffer(&footprint.polygon(), margin, Join::Miter)
            .rotate_around_point(p.rotation.as_f64(), footprint.pivot())
            .translate(p.x_offset, p.y_offset)
    }

    // ==================== placement tests ====================

    #[test]
    fn test_first_part_at_bottom_left_with_margin() {
        let options = NestingOptions::default();
        let result = auto_nest(&[part("a", 100.0, 50.0)], &sheet(1220.0, 2440.0), &options);
        assert_eq!(result.placements.len(), 1);
        let p = &result.placements[0];
        assert_eq!(p.sheet_id, "sheet_1");
        assert!(p.rotation.is_zero());
        let margin = options.margin();
        assert!((p.x_offset - margin).abs() < 1e-6);
        assert!((p.y_offset - margin).abs() < 1e-6);
    }

    #[test]
    fn test_larger_parts_placed_first() {
        let result = auto_nest(
            &[part("small", 50.0, 50.0), part("big", 400.0, 300.0)],
            &sheet(1220.0, 2440.0),
            &NestingOptions::default(),
        );
        assert_eq!(result.placements[0].object_id, "big");
        assert_eq!(result.placements[1].object_id, "small");
    }

    #[test]
    fn test_rotation_used_when_upright_does_not_fit() {
        let result = auto_nest(
            &[part("long", 500.0, 100.0)],
            &sheet(200.0, 600.0),
            &NestingOptions::default(),
        );
        assert!(result.unfit.is_empty());
        assert_eq!(result.placements[0].rotation.degrees(), 90);
    }

    // ==================== completeness tests ====================

    #[test]
    fn test_every_part_placed_once_without_overlap() {
        let options = NestingOptions::default();
        let parts: Vec<PartFootprint> = (0..12)
            .map(|i| part(&format!("p{i}"), 200.0 + 10.0 * i as f64, 150.0))
            .collect();
        let result = auto_nest(&parts, &sheet(600.0, 800.0), &options);

        assert_eq!(result.placements.len(), parts.len());
        let ids: HashSet<&str> = result.placements.iter().map(|p| p.object_id.as_str()).collect();
        assert_eq!(ids.len(), parts.len());
        assert!(result.unfit.is_empty());
        assert!(result.sheet_count >= 2);

        for (i, a) in result.placements.iter().enumerate() {
            for b in &result.placements[i + 1..] {
                if a.sheet_id != b.sheet_id {
                    continue;
                }
                let fa = parts.iter().find(|p| p.object_id == a.object_id).unwrap();
                let fb = parts.iter().find(|p| p.object_id == b.object_id).unwrap();
                let sa = placed_shape(a, fa, options.margin() - 0.01);
                let sb = placed_shape(b, fb, options.margin() - 0.01);
                assert!(!sa.intersects(&sb), "{} overlaps {}", a.object_id, b.object_id);
            }
        }
    }

    #[test]
    fn test_oversized_part_falls_back_to_origin() {
        let result = auto_nest(
            &[part("huge", 5000.0, 5000.0), part("ok", 100.0, 100.0)],
            &sheet(1220.0, 2440.0),
            &NestingOptions::default(),
        );
        assert_eq!(result.unfit, vec!["huge".to_string()]);
        let huge = &result.placements[0];
        assert_eq!((huge.x_offset, huge.y_offset), (0.0, 0.0));
        assert_eq!(huge.sheet_id, "sheet_1");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.placements[1].sheet_id, "sheet_1");
        assert_eq!(result.sheet_count, 1);
    }

    #[test]
    fn test_outline_footprint() {
        // L-shaped part: the notch leaves room, but the box is what we nest by size.
        let l_shape = PartFootprint {
            object_id: "l".into(),
            bounding_box: BoundingBox::new(100.0, 100.0, 18.0),
            outline: Some(vec![
                Point2::new(0.0, 0.0),
                Point2::new(100.0, 0.0),
                Point2::new(100.0, 30.0),
                Point2::new(30.0, 30.0),
                Point2::new(30.0, 100.0),
                Point2::new(0.0, 100.0),
                Point2::new(0.0, 0.0),
            ]),
        };
        let result = auto_nest(&[l_shape], &sheet(300.0, 300.0), &NestingOptions::default());
        assert!(result.unfit.is_empty());
        assert_eq!(result.sheet_count, 1);
    }
}
