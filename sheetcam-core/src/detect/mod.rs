//! Operation detection.
//!
//! Classifies the features of each solid into drill, pocket and contour
//! operations. Solids are processed in parallel; one solid failing never
//! blocks the rest of the batch.

mod contour;
mod features;

pub use contour::profile_contours;
pub use features::{classify_holes, is_through, planar_pockets, HoleFeatures, PlanarPocket};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{KindDefaults, DEFAULT_TOOL_DIAMETER, MIN_POCKET_AREA};
use crate::error::SkipReason;
use crate::geometry::polygon::ring_area;
use crate::geometry::round_point;
use crate::geometry::section::WireKind;
use crate::model::{
    Contour, ContourKind, OffsetApplied, OffsetSide, Operation, OperationGeometry, OperationKind,
    SolidDescriptor,
};

/// Detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectOptions {
    pub tool_diameter: f64,
    /// Compensation side for profile contours.
    pub offset_side: OffsetSide,
    /// Planar pocket regions below this area (mm²) are ignored.
    pub min_pocket_area: f64,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            tool_diameter: DEFAULT_TOOL_DIAMETER,
            offset_side: OffsetSide::Outside,
            min_pocket_area: MIN_POCKET_AREA,
        }
    }
}

/// Operations found across a batch, plus the solids that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionReport {
    pub operations: Vec<Operation>,
    pub skipped: Vec<SkipReason>,
}

/// Detect operations for every solid.
///
/// Operation ids are `op_001`, `op_002`, … in batch order. Per solid the
/// order is drills, pockets, then the profile contour.
pub fn detect_operations(
    solids: &[SolidDescriptor],
    options: &DetectOptions,
    defaults: &KindDefaults,
) -> DetectionReport {
    let results: Vec<Result<Vec<Operation>, SkipReason>> = solids
        .par_iter()
        .map(|solid| detect_solid(solid, options, defaults))
        .collect();

    let mut report = DetectionReport::default();
    for result in results {
        match result {
            Ok(ops) => report.operations.extend(ops),
            Err(reason) => {
                warn!("Skipping solid: {}", reason);
                report.skipped.push(reason);
            }
        }
    }
    for (i, op) in report.operations.iter_mut().enumerate() {
        op.operation_id = format!("op_{:03}", i + 1);
    }

    info!(
        "Detected {} operation(s) on {} solid(s), {} skipped",
        report.operations.len(),
        solids.len(),
        report.skipped.len()
    );
    report
}

fn operation(
    solid: &SolidDescriptor,
    kind: OperationKind,
    geometry: OperationGeometry,
    defaults: &KindDefaults,
    tool_diameter: f64,
) -> Operation {
    let suggested_settings = defaults.suggest(kind, geometry.depth, tool_diameter);
    Operation {
        operation_id: String::new(),
        object_id: solid.object_id.clone(),
        kind,
        geometry,
        suggested_settings,
    }
}

/// Detect the operations of a single solid.
pub fn detect_solid(
    solid: &SolidDescriptor,
    options: &DetectOptions,
    defaults: &KindDefaults,
) -> Result<Vec<Operation>, SkipReason> {
    let bottom = solid
        .bottom_section()
        .ok_or_else(|| SkipReason::EmptyCrossSection {
            object_id: solid.object_id.clone(),
        })?;
    let mut wires = bottom.typed_wires();
    if !wires.iter().any(|w| w.kind == WireKind::Exterior) {
        return Err(SkipReason::EmptyCrossSection {
            object_id: solid.object_id.clone(),
        });
    }
    if wires
        .iter()
        .filter(|w| w.kind == WireKind::Exterior)
        .all(|w| ring_area(&w.points) <= 0.0)
    {
        return Err(SkipReason::DegeneratePolygon {
            object_id: solid.object_id.clone(),
        });
    }

    let tool = options.tool_diameter;
    let holes = classify_holes(solid, tool);
    let mut ops = Vec::new();

    for (i, face) in holes.drills.iter().enumerate() {
        wires.retain(|w| !features::matches_cylinder(w, face));
        let geometry = OperationGeometry {
            contours: vec![Contour::drill_center(
                format!("drill_{}", i + 1),
                round_point(face.center),
            )],
            offset_applied: OffsetApplied::none(),
            depth: solid.thickness,
        };
        ops.push(operation(solid, OperationKind::Drill, geometry, defaults, tool));
    }

    for (i, face) in holes.blind.iter().enumerate() {
        let geometry = OperationGeometry {
            contours: vec![Contour::closed(
                format!("pocket_{}", i + 1),
                ContourKind::Pocket,
                features::cylinder_ring(face),
            )],
            offset_applied: OffsetApplied::none(),
            depth: face.axial_depth,
        };
        ops.push(operation(solid, OperationKind::Pocket, geometry, defaults, tool));
    }

    if holes.blind.is_empty() {
        for (i, pocket) in planar_pockets(solid, options.min_pocket_area)
            .into_iter()
            .enumerate()
        {
            let mut contours = vec![Contour::closed(
                format!("pocket_{}", i + 1),
                ContourKind::Pocket,
                pocket.boundary,
            )];
            contours.extend(pocket.islands.into_iter().enumerate().map(|(j, island)| {
                Contour::closed(format!("island_{}", j + 1), ContourKind::Interior, island)
            }));
            let geometry = OperationGeometry {
                contours,
                offset_applied: OffsetApplied::none(),
                depth: pocket.depth,
            };
            ops.push(operation(solid, OperationKind::Pocket, geometry, defaults, tool));
        }
    } else {
        debug!(
            "{}: blind hole found, planar pocket scan skipped (approximation)",
            solid.object_id
        );
    }

    let (contours, offset_applied) = profile_contours(&wires, tool, options.offset_side);
    let geometry = OperationGeometry {
        contours,
        offset_applied,
        depth: solid.thickness,
    };
    let mut contour_op = operation(solid, OperationKind::Contour, geometry, defaults, tool);
    contour_op.suggested_settings.offset_side = options.offset_side;
    ops.push(contour_op);

    debug!("{}: {} operation(s)", solid.object_id, ops.len());
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::sampling::{SampleMode, WireEdge};
    use crate::geometry::section::{CrossSection, SectionPrimitive};
    use crate::model::{BoundingBox, CylindricalFace, Point2};

    fn rect_edges(w: f64, h: f64) -> Vec<WireEdge> {
        vec![WireEdge::Polyline {
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(w, 0.0),
                Point2::new(w, h),
                Point2::new(0.0, h),
                Point2::new(0.0, 0.0),
            ],
        }]
    }

    /// 100×50×10 block with one through-hole of the given diameter.
    fn block_with_hole(diameter: f64) -> SolidDescriptor {
        let center = Point2::new(50.0, 25.0);
        let hole = vec![WireEdge::circle(center, diameter / 2.0)];
        let face = |z: f64| CrossSection {
            z,
            primitives: vec![SectionPrimitive::Face {
                outer: rect_edges(100.0, 50.0),
                holes: vec![hole.clone()],
            }],
            sampling: SampleMode::default(),
        };
        SolidDescriptor {
            object_id: "block".into(),
            bounding_box: BoundingBox::new(100.0, 50.0, 10.0),
            origin: [0.0, 0.0, 0.0],
            thickness: 10.0,
            sections: vec![face(10.0), face(0.0)],
            cylinders: vec![CylindricalFace {
                radius: diameter / 2.0,
                axial_depth: 10.0,
                is_through: true,
                center,
            }],
        }
    }

    fn kinds(report: &DetectionReport) -> Vec<OperationKind> {
        report.operations.iter().map(|o| o.kind).collect()
    }

    // ==================== small-hole filtering tests ====================

    #[test]
    fn test_small_through_hole_becomes_drill() {
        let report = detect_operations(
            &[block_with_hole(4.0)],
            &DetectOptions::default(),
            &KindDefaults::standard(),
        );
        assert_eq!(kinds(&report), vec![OperationKind::Drill, OperationKind::Contour]);
        let drill = &report.operations[0];
        assert_eq!(drill.geometry.depth, 10.0);
        assert_eq!(drill.geometry.contours[0].coords, vec![Point2::new(50.0, 25.0)]);
        let contour = &report.operations[1];
        assert!(!contour.geometry.contours.iter().any(|c| c.is_interior()));
    }

    #[test]
    fn test_large_through_hole_stays_interior() {
        let report = detect_operations(
            &[block_with_hole(20.0)],
            &DetectOptions::default(),
            &KindDefaults::standard(),
        );
        assert_eq!(kinds(&report), vec![OperationKind::Contour]);
        assert!(report.operations[0]
            .geometry
            .contours
            .iter()
            .any(|c| c.is_interior()));
    }

    // ==================== pockets tests ====================

    #[test]
    fn test_blind_cylinder_becomes_circular_pocket() {
        let mut solid = block_with_hole(20.0);
        solid.cylinders[0].is_through = false;
        solid.cylinders[0].axial_depth = 4.0;
        for s in &mut solid.sections {
            if s.z == 0.0 {
                s.primitives = vec![SectionPrimitive::Face {
                    outer: rect_edges(100.0, 50.0),
                    holes: vec![],
                }];
            }
        }
        let report = detect_operations(&[solid], &DetectOptions::default(), &KindDefaults::standard());
        assert_eq!(kinds(&report), vec![OperationKind::Pocket, OperationKind::Contour]);
        let pocket = &report.operations[0];
        assert_eq!(pocket.geometry.depth, 4.0);
        assert_eq!(pocket.geometry.contours[0].kind, ContourKind::Pocket);
        assert_eq!(pocket.geometry.contours[0].coords.len(), 65);
        assert_eq!(pocket.suggested_settings.total_depth, 4.0);
    }

    fn square_edges(x: f64, y: f64, size: f64) -> Vec<WireEdge> {
        vec![WireEdge::Polyline {
            points: vec![
                Point2::new(x, y),
                Point2::new(x + size, y),
                Point2::new(x + size, y + size),
                Point2::new(x, y + size),
                Point2::new(x, y),
            ],
        }]
    }

    #[test]
    fn test_pocket_around_boss_keeps_island() {
        let face = |outer: Vec<WireEdge>, holes: Vec<Vec<WireEdge>>| {
            SectionPrimitive::Face { outer, holes }
        };
        let solid = SolidDescriptor {
            object_id: "boss".into(),
            bounding_box: BoundingBox::new(100.0, 100.0, 10.0),
            origin: [0.0, 0.0, 0.0],
            thickness: 10.0,
            sections: vec![
                CrossSection {
                    z: 10.0,
                    primitives: vec![
                        face(square_edges(0.0, 0.0, 100.0), vec![square_edges(20.0, 20.0, 60.0)]),
                        face(square_edges(40.0, 40.0, 20.0), vec![]),
                    ],
                    sampling: SampleMode::default(),
                },
                CrossSection {
                    z: 5.0,
                    primitives: vec![face(square_edges(0.0, 0.0, 100.0), vec![])],
                    sampling: SampleMode::default(),
                },
            ],
            cylinders: Vec::new(),
        };
        let report = detect_operations(&[solid], &DetectOptions::default(), &KindDefaults::standard());
        assert_eq!(kinds(&report), vec![OperationKind::Pocket, OperationKind::Contour]);
        let pocket = &report.operations[0];
        let contour_kinds: Vec<ContourKind> =
            pocket.geometry.contours.iter().map(|c| c.kind).collect();
        assert_eq!(contour_kinds, vec![ContourKind::Pocket, ContourKind::Interior]);

        let assignment = crate::model::OperationAssignment {
            operation_id: pocket.operation_id.clone(),
            material_id: "mtl_1".into(),
            enabled: true,
            settings: pocket.suggested_settings.clone(),
            order: 0,
        };
        let stock = crate::model::StockSettings {
            materials: vec![crate::model::StockMaterial::new("mtl_1", 600.0, 400.0, 10.0)],
        };
        let empty = std::collections::HashMap::new();
        let result = crate::toolpath::generate_toolpaths(&crate::toolpath::ToolpathRequest {
            assignments: &[assignment],
            operations: &report.operations,
            stock: &stock,
            placements: &[],
            origins: &empty,
            bounding_boxes: &std::collections::HashMap::new(),
        });
        assert!(!result.toolpaths.is_empty());
        let on_boss = result
            .toolpaths
            .iter()
            .flat_map(|t| t.passes.iter().flat_map(|p| p.path.iter()))
            .filter(|p| p.x > 40.0 && p.x < 60.0 && p.y > 40.0 && p.y < 60.0)
            .count();
        assert_eq!(on_boss, 0);
    }

    // ==================== batch behavior tests ====================

    #[test]
    fn test_ids_sequential_and_bad_solid_skipped() {
        let mut empty = block_with_hole(20.0);
        empty.object_id = "empty".into();
        empty.sections.clear();
        let report = detect_operations(
            &[block_with_hole(4.0), empty, block_with_hole(20.0)],
            &DetectOptions::default(),
            &KindDefaults::standard(),
        );
        let ids: Vec<&str> = report
            .operations
            .iter()
            .map(|o| o.operation_id.as_str())
            .collect();
        assert_eq!(ids, vec!["op_001", "op_002", "op_003"]);
        assert_eq!(
            report.skipped,
            vec![SkipReason::EmptyCrossSection {
                object_id: "empty".into()
            }]
        );
    }

    #[test]
    fn test_contour_settings_follow_thickness_and_side() {
        let options = DetectOptions {
            offset_side: OffsetSide::Inside,
            ..DetectOptions::default()
        };
        let report = detect_operations(&[block_with_hole(20.0)], &options, &KindDefaults::standard());
        let op = &report.operations[0];
        assert_eq!(op.suggested_settings.total_depth, 10.0);
        assert_eq!(op.suggested_settings.offset_side, OffsetSide::Inside);
        assert_eq!(op.geometry.offset_applied.side, OffsetSide::Inside);
        assert!(op.suggested_settings.tabs.enabled);
    }
}
