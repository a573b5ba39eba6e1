//! Toolpath generation.
//!
//! Turns enabled assignments into multi-pass toolpaths in stock coordinates.
//! Assignments run in placement order (Y, then X) when placements are known,
//! otherwise in their explicit order. Each assignment is generated
//! independently and in parallel; results are collected in order.

pub mod drill;
pub mod passes;
pub mod pocket;

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::SkipReason;
use crate::geometry::polygon::orient;
use crate::geometry::transform::{transform_points, Extents};
use crate::model::{
    BoundingBox, Contour, ContourKind, CutDirection, KindSettings, MachiningSettings,
    OperationAssignment, Operation, OperationKind, PlacementItem, PocketPattern, Point2, Rotation,
    StockMaterial, StockSettings, Toolpath, ToolpathPass, ToolpathResult,
};

/// Everything the generator reads.
#[derive(Debug, Clone, Copy)]
pub struct ToolpathRequest<'a> {
    pub assignments: &'a [OperationAssignment],
    pub operations: &'a [Operation],
    pub stock: &'a StockSettings,
    pub placements: &'a [PlacementItem],
    /// Bounding-box minimum of each object in model coordinates.
    pub origins: &'a HashMap<String, [f64; 2]>,
    pub bounding_boxes: &'a HashMap<String, BoundingBox>,
}

/// Model-to-stock transform of one object.
#[derive(Debug, Clone, Copy)]
struct Pose {
    rotation: Rotation,
    pivot: Point2,
    dx: f64,
    dy: f64,
}

impl Pose {
    fn apply(&self, points: &[Point2]) -> Vec<Point2> {
        transform_points(points, self.rotation, self.pivot, self.dx, self.dy)
    }
}

/// Whether a closed path should run clockwise.
///
/// Climb milling runs outside profiles clockwise and inside profiles
/// counter-clockwise; conventional milling is the reverse.
fn wants_clockwise(kind: ContourKind, direction: CutDirection) -> bool {
    let outside = kind == ContourKind::Exterior;
    match direction {
        CutDirection::Climb => outside,
        CutDirection::Conventional => !outside,
    }
}

fn oriented(path: Vec<Point2>, kind: ContourKind, direction: CutDirection) -> Vec<Point2> {
    let closed = path.len() >= 4 && path.first() == path.last();
    if closed {
        orient(&path, wants_clockwise(kind, direction))
    } else {
        path
    }
}

fn toolpath(operation_id: &str, settings: &MachiningSettings, passes: Vec<ToolpathPass>) -> Toolpath {
    Toolpath {
        operation_id: operation_id.to_string(),
        passes,
        settings: Some(settings.clone()),
    }
}

/// Profile cut: interior contours first, then exteriors, each through the full stock.
fn contour_toolpaths(
    op: &Operation,
    settings: &MachiningSettings,
    pose: &Pose,
    depth: f64,
) -> Vec<Toolpath> {
    let mut contours: Vec<&Contour> = op.geometry.contours.iter().collect();
    contours.sort_by_key(|c| if c.is_interior() { 0 } else { 1 });

    let levels = passes::through_levels(depth, settings.depth_per_pass);
    contours
        .into_iter()
        .filter(|c| c.coords.len() >= 2)
        .map(|c| {
            let path = oriented(pose.apply(&c.coords), c.kind, settings.direction);
            let passes = passes::build_passes(&path, &levels, Some(&settings.tabs));
            toolpath(&op.operation_id, settings, passes)
        })
        .collect()
}

/// One peck cycle per drill center.
fn drill_toolpaths(
    op: &Operation,
    settings: &MachiningSettings,
    pose: &Pose,
    top: f64,
    depth: f64,
) -> Vec<Toolpath> {
    op.geometry
        .contours
        .iter()
        .filter_map(|c| pose.apply(&c.coords).first().copied())
        .map(|center| {
            let passes = drill::peck_passes(center, top, depth, settings.step_depth());
            toolpath(&op.operation_id, settings, passes)
        })
        .collect()
}

/// Clearing paths for each pocket boundary, repeated at every level.
fn pocket_toolpaths(
    op: &Operation,
    settings: &MachiningSettings,
    pose: &Pose,
    top: f64,
    depth: f64,
) -> Vec<Toolpath> {
    let (pattern, stepover) = match settings.operation {
        KindSettings::Pocket { pattern, stepover } => (pattern, stepover),
        _ => (PocketPattern::ContourParallel, 0.5),
    };
    let islands: Vec<Vec<Point2>> = op
        .geometry
        .contours_of(ContourKind::Interior)
        .map(|c| pose.apply(&c.coords))
        .collect();
    let levels = passes::pocket_levels(top, depth, settings.depth_per_pass);
    let diameter = settings.tool.diameter;

    op.geometry
        .contours_of(ContourKind::Pocket)
        .flat_map(|c| {
            let boundary = pose.apply(&c.coords);
            match pattern {
                PocketPattern::ContourParallel => {
                    pocket::contour_parallel(&boundary, &islands, diameter, stepover)
                }
                PocketPattern::Raster => pocket::raster(&boundary, &islands, diameter, stepover),
            }
        })
        .map(|path| {
            let path = oriented(path, ContourKind::Pocket, settings.direction);
            let passes = passes::build_passes(&path, &levels, None);
            toolpath(&op.operation_id, settings, passes)
        })
        .collect()
}

/// Rotation pivot of an object: its bounding-box center, else the center of
/// all its contours.
fn pivot(op: &Operation, origin: [f64; 2], bbox: Option<&BoundingBox>) -> Point2 {
    if let Some(bb) = bbox {
        return Point2::new(origin[0] + bb.x / 2.0, origin[1] + bb.y / 2.0);
    }
    Extents::of(op.geometry.contours.iter().flat_map(|c| c.coords.iter()))
        .map(|e| e.center())
        .unwrap_or(Point2::new(origin[0], origin[1]))
}

fn resolve<'a>(
    req: &ToolpathRequest<'a>,
    ops: &HashMap<&str, &'a Operation>,
    assignment: &OperationAssignment,
) -> Result<(&'a Operation, &'a StockMaterial), SkipReason> {
    let op = ops
        .get(assignment.operation_id.as_str())
        .copied()
        .ok_or_else(|| SkipReason::MissingOperation {
            operation_id: assignment.operation_id.clone(),
        })?;
    let material =
        req.stock
            .find(&assignment.material_id)
            .ok_or_else(|| SkipReason::MissingMaterial {
                operation_id: assignment.operation_id.clone(),
                material_id: assignment.material_id.clone(),
            })?;
    if !op.geometry.has_points() {
        return Err(SkipReason::EmptyGeometry {
            operation_id: op.operation_id.clone(),
        });
    }
    Ok((op, material))
}

fn generate_assignment(
    req: &ToolpathRequest<'_>,
    ops: &HashMap<&str, &Operation>,
    placements: &HashMap<&str, &PlacementItem>,
    assignment: &OperationAssignment,
) -> Result<Vec<Toolpath>, SkipReason> {
    let (op, material) = resolve(req, ops, assignment)?;
    let settings = &assignment.settings;

    let placement = placements.get(op.object_id.as_str());
    let origin = req.origins.get(&op.object_id).copied().unwrap_or([0.0, 0.0]);
    let (place_x, place_y, rotation) = placement
        .map(|p| (p.x_offset, p.y_offset, p.rotation))
        .unwrap_or((0.0, 0.0, Rotation::ZERO));
    let pose = Pose {
        rotation,
        pivot: pivot(op, origin, req.bounding_boxes.get(&op.object_id)),
        dx: place_x - origin[0],
        dy: place_y - origin[1],
    };

    let top = material.thickness;
    let toolpaths = match op.kind {
        OperationKind::Contour => contour_toolpaths(op, settings, &pose, material.thickness),
        OperationKind::Drill => drill_toolpaths(op, settings, &pose, top, op.geometry.depth),
        OperationKind::Pocket => pocket_toolpaths(op, settings, &pose, top, op.geometry.depth),
    };
    debug!(
        "{} ({}): {} toolpath(s)",
        op.operation_id,
        op.kind,
        toolpaths.len()
    );
    Ok(toolpaths)
}

/// Enabled assignments in execution order.
fn ordered<'a>(
    req: &ToolpathRequest<'a>,
    ops: &HashMap<&str, &Operation>,
    placements: &HashMap<&str, &PlacementItem>,
) -> Vec<&'a OperationAssignment> {
    let mut enabled: Vec<&OperationAssignment> =
        req.assignments.iter().filter(|a| a.enabled).collect();

    if req.placements.is_empty() {
        enabled.sort_by_key(|a| a.order);
        return enabled;
    }

    let key = |a: &OperationAssignment| -> (f64, f64, u32) {
        ops.get(a.operation_id.as_str())
            .and_then(|op| placements.get(op.object_id.as_str()))
            .map(|p| (p.y_offset, p.x_offset, a.order))
            .unwrap_or((f64::INFINITY, f64::INFINITY, a.order))
    };
    enabled.sort_by(|a, b| {
        let (ka, kb) = (key(a), key(b));
        ka.0.total_cmp(&kb.0)
            .then(ka.1.total_cmp(&kb.1))
            .then(ka.2.cmp(&kb.2))
    });
    enabled
}

/// Generate toolpaths for every enabled assignment.
///
/// Assignments whose operation or material cannot be resolved, or whose
/// geometry is empty, are skipped and reported in [`ToolpathResult::skipped`].
pub fn generate_toolpaths(req: &ToolpathRequest<'_>) -> ToolpathResult {
    let ops: HashMap<&str, &Operation> = req
        .operations
        .iter()
        .map(|op| (op.operation_id.as_str(), op))
        .collect();
    let placements: HashMap<&str, &PlacementItem> = req
        .placements
        .iter()
        .map(|p| (p.object_id.as_str(), p))
        .collect();

    let results: Vec<Result<Vec<Toolpath>, SkipReason>> = ordered(req, &ops, &placements)
        .par_iter()
        .map(|a| generate_assignment(req, &ops, &placements, a))
        .collect();

    let mut result = ToolpathResult {
        stock_width: req.stock.template().map(|m| m.width),
        stock_depth: req.stock.template().map(|m| m.depth),
        ..Default::default()
    };
    for r in results {
        match r {
            Ok(toolpaths) => result.toolpaths.extend(toolpaths),
            Err(reason) => {
                warn!("Skipping assignment: {}", reason);
                result.skipped.push(reason);
            }
        }
    }
    info!(
        "Generated {} toolpath(s), {} assignment(s) skipped",
        result.toolpaths.len(),
        result.skipped.len()
    );
    result
}
