//! End-to-end job run: detect, nest, validate, generate, write.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{KindDefaults, PresetItem};
use crate::detect::detect_operations;
use crate::error::{CamError, Result, SkipReason};
use crate::model::{
    BoundingBox, Job, Operation, OperationAssignment, PlacementItem, StockMaterial, Toolpath,
};
use crate::nesting::{auto_nest, PartFootprint};
use crate::toolpath::{generate_toolpaths, ToolpathRequest};
use crate::validation::{validate_placements, validate_settings, validate_stock};
use crate::writer::{generate_sbp, ProgramContext};

/// File name used when a job has no placements.
pub const SINGLE_PROGRAM_NAME: &str = "output.sbp";

/// One emitted part file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetProgram {
    /// Sheet this program cuts; `None` for a job without placements.
    pub sheet_id: Option<String>,
    pub filename: String,
    pub code: String,
}

/// Everything a job run produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobOutput {
    pub operations: Vec<Operation>,
    pub assignments: Vec<OperationAssignment>,
    pub placements: Vec<PlacementItem>,
    /// Toolpaths of every program, in emission order.
    pub toolpaths: Vec<Toolpath>,
    pub programs: Vec<SheetProgram>,
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub skipped: Vec<SkipReason>,
}

/// One assignment per detected operation, on the first material.
pub fn derive_assignments(operations: &[Operation], material: &StockMaterial) -> Vec<OperationAssignment> {
    operations
        .iter()
        .enumerate()
        .map(|(i, op)| OperationAssignment {
            operation_id: op.operation_id.clone(),
            material_id: material.material_id.clone(),
            enabled: true,
            settings: op.suggested_settings.clone(),
            order: i as u32,
        })
        .collect()
}

/// Nesting and validation footprints of every solid.
pub fn footprints(job: &Job) -> Vec<PartFootprint> {
    job.solids
        .iter()
        .map(|s| PartFootprint {
            object_id: s.object_id.clone(),
            bounding_box: s.bounding_box,
            outline: s.outline(),
        })
        .collect()
}

/// Widest tool among enabled assignments, or `fallback` when none is enabled.
///
/// Placement collisions are checked against this diameter.
fn cutting_tool_diameter(assignments: &[OperationAssignment], fallback: f64) -> f64 {
    assignments
        .iter()
        .filter(|a| a.enabled)
        .map(|a| a.settings.tool.diameter)
        .reduce(f64::max)
        .unwrap_or(fallback)
}

/// Run a job with the settings it carries.
pub fn run_job(job: &Job, defaults: &KindDefaults) -> Result<JobOutput> {
    run_job_with_preset(job, defaults, None)
}

/// Run a job, laying `preset` over every assignment's settings.
///
/// Fails only when the job has no stock or nothing can be written; every
/// other problem is reported as a warning or a skipped item.
pub fn run_job_with_preset(
    job: &Job,
    defaults: &KindDefaults,
    preset: Option<&PresetItem>,
) -> Result<JobOutput> {
    let template = job.stock.template().ok_or(CamError::NoStock)?;
    let mut output = JobOutput::default();

    let mut checks = validate_stock(&job.stock);

    let report = detect_operations(&job.solids, &job.detection, defaults);
    output.operations = report.operations;
    output.skipped = report.skipped;

    let mut assignments = if job.assignments.is_empty() {
        derive_assignments(&output.operations, template)
    } else {
        job.assignments.clone()
    };
    if let Some(p) = preset {
        info!("Applying preset {} ({})", p.id, p.name);
        for a in &mut assignments {
            a.settings = p.apply_to(&a.settings);
        }
    }
    for a in &assignments {
        let mut check = validate_settings(&a.settings);
        for w in &mut check.warnings {
            *w = format!("{}: {}", a.operation_id, w);
        }
        checks.merge(check);
    }

    let parts = footprints(job);
    output.placements = if job.placements.is_empty() && job.nest {
        let nested = auto_nest(&parts, template, &job.nesting);
        info!(
            "Nested {} part(s) on {} sheet(s)",
            nested.placements.len(),
            nested.sheet_count
        );
        for w in nested.warnings {
            checks.add_warning(w);
        }
        nested.placements
    } else {
        job.placements.clone()
    };
    if !output.placements.is_empty() {
        let tool = cutting_tool_diameter(&assignments, job.detection.tool_diameter);
        checks.merge(validate_placements(
            &output.placements,
            &parts,
            &job.stock,
            tool,
        ));
    }
    if !checks.passed {
        warn!("Job checks reported {} error(s)", checks.errors.len());
    }
    output.warnings.extend(checks.errors);
    output.warnings.extend(checks.warnings);

    let origins: HashMap<String, [f64; 2]> = job
        .solids
        .iter()
        .map(|s| (s.object_id.clone(), s.origin_xy()))
        .collect();
    let bounding_boxes: HashMap<String, BoundingBox> = job
        .solids
        .iter()
        .map(|s| (s.object_id.clone(), s.bounding_box))
        .collect();

    let sheets = if output.placements.is_empty() {
        vec![SheetJob {
            sheet_id: None,
            assignments: assignments.iter().collect(),
            placements: Vec::new(),
        }]
    } else {
        split_by_sheet(&output.operations, &assignments, &output.placements)
    };

    for sheet in sheets {
        let sheet_assignments: Vec<OperationAssignment> =
            sheet.assignments.iter().map(|a| (*a).clone()).collect();
        let sheet_placements: Vec<PlacementItem> =
            sheet.placements.iter().map(|p| (*p).clone()).collect();

        let request = ToolpathRequest {
            assignments: &sheet_assignments,
            operations: &output.operations,
            stock: &job.stock,
            placements: &sheet_placements,
            origins: &origins,
            bounding_boxes: &bounding_boxes,
        };
        let result = generate_toolpaths(&request);
        output.skipped.extend(result.skipped);

        let material = sheet
            .placements
            .first()
            .and_then(|p| job.stock.find(&p.material_id))
            .or(Some(template));
        let ctx = ProgramContext {
            post: &job.post_processor,
            fallback: sheet_assignments.first().map(|a| &a.settings),
            material,
        };
        let code = generate_sbp(&result.toolpaths, &ctx)?;
        let filename = match &sheet.sheet_id {
            Some(id) => format!("{}.sbp", id),
            None => SINGLE_PROGRAM_NAME.to_string(),
        };
        debug!("{}: {} toolpath(s)", filename, result.toolpaths.len());

        output.toolpaths.extend(result.toolpaths);
        output.programs.push(SheetProgram {
            sheet_id: sheet.sheet_id,
            filename,
            code,
        });
    }

    if output.programs.is_empty() {
        warn!("No sheet has any assignment; nothing to write");
        return Err(CamError::NoOperations);
    }
    output.assignments = assignments;

    info!(
        "Job done: {} operation(s), {} program(s), {} warning(s), {} skipped",
        output.operations.len(),
        output.programs.len(),
        output.warnings.len(),
        output.skipped.len()
    );
    Ok(output)
}

/// Assignments and placements of one physical sheet.
struct SheetJob<'a> {
    sheet_id: Option<String>,
    assignments: Vec<&'a OperationAssignment>,
    placements: Vec<&'a PlacementItem>,
}

/// Group work by sheet id in sorted order; sheets without assignments are dropped.
fn split_by_sheet<'a>(
    operations: &[Operation],
    assignments: &'a [OperationAssignment],
    placements: &'a [PlacementItem],
) -> Vec<SheetJob<'a>> {
    let object_of: HashMap<&str, &str> = operations
        .iter()
        .map(|op| (op.operation_id.as_str(), op.object_id.as_str()))
        .collect();

    let mut groups: BTreeMap<&str, Vec<&PlacementItem>> = BTreeMap::new();
    for p in placements {
        groups.entry(p.sheet_id.as_str()).or_default().push(p);
    }

    groups
        .into_iter()
        .filter_map(|(sheet_id, sheet_placements)| {
            let objects: HashSet<&str> = sheet_placements
                .iter()
                .map(|p| p.object_id.as_str())
                .collect();
            let sheet_assignments: Vec<&OperationAssignment> = assignments
                .iter()
                .filter(|a| {
                    object_of
                        .get(a.operation_id.as_str())
                        .is_some_and(|o| objects.contains(o))
                })
                .collect();
            if sheet_assignments.is_empty() {
                debug!("{}: no assignments, skipped", sheet_id);
                return None;
            }
            Some(SheetJob {
                sheet_id: Some(sheet_id.to_string()),
                assignments: sheet_assignments,
                placements: sheet_placements,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::section::{CrossSection, SectionPrimitive};
    use crate::geometry::sampling::{SampleMode, WireEdge};
    use crate::model::{Point2, SolidDescriptor, StockSettings};

    fn block(id: &str, w: f64, h: f64) -> SolidDescriptor {
        let p = |x: f64, y: f64| Point2::new(x, y);
        SolidDescriptor {
            object_id: id.to_string(),
            bounding_box: BoundingBox::new(w, h, 18.0),
            origin: [0.0, 0.0, 0.0],
            thickness: 18.0,
            sections: vec![CrossSection {
                z: 0.0,
                primitives: vec![SectionPrimitive::Wire {
                    edges: vec![WireEdge::Polyline {
                        points: vec![p(0.0, 0.0), p(w, 0.0), p(w, h), p(0.0, h), p(0.0, 0.0)],
                    }],
                }],
                sampling: SampleMode::default(),
            }],
            cylinders: Vec::new(),
        }
    }

    fn job(solids: Vec<SolidDescriptor>) -> Job {
        Job {
            solids,
            stock: StockSettings {
                materials: vec![StockMaterial::new("mtl_1", 600.0, 400.0, 18.0)],
            },
            ..Default::default()
        }
    }

    // ==================== run_job tests ====================

    #[test]
    fn test_single_program_without_placements() {
        let out = run_job(&job(vec![block("a", 100.0, 50.0)]), &KindDefaults::standard()).unwrap();
        assert_eq!(out.operations.len(), 1);
        assert_eq!(out.assignments.len(), 1);
        assert_eq!(out.programs.len(), 1);
        assert_eq!(out.programs[0].filename, SINGLE_PROGRAM_NAME);
        assert_eq!(out.programs[0].sheet_id, None);
        assert!(out.programs[0].code.contains("M3,"));
    }

    #[test]
    fn test_no_stock_is_an_error() {
        let mut j = job(vec![block("a", 100.0, 50.0)]);
        j.stock = StockSettings::default();
        assert!(matches!(
            run_job(&j, &KindDefaults::standard()),
            Err(CamError::NoStock)
        ));
    }

    #[test]
    fn test_nothing_detected_is_an_error() {
        let empty = SolidDescriptor {
            sections: Vec::new(),
            ..block("ghost", 10.0, 10.0)
        };
        let result = run_job(&job(vec![empty]), &KindDefaults::standard());
        assert!(matches!(result, Err(CamError::NoOperations)));
    }

    #[test]
    fn test_nested_job_writes_one_program_per_sheet() {
        let mut j = job(vec![
            block("a", 500.0, 300.0),
            block("b", 500.0, 300.0),
            block("c", 100.0, 50.0),
        ]);
        j.nest = true;
        let out = run_job(&j, &KindDefaults::standard()).unwrap();
        assert_eq!(out.placements.len(), 3);
        let names: Vec<&str> = out.programs.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(names, vec!["sheet_1.sbp", "sheet_2.sbp"]);
        assert!(out.warnings.iter().all(|w| !w.starts_with("Collision")), "{:?}", out.warnings);
    }

    #[test]
    fn test_manual_collision_is_warned_not_fatal() {
        let mut j = job(vec![block("a", 100.0, 50.0), block("b", 100.0, 50.0)]);
        j.placements = vec![
            PlacementItem::new("a", "mtl_1", "sheet_1", 10.0, 10.0),
            PlacementItem::new("b", "mtl_1", "sheet_1", 10.0, 10.0),
        ];
        let out = run_job(&j, &KindDefaults::standard()).unwrap();
        assert!(out.warnings.contains(&"Collision: a and b overlap".to_string()));
        assert_eq!(out.programs.len(), 1);
        assert_eq!(out.programs[0].filename, "sheet_1.sbp");
    }

    #[test]
    fn test_collision_margin_follows_cutting_tool() {
        // 5 mm gap: clear for a 3 mm cutter, too tight for the 6.35 mm one assigned.
        let mut j = job(vec![block("a", 100.0, 50.0), block("b", 100.0, 50.0)]);
        j.nesting.tool_diameter = 3.0;
        j.placements = vec![
            PlacementItem::new("a", "mtl_1", "sheet_1", 10.0, 10.0),
            PlacementItem::new("b", "mtl_1", "sheet_1", 115.0, 10.0),
        ];
        let out = run_job(&j, &KindDefaults::standard()).unwrap();
        assert!(out.warnings.contains(&"Collision: a and b overlap".to_string()));

        let mut small = out.assignments.clone();
        for a in &mut small {
            a.settings.tool.diameter = 3.0;
        }
        j.assignments = small;
        let out = run_job(&j, &KindDefaults::standard()).unwrap();
        assert!(out.warnings.iter().all(|w| !w.starts_with("Collision")), "{:?}", out.warnings);
    }

    #[test]
    fn test_cutting_tool_diameter() {
        let out = run_job(&job(vec![block("a", 100.0, 50.0)]), &KindDefaults::standard()).unwrap();
        let mut assignments = out.assignments.clone();
        assert_eq!(cutting_tool_diameter(&assignments, 1.0), 6.35);
        assignments[0].enabled = false;
        assert_eq!(cutting_tool_diameter(&assignments, 1.0), 1.0);
    }

    #[test]
    fn test_check_findings_reported_as_warnings() {
        let mut j = job(vec![block("a", 100.0, 50.0)]);
        j.stock
            .materials
            .push(StockMaterial::new("mtl_bad", 0.0, 400.0, 18.0));
        let mut assignments = run_job(&j, &KindDefaults::standard()).unwrap().assignments;
        assignments[0].settings.spindle_speed = 3000;
        j.assignments = assignments;
        j.placements = vec![PlacementItem::new("a", "mtl_1", "sheet_1", 580.0, 10.0)];

        let out = run_job(&j, &KindDefaults::standard()).unwrap();
        assert_eq!(out.warnings.len(), 3, "{:?}", out.warnings);
        assert!(out.warnings[0].starts_with("mtl_bad: invalid sheet size"));
        assert!(out.warnings[1].starts_with("op_001: Spindle speed too low"));
        assert!(out.warnings[2].starts_with("a exceeds sheet width"));
    }

    #[test]
    fn test_sheet_without_assignments_is_dropped() {
        let mut j = job(vec![block("a", 100.0, 50.0)]);
        j.placements = vec![
            PlacementItem::new("a", "mtl_1", "sheet_2", 10.0, 10.0),
            PlacementItem::new("unknown", "mtl_1", "sheet_1", 10.0, 10.0),
        ];
        let out = run_job(&j, &KindDefaults::standard()).unwrap();
        assert_eq!(out.programs.len(), 1);
        assert_eq!(out.programs[0].sheet_id.as_deref(), Some("sheet_2"));
    }

    #[test]
    fn test_preset_overrides_speeds() {
        let defaults = KindDefaults::standard();
        let table = crate::config::PresetTable::builtin(&defaults);
        let preset = table.get("acrylic_6").unwrap();
        let out = run_job_with_preset(&job(vec![block("a", 100.0, 50.0)]), &defaults, Some(preset))
            .unwrap();
        assert_eq!(out.assignments[0].settings.spindle_speed, 16000);
        assert!(out.programs[0].code.contains("TR,16000"));
        assert!(out.programs[0].code.contains("'MILL_SIZE:3.175"));
    }
}
