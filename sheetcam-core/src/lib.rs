//! sheetcam-core - Core library for CNC router CAM on sheet stock.
//!
//! This library turns solids described by their cross-sections into machining
//! operations, lays parts out on stock sheets, generates multi-pass toolpaths
//! and writes ShopBot (`.sbp`) part files.
//!
//! # Example
//!
//! ```no_run
//! use sheetcam_core::{run_job, Job, KindDefaults};
//! use std::path::Path;
//!
//! let job = Job::load(Path::new("job.json")).unwrap();
//! let output = run_job(&job, &KindDefaults::standard()).unwrap();
//! for program in &output.programs {
//!     println!("{}: {} bytes", program.filename, program.code.len());
//! }
//! ```

pub mod config;
pub mod detect;
pub mod error;
pub mod geometry;
pub mod model;
pub mod nesting;
pub mod pipeline;
pub mod toolpath;
pub mod validation;
pub mod writer;

// Re-exports for convenience
pub use config::{KindDefaults, PostProcessorConfig, PresetItem, PresetTable, Unit};
pub use detect::{detect_operations, DetectOptions, DetectionReport};
pub use error::{CamError, ErrorCode, Result, SkipReason};
pub use model::{
    Contour, ContourKind, Job, MachiningSettings, Operation, OperationAssignment, OperationKind,
    PlacementItem, Rotation, SolidDescriptor, StockMaterial, StockSettings, Toolpath,
    ToolpathResult,
};
pub use nesting::{auto_nest, NestingOptions, NestingResult, PartFootprint};
pub use pipeline::{run_job, run_job_with_preset, JobOutput, SheetProgram};
pub use toolpath::{generate_toolpaths, ToolpathRequest};
pub use validation::{validate_placements, validate_settings, ValidationResult};
pub use writer::{generate_sbp, ProgramContext};
