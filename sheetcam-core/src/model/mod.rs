//! Data model shared by every pipeline stage.
//!
//! Contours and operations are derived once by the detector and read-only
//! afterwards; assignments and placements are user-editable records; toolpaths
//! are regenerated from scratch on every run.

mod assignment;
mod contour;
mod job;
mod operation;
mod placement;
mod settings;
mod solid;
mod stock;
mod toolpath;

pub use assignment::OperationAssignment;
pub use contour::{Contour, ContourKind, Point2};
pub use job::Job;
pub use operation::{OffsetApplied, OffsetSide, Operation, OperationGeometry, OperationKind};
pub use placement::{BoundingBox, PlacementItem, Rotation};
pub use settings::{
    CutDirection, FeedRate, KindSettings, MachiningSettings, PocketPattern, TabSettings, Tool,
    ToolType,
};
pub use solid::{CylindricalFace, SolidDescriptor};
pub use stock::{StockMaterial, StockSettings};
pub use toolpath::{TabSegment, Toolpath, ToolpathPass, ToolpathResult};
