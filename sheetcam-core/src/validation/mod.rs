//! Advisory validation of layouts, settings and stock.
//!
//! Nothing here blocks generation; findings are returned as warnings for the
//! operator to review.

mod placement;
mod validate;

pub use placement::validate_placements;
pub use validate::{validate_settings, validate_stock, ValidationResult};
