//! User assignment of an operation to stock material and settings.

use serde::{Deserialize, Serialize};

use super::MachiningSettings;

fn default_enabled() -> bool {
    true
}

/// Binds a detected operation to a material, settings and an execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationAssignment {
    pub operation_id: String,
    pub material_id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub settings: MachiningSettings,
    /// Execution order when no placements are known.
    pub order: u32,
}
