//! Stock sheet definitions.

use serde::{Deserialize, Serialize};

/// One stock material (sheet template).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMaterial {
    pub material_id: String,
    #[serde(default)]
    pub label: String,
    /// Sheet size along X in mm.
    pub width: f64,
    /// Sheet size along Y in mm.
    pub depth: f64,
    /// Sheet thickness in mm.
    pub thickness: f64,
}

impl StockMaterial {
    /// Create a new stock material.
    pub fn new(material_id: impl Into<String>, width: f64, depth: f64, thickness: f64) -> Self {
        Self {
            material_id: material_id.into(),
            label: String::new(),
            width,
            depth,
            thickness,
        }
    }
}

/// All materials available to a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockSettings {
    pub materials: Vec<StockMaterial>,
}

impl StockSettings {
    /// Find a material by id.
    pub fn find(&self, material_id: &str) -> Option<&StockMaterial> {
        self.materials.iter().find(|m| m.material_id == material_id)
    }

    /// The first material, used as the sheet template for nesting.
    pub fn template(&self) -> Option<&StockMaterial> {
        self.materials.first()
    }
}
