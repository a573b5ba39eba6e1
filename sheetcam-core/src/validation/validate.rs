//! Advisory checks on machining settings and stock.

use crate::config::MIN_SPINDLE_SPEED;
use crate::model::{KindSettings, MachiningSettings, StockSettings};

/// Validation result with warnings.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationResult {
    /// Whether validation passed.
    pub passed: bool,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Error messages.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn ok() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    /// Add a warning.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Add an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.passed = false;
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
        if !other.passed {
            self.passed = false;
        }
    }

    /// Passed with nothing to report.
    pub fn is_clean(&self) -> bool {
        self.passed && self.warnings.is_empty()
    }
}

/// Check machining settings for values that are legal but likely wrong.
pub fn validate_settings(settings: &MachiningSettings) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if settings.spindle_speed < MIN_SPINDLE_SPEED {
        result.add_warning(format!(
            "Spindle speed too low ({} RPM < {})",
            settings.spindle_speed, MIN_SPINDLE_SPEED
        ));
    }
    if settings.depth_per_pass > settings.total_depth {
        result.add_warning(format!(
            "Depth per pass ({}mm) exceeds total depth ({}mm)",
            settings.depth_per_pass, settings.total_depth
        ));
    }
    if settings.feed_rate.xy <= 0.0 || settings.feed_rate.z <= 0.0 {
        result.add_warning("Feed rates must be positive");
    }
    if settings.tool.diameter <= 0.0 {
        result.add_warning("Tool diameter must be positive");
    }
    if settings.tabs.enabled && settings.tabs.height <= 0.0 {
        result.add_warning("Tabs enabled with non-positive height; no tabs will be left");
    }
    if let KindSettings::Pocket { stepover, .. } = settings.operation {
        if stepover <= 0.0 || stepover > 1.0 {
            result.add_warning(format!("Pocket stepover {} outside (0, 1]", stepover));
        }
    }

    result
}

/// Check that every stock material has a usable size.
pub fn validate_stock(stock: &StockSettings) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if stock.materials.is_empty() {
        result.add_error("No stock material defined");
    }
    for m in &stock.materials {
        if m.width <= 0.0 || m.depth <= 0.0 || m.thickness <= 0.0 {
            result.add_error(format!(
                "{}: invalid sheet size {}x{}x{}",
                m.material_id, m.width, m.depth, m.thickness
            ));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KindDefaults;
    use crate::model::{PocketPattern, StockMaterial};

    // ==================== ValidationResult tests ====================

    #[test]
    fn test_validation_result_ok() {
        let result = ValidationResult::ok();
        assert!(result.passed);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.is_clean());
    }

    #[test]
    fn test_validation_result_merge() {
        let mut result1 = ValidationResult::ok();
        result1.add_warning("Warning 1");

        let mut result2 = ValidationResult::ok();
        result2.add_error("Error 1");
        result2.add_warning("Warning 2");

        result1.merge(result2);
        assert!(!result1.passed);
        assert_eq!(result1.warnings.len(), 2);
        assert_eq!(result1.errors.len(), 1);
    }

    // ==================== validate_settings tests ====================

    #[test]
    fn test_default_settings_are_clean() {
        let d = KindDefaults::standard();
        assert!(validate_settings(&d.contour).is_clean());
        assert!(validate_settings(&d.pocket).is_clean());
        assert!(validate_settings(&d.drill).is_clean());
    }

    #[test]
    fn test_low_spindle_and_deep_pass_warn() {
        let mut s = KindDefaults::standard().contour;
        s.spindle_speed = 3000;
        s.depth_per_pass = 20.0;
        let result = validate_settings(&s);
        assert!(result.passed);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("3000"));
    }

    #[test]
    fn test_bad_feed_tool_tabs_stepover_warn() {
        let mut s = KindDefaults::standard().pocket;
        s.feed_rate.z = 0.0;
        s.tool.diameter = 0.0;
        s.tabs.enabled = true;
        s.operation = KindSettings::Pocket {
            pattern: PocketPattern::Raster,
            stepover: 1.5,
        };
        assert_eq!(validate_settings(&s).warnings.len(), 4);
    }

    // ==================== validate_stock tests ====================

    #[test]
    fn test_validate_stock() {
        let good = StockSettings {
            materials: vec![StockMaterial::new("mtl_1", 1220.0, 2440.0, 18.0)],
        };
        assert!(validate_stock(&good).passed);

        let bad = StockSettings {
            materials: vec![StockMaterial::new("mtl_1", 0.0, 2440.0, 18.0)],
        };
        assert!(!validate_stock(&bad).passed);
        assert!(!validate_stock(&StockSettings::default()).passed);
    }
}
