//! Error types for the CAM pipeline.
//!
//! Two kinds of failure live here. [`CamError`] aborts a whole request;
//! [`SkipReason`] drops a single object, operation or assignment and lets the
//! rest of the batch continue.

use std::path::PathBuf;
use thiserror::Error;

/// Error codes for hard failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// File not found (-1)
    FileNotFound = -1,
    /// Empty file (-2)
    EmptyFile = -2,
    /// Malformed job or preset document (-3)
    ParseError = -3,
    /// No stock material defined (-11)
    NoStock = -11,
    /// Rotation not a multiple of 45 degrees (E100)
    InvalidRotation = 100,
    /// Nothing to emit (E201)
    NoOperations = 201,
    /// Preset not found (E202)
    PresetNotFound = 202,
}

/// Main error type for the pipeline.
#[derive(Debug, Error)]
pub enum CamError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Empty file: {path}")]
    EmptyFile { path: PathBuf },

    #[error("Invalid job document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No stock material defined")]
    NoStock,

    #[error("Invalid rotation {degrees}: must be one of 0, 45, 90, 135, 180, 225, 270, 315")]
    InvalidRotation { degrees: i64 },

    #[error("No operations provided")]
    NoOperations,

    #[error("Preset not found: {id}")]
    PresetNotFound { id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CamError {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CamError::FileNotFound { .. } => ErrorCode::FileNotFound,
            CamError::EmptyFile { .. } => ErrorCode::EmptyFile,
            CamError::Json(_) => ErrorCode::ParseError,
            CamError::NoStock => ErrorCode::NoStock,
            CamError::InvalidRotation { .. } => ErrorCode::InvalidRotation,
            CamError::NoOperations => ErrorCode::NoOperations,
            CamError::PresetNotFound { .. } => ErrorCode::PresetNotFound,
            CamError::Io(_) => ErrorCode::FileNotFound,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code() as i32
    }
}

/// Why a single item was dropped from a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("{object_id}: no usable cross-section")]
    EmptyCrossSection { object_id: String },

    #[error("{object_id}: outline has zero length")]
    DegeneratePolygon { object_id: String },

    #[error("{operation_id}: operation not found")]
    MissingOperation { operation_id: String },

    #[error("{operation_id}: material {material_id} not found")]
    MissingMaterial {
        operation_id: String,
        material_id: String,
    },

    #[error("{operation_id}: operation has no cuttable geometry")]
    EmptyGeometry { operation_id: String },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, CamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CamError::NoOperations.code(), ErrorCode::NoOperations);
        assert_eq!(CamError::NoOperations.code_value(), 201);
        assert_eq!(CamError::NoStock.code_value(), -11);
        assert_eq!(
            CamError::InvalidRotation { degrees: 30 }.code(),
            ErrorCode::InvalidRotation
        );
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::MissingMaterial {
            operation_id: "op_002".into(),
            material_id: "mtl_9".into(),
        };
        assert_eq!(reason.to_string(), "op_002: material mtl_9 not found");
    }
}
