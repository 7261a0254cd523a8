//! Error types for tile grid and transform operations.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Broad classification of a [`GridError`].
///
/// Usage and domain errors are never transient; they propagate to the
/// immediate caller and are not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed arguments that can never be valid.
    Usage,
    /// The arguments are well-formed but fall outside the grid's domain.
    Domain,
    /// A grid specification could not be read or validated.
    Config,
    /// Reprojection between coordinate systems failed.
    Projection,
}

/// Primary error type for grid operations.
#[derive(Debug, Error)]
pub enum GridError {
    // === Usage Errors ===
    #[error("tile grids only have two dimensions (row/col), got an index with {len} components")]
    IndexShape { len: usize },

    #[error("only integer row/col indexes are supported, got {0}")]
    IndexType(String),

    #[error(
        "must provide either a bounding box (`bbox`) or the dimensions \
         (`height` and `width`) of the raster grid"
    )]
    MissingShape,

    #[error("not implemented for rotated transforms: {0}")]
    RotatedTransform(String),

    #[error("\"{axis}\" coordinate needs at least 2 values to determine spacing, got {len}")]
    TooFewCoordinates { axis: &'static str, len: usize },

    #[error("resolution mismatch: expected {expected:?}, got {actual:?}")]
    ResolutionMismatch {
        expected: (f64, f64),
        actual: (f64, f64),
    },

    #[error("at least one bounding box is required")]
    EmptyInput,

    #[error("expected 4 values for a bounding box, got {0}")]
    InvalidBounds(usize),

    // === Domain Errors ===
    #[error("tile at index ({row}, {col}) is outside of \"{grid}\" limits ({limits})")]
    OutOfLimits {
        row: i64,
        col: i64,
        grid: String,
        limits: String,
    },

    #[error("tile grid not found: {0}")]
    GridNotFound(String),

    // === Configuration Errors ===
    #[error("invalid grid specification: {0}")]
    Config(String),

    #[error("failed to read grid specification: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    // === Projection Errors ===
    #[error("projection error: {0}")]
    Projection(String),
}

impl GridError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GridError::IndexShape { .. }
            | GridError::IndexType(_)
            | GridError::MissingShape
            | GridError::RotatedTransform(_)
            | GridError::TooFewCoordinates { .. }
            | GridError::ResolutionMismatch { .. }
            | GridError::EmptyInput
            | GridError::InvalidBounds(_) => ErrorKind::Usage,

            GridError::OutOfLimits { .. } | GridError::GridNotFound(_) => ErrorKind::Domain,

            GridError::Config(_)
            | GridError::Io(_)
            | GridError::Yaml(_)
            | GridError::Json(_)
            | GridError::UnsupportedCrs(_) => ErrorKind::Config,

            GridError::Projection(_) => ErrorKind::Projection,
        }
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a Projection error.
    pub fn projection(msg: impl Into<String>) -> Self {
        Self::Projection(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(GridError::MissingShape.kind(), ErrorKind::Usage);
        assert_eq!(GridError::IndexShape { len: 1 }.kind(), ErrorKind::Usage);
        assert_eq!(GridError::IndexType("0.5".into()).kind(), ErrorKind::Usage);
        assert_eq!(
            GridError::OutOfLimits {
                row: 12,
                col: 8,
                grid: "Grid".into(),
                limits: "rows 0..=11, cols 0..=7".into(),
            }
            .kind(),
            ErrorKind::Domain
        );
        assert_eq!(GridError::config("bad").kind(), ErrorKind::Config);
        assert_eq!(GridError::projection("nan").kind(), ErrorKind::Projection);
    }

    #[test]
    fn test_out_of_limits_message_names_grid() {
        let err = GridError::OutOfLimits {
            row: 12,
            col: 8,
            grid: "Landsat ARD - CONUS".into(),
            limits: "rows 0..=21, cols 0..=32".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("outside of \"Landsat ARD - CONUS\" limits"));
        assert!(msg.contains("(12, 8)"));
    }
}
