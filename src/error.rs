//! Error types for point set construction and spatial queries.

use thiserror::Error;

/// Result type for point set and search operations.
pub type FindResult<T> = Result<T, FindError>;

/// Errors that can occur while building point sets or answering queries.
///
/// All argument checks run before any search work starts, so a query either
/// returns a complete result or one of these errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FindError {
    /// The neighbour count is not an integer in `1..=available`.
    #[error("invalid argument: k must be an integer between 1 and {available}, got {k}")]
    InvalidCount { k: String, available: usize },

    /// The query argument is not a usable point collection.
    #[error("invalid argument: query must be a point collection ({0})")]
    InvalidQuery(String),

    /// The distance metric token is unknown or of the wrong kind.
    #[error("invalid argument: unknown distance metric {0}, expected one of \"euclidean\", \"spherical_radians\", \"spherical_meter\"")]
    InvalidMetric(String),

    /// The search radius is negative or not a number.
    #[error("invalid argument: radius must be a non-negative number, got {0}")]
    InvalidRadius(f64),

    /// The absolute tolerance is negative or not a number.
    #[error("invalid argument: absolute tolerance must be a non-negative number ({0})")]
    InvalidTolerance(String),

    /// The sort flag is not a boolean.
    #[error("invalid argument: return_sorted must be a boolean ({0})")]
    InvalidSortFlag(String),

    /// The coordinate buffer does not match the channel shape.
    #[error("invalid argument: {len} coordinates do not fit channel shape {shape:?} (expected {expected})")]
    InvalidShape {
        shape: Vec<usize>,
        len: usize,
        expected: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("invalid argument: coordinate {component} of point {index} is not finite")]
    InvalidCoordinates { index: usize, component: usize },

    /// A flat or multi-dimensional index lies outside the channel shape.
    #[error("invalid argument: index {index:?} is out of range for channel shape {shape:?}")]
    IndexOutOfRange { index: Vec<usize>, shape: Vec<usize> },

    /// The reference point set has no points to search.
    #[error("cannot search an empty point set")]
    EmptyPointSet,

    /// A spatial index was queried with a point set it was not built from.
    #[error("spatial index was built from snapshot {built} but queried with snapshot {given}")]
    StaleIndex { built: u64, given: u64 },
}

impl FindError {
    /// Returns `true` for errors caused by an invalid caller-supplied argument.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, FindError::EmptyPointSet | FindError::StaleIndex { .. })
    }
}
