//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Coordinate text that is neither a hemisphere form nor a plain number
    #[error("Invalid coordinate format: {0}")]
    InvalidFormat(String),

    /// Input line that is not a `lat, lon` pair
    #[error("Invalid coordinate pair '{0}': expected '<latitude>, <longitude>'")]
    InvalidPair(String),

    /// Latitude outside [-90, 90]
    #[error("Invalid latitude: {0}. Must be between -90 and 90.")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180]
    #[error("Invalid longitude: {0}. Must be between -180 and 180.")]
    LongitudeOutOfRange(f64),

    /// Matching was attempted against an empty candidate set
    #[error("Cannot match against an empty target set")]
    EmptyTargetSet,

    /// Matching was interrupted before it completed
    #[error("Matching cancelled after {completed} of {total} points")]
    Cancelled {
        /// Source points matched before cancellation
        completed: usize,
        /// Total source points
        total: usize,
    },

    /// CSV reader failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error code for programmatic handling.
/// Range: 11xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Invalid coordinate text
    InvalidFormat = 11001,
    /// Malformed coordinate pair
    InvalidPair = 11002,
    /// Latitude out of range
    LatitudeOutOfRange = 11003,
    /// Longitude out of range
    LongitudeOutOfRange = 11004,
    /// Empty target set
    EmptyTargetSet = 11010,
    /// Matching cancelled
    Cancelled = 11011,
    /// CSV parsing
    Csv = 11020,
    /// IO
    Io = 11021,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidFormat(_) => GeoErrorCode::InvalidFormat,
            GeoError::InvalidPair(_) => GeoErrorCode::InvalidPair,
            GeoError::LatitudeOutOfRange(_) => GeoErrorCode::LatitudeOutOfRange,
            GeoError::LongitudeOutOfRange(_) => GeoErrorCode::LongitudeOutOfRange,
            GeoError::EmptyTargetSet => GeoErrorCode::EmptyTargetSet,
            GeoError::Cancelled { .. } => GeoErrorCode::Cancelled,
            GeoError::Csv(_) => GeoErrorCode::Csv,
            GeoError::Io(_) => GeoErrorCode::Io,
        }
    }

    /// Whether the error only affects a single input record.
    ///
    /// Parse and range errors are caught per record so a bad line never aborts a batch.
    /// Everything else is a hard failure for the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GeoError::InvalidFormat(_)
                | GeoError::InvalidPair(_)
                | GeoError::LatitudeOutOfRange(_)
                | GeoError::LongitudeOutOfRange(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GeoError::EmptyTargetSet.code() as u32, 11010);
        assert_eq!(
            GeoError::InvalidFormat("x".into()).code(),
            GeoErrorCode::InvalidFormat
        );
    }

    #[test]
    fn test_recoverability() {
        assert!(GeoError::LatitudeOutOfRange(100.0).is_recoverable());
        assert!(GeoError::InvalidPair("1 2".into()).is_recoverable());
        assert!(!GeoError::EmptyTargetSet.is_recoverable());
        assert!(!GeoError::Cancelled { completed: 1, total: 3 }.is_recoverable());
    }

    #[test]
    fn test_range_messages_name_the_bound() {
        let lat = GeoError::LatitudeOutOfRange(100.0).to_string();
        assert!(lat.contains("latitude") && lat.contains("100"));
        let lon = GeoError::LongitudeOutOfRange(-200.0).to_string();
        assert!(lon.contains("longitude") && lon.contains("-200"));
    }
}
