//! Error taxonomy for the record store.

use thiserror::Error;

/// Failures surfaced by the repository, the grade editor and the storage
/// backends. All of them are recoverable at the interaction boundary.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The backing store could not be opened, read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A selection index that is non-numeric or outside `[1, count]`.
    #[error("invalid student number {input:?}: expected 1..={count}")]
    InvalidPosition { input: String, count: usize },

    /// No record carries exactly this name.
    #[error("no student named {0:?}")]
    NotFound(String),

    /// A grade token that is not an integer, or an empty grade list.
    #[error("invalid grade input {token:?}: enter whitespace-separated integers")]
    InvalidGradeInput { token: String },

    /// A stored student row that cannot be decoded. Row 0 is the header.
    #[error("malformed student row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
}

impl From<std::io::Error> for RecordError {
    fn from(e: std::io::Error) -> Self {
        RecordError::StorageUnavailable(e.to_string())
    }
}

impl From<csv::Error> for RecordError {
    fn from(e: csv::Error) -> Self {
        RecordError::StorageUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_storage_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "students.csv");
        let err: RecordError = io.into();
        assert!(matches!(err, RecordError::StorageUnavailable(_)));
    }

    #[test]
    fn test_invalid_position_message() {
        let err = RecordError::InvalidPosition {
            input: "7".to_string(),
            count: 3,
        };
        assert_eq!(err.to_string(), "invalid student number \"7\": expected 1..=3");
    }
}
