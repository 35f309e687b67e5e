//! Error types for the layout engine.

use thiserror::Error;

/// Main error type for layout operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied value is unusable (bad length, zero count mismatch, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Element type name is not one of SCALAR, VEC2..VEC4, MAT2..MAT4
    #[error("Unknown element type: {0}")]
    UnknownElementType(String),

    /// Component type name or GL constant is not supported
    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),

    /// Element or component index outside of the accessor
    #[error("{what} index {index} out of range (count: {count})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        count: usize,
    },

    /// Value kind does not match the accessor component type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Id already registered for another entity of the same kind
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Entity has not been grouped into a view or buffer yet
    #[error("Not placed: {0}")]
    NotPlaced(String),

    /// A computed layout violates its own invariants
    #[error("Internal consistency violation: {0}")]
    InternalConsistency(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Layout description could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid argument error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an internal consistency error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalConsistency(msg.into())
    }
}

/// Result type alias for layout operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::IndexOutOfRange { what: "element", index: 5, count: 3 };
        assert_eq!(e.to_string(), "element index 5 out of range (count: 3)");

        let e = Error::invalid("empty data");
        assert!(e.to_string().contains("empty data"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
