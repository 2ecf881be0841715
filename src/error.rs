//! Error types for geostore operations

use thiserror::Error;

/// Main error type for geostore operations
#[derive(Error, Debug)]
pub enum GeoError {
    // -------------------------------------------------------------------------
    // Object resolution
    // -------------------------------------------------------------------------
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Ownership violation: {0}")]
    OwnershipViolation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    // -------------------------------------------------------------------------
    // Data access
    // -------------------------------------------------------------------------
    #[error("Range error: {0}")]
    Range(String),

    #[error("Unknown sort key: {0}")]
    UnknownSortKey(String),

    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    // -------------------------------------------------------------------------
    // Storage
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage is read-only: {0}")]
    ReadOnly(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GeoError {
    /// Errors that object lookup/creation reports as a null handle instead of a failure
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            GeoError::TypeMismatch(_)
                | GeoError::OwnershipViolation(_)
                | GeoError::NotFound(_)
                | GeoError::AlreadyExists(_)
                | GeoError::InvalidName(_)
        )
    }

    /// Errors raised by the storage layer itself (the IOError class)
    pub fn is_io(&self) -> bool {
        matches!(self, GeoError::Io(_) | GeoError::ReadOnly(_))
    }
}

/// Specialized Result type for geostore operations
pub type Result<T> = std::result::Result<T, GeoError>;

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        GeoError::Serialization(err.to_string())
    }
}

/// Turn resolution failures into `None`, keep everything else as an error
pub(crate) fn resolved<T>(res: Result<T>) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_resolution_failure() => {
            tracing::debug!("resolution failed: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_failures_become_none() {
        let r: Result<u8> = Err(GeoError::TypeMismatch("map vs seis".into()));
        assert!(resolved(r).unwrap().is_none());

        let r: Result<u8> = Err(GeoError::Range("trace 40 of 30".into()));
        assert!(resolved(r).is_err());

        assert_eq!(resolved(Ok(3u8)).unwrap(), Some(3));
    }

    #[test]
    fn test_io_classification() {
        let e = GeoError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(e.is_io());
        assert!(!e.is_resolution_failure());
        assert!(GeoError::ReadOnly("root".into()).is_io());
    }
}
