//! Error types for novahr.
//!
//! Storage primitives and form validation report failures through [`Error`].
//! The keyed stores built on top of them swallow these errors
//! and log them instead; see [`crate::store`].

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for novahr operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the storage database.
    #[error("failed to open storage at {path}: {source}")]
    StorageOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A storage query failed.
    #[error("storage query failed: {0}")]
    StorageQuery(#[from] rusqlite::Error),

    /// Failed to initialize or upgrade the storage schema.
    #[error("storage schema error: {message}")]
    Schema {
        /// Description of what went wrong.
        message: String,
    },

    /// Writing a value would exceed the storage quota.
    #[error("storage quota exceeded writing '{key}': {required} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Total bytes the area would hold after the write.
        required: u64,
        /// Configured quota in bytes.
        quota: u64,
    },

    /// The storage connection lock was poisoned by a panicking holder.
    #[error("storage lock poisoned")]
    LockPoisoned,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Domain Errors ===
    /// A submitted form was rejected.
    #[error("submission rejected: {reason}")]
    Validation {
        /// Why the submission was rejected.
        reason: String,
    },

    /// No record with the given id exists in the collection.
    #[error("{collection} record not found: {id}")]
    NotFound {
        /// Collection that was searched.
        collection: &'static str,
        /// The id that was looked up.
        id: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for novahr operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation (rejected submission) error.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a not-found error for the given collection.
    #[must_use]
    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Check if this error is a rejected submission.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error is a quota failure.
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("salary must be positive");
        assert_eq!(
            err.to_string(),
            "submission rejected: salary must be positive"
        );
        assert!(err.is_validation());
        assert!(!err.is_quota_exceeded());
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("employee", "emp-42");
        assert_eq!(err.to_string(), "employee record not found: emp-42");
    }

    #[test]
    fn test_quota_exceeded_display() {
        let err = Error::QuotaExceeded {
            key: "nh_documents".to_string(),
            required: 6_000_000,
            quota: 5_242_880,
        };
        let msg = err.to_string();
        assert!(msg.contains("nh_documents"));
        assert!(msg.contains("5242880"));
        assert!(err.is_quota_exceeded());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/storage.db",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::StorageQuery(_)));
        }
    }

    #[test]
    fn test_schema_error_display() {
        let err = Error::Schema {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "refresh_interval_ms must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("refresh_interval_ms"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
