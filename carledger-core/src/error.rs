//! Error types for ledger operations
//!
//! Every contract operation fails with a [`LedgerError`]. Errors carry:
//! - A human-readable message
//! - A stable error code for programmatic handling
//! - A category for grouping
//! - An HTTP status code for the REST façade
//!
//! # Example
//!
//! ```rust
//! use carledger_core::error::{LedgerError, ErrorCategory};
//!
//! let err = LedgerError::NotFound { key: "CAR42".to_string() };
//! assert_eq!(err.category(), ErrorCategory::NotFound);
//! assert_eq!(err.http_status_code(), 404);
//! assert_eq!(err.error_code(), "NOT_FOUND");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Referenced key absent (404)
    NotFound,
    /// Input validation failed (400)
    Validation,
    /// Key or version conflict (409)
    Conflict,
    /// Stored data could not be interpreted (422)
    Integrity,
    /// Internal error (500)
    Internal,
    /// External collaborator failed (502)
    External,
}

/// Errors that can occur in ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    // ═══════════════════════════════════════════════════════════════════════
    // Contract errors
    // ═══════════════════════════════════════════════════════════════════════

    /// A required argument was missing or empty
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    /// The referenced key has no value in the ledger
    #[error("{key} does not exist")]
    NotFound { key: String },

    /// Attempted to create an asset under a key that is already taken
    #[error("Car {key} already exists")]
    Conflict { key: String },

    /// The updates payload is not a JSON object of the expected shape
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    /// The stored value under a key cannot be read as a car record
    #[error("Stored record '{key}' is invalid: {reason}")]
    InvalidRecord { key: String, reason: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Dispatch errors (text operation surface)
    // ═══════════════════════════════════════════════════════════════════════

    /// No contract operation has this name
    #[error("Unknown function: '{name}'")]
    UnknownFunction { name: String },

    /// Wrong number of arguments for a contract operation
    #[error("Function '{function}' expects {expected} argument(s), got {actual}")]
    InvalidArguments {
        function: String,
        expected: String,
        actual: usize,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Store errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Optimistic write rejected because the key changed since it was read
    #[error("Version conflict on '{key}': expected {expected}, found {actual}. Re-read and retry the transaction.")]
    VersionConflict {
        key: String,
        expected: String,
        actual: String,
    },

    /// JSON serialization or deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Store lock is poisoned (panic occurred while holding lock)
    #[error("Store lock poisoned. This is a bug; please report it.")]
    StorageLocked,

    /// I/O operation failed
    #[error("IO error: {message}")]
    Io { message: String },
}

impl LedgerError {
    /// Shorthand for a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        LedgerError::Validation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a not-found error
    pub fn not_found(key: impl Into<String>) -> Self {
        LedgerError::NotFound { key: key.into() }
    }

    /// Returns true if this error might succeed on retry
    ///
    /// Only contention errors qualify: a version conflict means another
    /// transaction won the race, and a poisoned lock indicates transient
    /// trouble in the backend.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LedgerError::VersionConflict { .. } | LedgerError::StorageLocked
        )
    }

    /// Returns true if this error is a client error (4xx equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(self.http_status_code(), 400..=499)
    }

    /// Returns true if this error is a server error (5xx equivalent)
    pub fn is_server_error(&self) -> bool {
        matches!(self.http_status_code(), 500..=599)
    }

    /// Returns the error category for grouping
    pub fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::NotFound { .. } => ErrorCategory::NotFound,

            LedgerError::Validation { .. }
            | LedgerError::MalformedInput { .. }
            | LedgerError::UnknownFunction { .. }
            | LedgerError::InvalidArguments { .. } => ErrorCategory::Validation,

            LedgerError::Conflict { .. } | LedgerError::VersionConflict { .. } => {
                ErrorCategory::Conflict
            }

            LedgerError::InvalidRecord { .. } => ErrorCategory::Integrity,

            LedgerError::Json(_) | LedgerError::StorageLocked => ErrorCategory::Internal,

            LedgerError::Io { .. } => ErrorCategory::External,
        }
    }

    /// Returns the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::Validation { .. } => "VALIDATION_ERROR",
            LedgerError::NotFound { .. } => "NOT_FOUND",
            LedgerError::Conflict { .. } => "CONFLICT",
            LedgerError::MalformedInput { .. } => "MALFORMED_INPUT",
            LedgerError::InvalidRecord { .. } => "INVALID_RECORD",
            LedgerError::UnknownFunction { .. } => "UNKNOWN_FUNCTION",
            LedgerError::InvalidArguments { .. } => "INVALID_ARGUMENTS",
            LedgerError::VersionConflict { .. } => "VERSION_CONFLICT",
            LedgerError::Json(_) => "JSON_ERROR",
            LedgerError::StorageLocked => "STORAGE_LOCKED",
            LedgerError::Io { .. } => "IO_ERROR",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            LedgerError::Validation { .. }
            | LedgerError::MalformedInput { .. }
            | LedgerError::UnknownFunction { .. }
            | LedgerError::InvalidArguments { .. } => 400,

            // 404 Not Found
            LedgerError::NotFound { .. } => 404,

            // 409 Conflict
            LedgerError::Conflict { .. } | LedgerError::VersionConflict { .. } => 409,

            // 422 Unprocessable Entity
            LedgerError::InvalidRecord { .. } => 422,

            // 500 Internal Server Error
            LedgerError::Json(_) | LedgerError::StorageLocked => 500,

            // 502 Bad Gateway
            LedgerError::Io { .. } => 502,
        }
    }

    /// Converts this error to a JSON-serializable response object
    ///
    /// ```json
    /// {
    ///   "error": {
    ///     "code": "NOT_FOUND",
    ///     "message": "CAR42 does not exist",
    ///     "category": "not_found",
    ///     "recoverable": false
    ///   }
    /// }
    /// ```
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                recoverable: self.is_recoverable(),
            },
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io {
            message: err.to_string(),
        }
    }
}

/// JSON-serializable error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail for JSON responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable error code (e.g., "NOT_FOUND")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Error category
    pub category: ErrorCategory,
    /// Whether retry might succeed
    pub recoverable: bool,
}
