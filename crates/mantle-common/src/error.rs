//! Error types for Mantle
//!
//! The client-facing error taxonomy for the orchestration pipeline.
//! Structural errors are produced synchronously and short-circuit the
//! pipeline; backend-sourced failures are mapped onto this taxonomy at
//! the metadata-client boundary.

use crate::types::{BucketNameError, ObjectNameError};
use thiserror::Error;

/// Common result type for Mantle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Client-facing error taxonomy
#[derive(Debug, Error)]
pub enum Error {
    // Structural/validation errors (pre-network)
    #[error("invalid bucket name: {0}")]
    InvalidBucketName(#[from] BucketNameError),

    #[error("invalid bucket object name: {0}")]
    InvalidBucketObjectName(#[from] ObjectNameError),

    #[error("durability level must be between {min} and {max}")]
    InvalidDurabilityLevel { min: u32, max: u32 },

    #[error("content-length header is required")]
    ContentLengthRequired,

    #[error("request content length {length} is invalid")]
    MaxContentLengthExceeded { length: i64 },

    #[error("role tag not found: {0}")]
    InvalidRoleTag(String),

    // Lookup errors
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    #[error("object not found: {bucket}/{name}")]
    ObjectNotFound { bucket: String, name: String },

    // Conditional request errors
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    // Authorization errors
    #[error("access denied: {0}")]
    AccessDenied(String),

    // Backend-sourced errors
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a backend-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Check if this is a transient, backend-sourced error
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }

    /// Check if this is a not found error
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::BucketNotFound(_) | Self::ObjectNotFound { .. })
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidBucketName(_)
            | Self::InvalidBucketObjectName(_)
            | Self::InvalidDurabilityLevel { .. } => 400,

            // 403 Forbidden
            Self::AccessDenied(_) => 403,

            // 404 Not Found
            Self::BucketNotFound(_) | Self::ObjectNotFound { .. } => 404,

            // 409 Conflict
            Self::InvalidRoleTag(_) => 409,

            // 411 Length Required
            Self::ContentLengthRequired => 411,

            // 412 Precondition Failed
            Self::PreconditionFailed(_) => 412,

            // 413 Payload Too Large
            Self::MaxContentLengthExceeded { .. } => 413,

            // 500 Internal Server Error
            Self::Internal(_) => 500,

            // 503 Service Unavailable
            Self::BackendUnavailable(_) => 503,
        }
    }

    /// Get the stable wire code for this error
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidBucketName(_) => "InvalidBucketName",
            Self::InvalidBucketObjectName(_) => "InvalidBucketObjectName",
            Self::InvalidDurabilityLevel { .. } => "InvalidDurabilityLevel",
            Self::ContentLengthRequired => "ContentLengthRequired",
            Self::MaxContentLengthExceeded { .. } => "MaxContentLengthExceeded",
            Self::InvalidRoleTag(_) => "InvalidRoleTag",
            Self::BucketNotFound(_) => "BucketNotFound",
            Self::ObjectNotFound { .. } => "ObjectNotFound",
            Self::PreconditionFailed(_) => "PreconditionFailed",
            Self::AccessDenied(_) => "AccessDenied",
            Self::BackendUnavailable(_) => "ServiceUnavailable",
            Self::Internal(_) => "InternalError",
        }
    }
}
