//! Mantle Common - shared types and utilities
//!
//! Foundational types used across the request-orchestration pipeline:
//! identifiers, naming grammar, the client-facing error taxonomy,
//! configuration, and shared header constants.

pub mod config;
pub mod error;
pub mod headers;
pub mod types;

pub use config::{ApiConfig, DurabilityConfig};
pub use error::{Error, Result};
pub use types::{
    BucketName, BucketNameError, ObjectId, ObjectName, ObjectNameError, OwnerId, RoleId,
    SharkLocation,
};
