//! Mantle API - the request-orchestration pipeline
//!
//! Sequences validation, placement routing, conditional evaluation,
//! durability enforcement, role resolution, metadata assembly, and error
//! normalization into the user-facing object write/read/delete
//! operations. Each request runs one independent pipeline; the only
//! shared state is read-only configuration and the placement table.

pub mod assembler;
pub mod authz;
pub mod conditional;
pub mod content;
pub mod context;
pub mod delete;
pub mod durability;
pub mod read;
pub mod write;

#[cfg(test)]
pub(crate) mod testutil;

pub use assembler::{AssembledMetadata, assemble};
pub use authz::{Authorizer, OpenAuthorizer};
pub use conditional::{ConditionalOutcome, Preconditions};
pub use content::{ContentPlan, SharkStreamer, StreamedContent, plan_content};
pub use context::{ActionVerb, AuthAction, Bucket, BucketObject, RequestContext, ResourceKind};
pub use delete::ObjectDeleteOrchestrator;
pub use durability::validate_durability;
pub use read::{ObjectReadOrchestrator, ReadOutcome};
pub use write::{ObjectWriteOrchestrator, WriteOutcome, WriteRequest};
