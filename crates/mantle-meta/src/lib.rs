//! Mantle Meta - sharded metadata-store client layer
//!
//! The boundary between the orchestration pipeline and the partitioned
//! metadata store: record types, the per-shard client trait with its
//! closed error variant, the translator onto the client-facing taxonomy,
//! and the placement wrapper that routes each call to its shard.

pub mod client;
pub mod memory;
pub mod placement;
pub mod record;
pub mod translate;

pub use client::{CreateObjectParams, MetaClientError, MetadataClient};
pub use memory::InMemoryMetadataClient;
pub use placement::MetadataPlacement;
pub use record::{BucketRecord, ObjectRecord};
pub use translate::{translate_bucket_error, translate_object_error};
