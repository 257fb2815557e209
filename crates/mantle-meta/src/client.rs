//! Per-shard metadata client trait
//!
//! One client exists per metadata shard. Failures surface as a closed
//! variant type so the translator can match them exhaustively instead of
//! inspecting stringly-typed cause names.

use crate::record::{BucketRecord, ObjectRecord};
use async_trait::async_trait;
use mantle_common::{BucketName, ObjectId, ObjectName, OwnerId, RoleId, SharkLocation};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Failure causes a metadata shard can report. Closed on purpose: every
/// cause the backend distinguishes gets its own variant, and the
/// translator matches them all.
#[derive(Debug, Clone, Error)]
pub enum MetaClientError {
    #[error("bucket not found")]
    BucketNotFound,

    #[error("object not found")]
    ObjectNotFound,

    #[error("shard unavailable: {0}")]
    Unavailable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("shard protocol error [{code}]: {message}")]
    Protocol { code: String, message: String },
}

/// Everything needed to persist one object record. Assembled by the
/// pipeline only after content size, durability, and role resolution have
/// all succeeded.
#[derive(Clone, Debug)]
pub struct CreateObjectParams {
    pub owner: OwnerId,
    pub bucket_id: Uuid,
    pub name: ObjectName,
    pub object_id: ObjectId,
    pub content_length: u64,
    pub content_md5: String,
    pub content_type: String,
    pub headers: HashMap<String, String>,
    pub roles: Vec<RoleId>,
    pub sharks: Vec<SharkLocation>,
    pub vnode: u32,
    pub request_id: String,
}

/// Client for a single metadata shard
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Fetch a bucket record by (owner, name). Bucket records are not
    /// vnode-scoped; the shard resolves them internally.
    async fn get_bucket(
        &self,
        owner: OwnerId,
        name: &BucketName,
    ) -> Result<BucketRecord, MetaClientError>;

    /// Fetch an object record by (owner, bucket id, name) at the routed
    /// vnode.
    async fn get_object(
        &self,
        owner: OwnerId,
        bucket_id: Uuid,
        name: &ObjectName,
        vnode: u32,
    ) -> Result<ObjectRecord, MetaClientError>;

    /// Persist a fully-assembled object record at the routed vnode,
    /// returning the stored record (with its assigned modification time).
    async fn create_object(
        &self,
        params: CreateObjectParams,
    ) -> Result<ObjectRecord, MetaClientError>;

    /// Delete an object record at the routed vnode.
    async fn delete_object(
        &self,
        owner: OwnerId,
        bucket_id: Uuid,
        name: &ObjectName,
        vnode: u32,
    ) -> Result<(), MetaClientError>;
}
