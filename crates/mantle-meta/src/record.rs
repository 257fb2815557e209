//! Metadata record types
//!
//! The canonical shapes persisted in the sharded metadata store. An
//! `ObjectRecord` is written exactly once per successful write and only
//! replaced whole by a subsequent overwrite.

use chrono::{DateTime, Utc};
use mantle_common::{BucketName, ObjectId, ObjectName, OwnerId, RoleId, SharkLocation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Persisted bucket record, keyed by (owner, bucket name)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRecord {
    /// Bucket identifier assigned at creation
    pub id: Uuid,
    /// Owning account
    pub owner: OwnerId,
    /// Bucket name
    pub name: BucketName,
    /// Creation timestamp
    pub created: DateTime<Utc>,
}

/// Persisted object metadata, keyed by (owner, bucket id, object name)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Object identifier; doubles as the entity tag
    pub id: ObjectId,
    /// Owning account
    pub owner: OwnerId,
    /// Identifier of the containing bucket
    pub bucket_id: Uuid,
    /// Object name within the bucket
    pub name: ObjectName,
    /// Content size in bytes
    pub content_length: u64,
    /// Base64-encoded MD5 of the content
    pub content_md5: String,
    /// Content type supplied on the write
    pub content_type: String,
    /// Allow-listed headers captured at write time
    pub headers: HashMap<String, String>,
    /// Resolved role identifiers
    pub roles: Vec<RoleId>,
    /// Replica placements holding the content
    pub sharks: Vec<SharkLocation>,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

impl ObjectRecord {
    /// The entity tag exposed for conditional requests
    #[must_use]
    pub fn etag(&self) -> String {
        self.id.to_string()
    }

    /// Replica count actually recorded for the object
    #[must_use]
    pub fn durability(&self) -> usize {
        self.sharks.len()
    }
}
