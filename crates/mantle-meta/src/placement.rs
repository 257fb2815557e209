//! Routed access to the sharded metadata store
//!
//! Combines the pure placement ring with the per-shard client table.
//! The table is registered once at startup and read concurrently by
//! every in-flight pipeline; `client_for` never re-establishes routing
//! state.

use crate::client::{CreateObjectParams, MetaClientError, MetadataClient};
use crate::record::{BucketRecord, ObjectRecord};
use crate::translate::{translate_bucket_error, translate_object_error};
use dashmap::DashMap;
use mantle_common::{BucketName, Error, ObjectName, OwnerId, Result};
use mantle_placement::{PlacementLocation, PlacementRing};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Placement ring plus the clients able to talk to each shard
pub struct MetadataPlacement {
    ring: PlacementRing,
    clients: DashMap<u32, Arc<dyn MetadataClient>>,
}

impl MetadataPlacement {
    /// Create a placement over the given ring with an empty client table
    #[must_use]
    pub fn new(ring: PlacementRing) -> Self {
        Self {
            ring,
            clients: DashMap::new(),
        }
    }

    /// Register the client for one shard. Called during startup, before
    /// requests flow.
    pub fn register_client(&self, shard: u32, client: Arc<dyn MetadataClient>) {
        self.clients.insert(shard, client);
    }

    /// The underlying ring
    #[must_use]
    pub const fn ring(&self) -> &PlacementRing {
        &self.ring
    }

    /// Deterministic location of a bucket record
    #[must_use]
    pub fn bucket_location(&self, owner: OwnerId, bucket: &BucketName) -> PlacementLocation {
        self.ring.locate_bucket(owner, bucket)
    }

    /// Deterministic location of an object record
    #[must_use]
    pub fn object_location(
        &self,
        owner: OwnerId,
        bucket_id: Uuid,
        object: &ObjectName,
    ) -> PlacementLocation {
        self.ring.locate_object(owner, bucket_id, object)
    }

    /// Look up the client serving a location. Safe to call repeatedly
    /// with the same location.
    pub fn client_for(&self, location: PlacementLocation) -> Result<Arc<dyn MetadataClient>> {
        self.clients
            .get(&location.shard)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                Error::unavailable(format!("no client registered for shard {}", location.shard))
            })
    }

    /// Fetch a bucket record through the routed client, translating
    /// backend causes onto the client-facing taxonomy.
    pub async fn fetch_bucket(&self, owner: OwnerId, bucket: &BucketName) -> Result<BucketRecord> {
        let location = self.bucket_location(owner, bucket);
        let client = self.client_for(location)?;
        debug!(%owner, %bucket, shard = location.shard, "fetch_bucket: requested");

        match client.get_bucket(owner, bucket).await {
            Ok(record) => {
                debug!(%owner, %bucket, bucket_id = %record.id, "fetch_bucket: done");
                Ok(record)
            }
            Err(err) => {
                let err = translate_bucket_error(err, bucket);
                debug!(%owner, %bucket, %err, "fetch_bucket: failed");
                Err(err)
            }
        }
    }

    /// Fetch an object record through the routed client. `Ok(None)` means
    /// the object does not exist; every other failure is translated.
    pub async fn fetch_object(
        &self,
        owner: OwnerId,
        bucket: &BucketName,
        bucket_id: Uuid,
        object: &ObjectName,
    ) -> Result<Option<ObjectRecord>> {
        let location = self.object_location(owner, bucket_id, object);
        let client = self.client_for(location)?;
        debug!(%owner, %bucket, %object, vnode = location.vnode, "fetch_object: requested");

        match client.get_object(owner, bucket_id, object, location.vnode).await {
            Ok(record) => {
                debug!(%owner, %bucket, %object, etag = %record.etag(), "fetch_object: done");
                Ok(Some(record))
            }
            Err(MetaClientError::ObjectNotFound) => Ok(None),
            Err(err) => {
                let err = translate_object_error(err, bucket, object);
                debug!(%owner, %bucket, %object, %err, "fetch_object: failed");
                Err(err)
            }
        }
    }

    /// Persist an object record at its routed location. The vnode in
    /// `params` is overwritten with the routed one so a caller cannot
    /// desynchronize routing and persistence.
    pub async fn create_object(
        &self,
        bucket: &BucketName,
        mut params: CreateObjectParams,
    ) -> Result<ObjectRecord> {
        let location = self.object_location(params.owner, params.bucket_id, &params.name);
        let client = self.client_for(location)?;
        params.vnode = location.vnode;
        debug!(
            owner = %params.owner,
            %bucket,
            object = %params.name,
            object_id = %params.object_id,
            vnode = location.vnode,
            "create_object: requested"
        );

        let object = params.name.clone();
        match client.create_object(params).await {
            Ok(record) => {
                debug!(%bucket, %object, etag = %record.etag(), "create_object: done");
                Ok(record)
            }
            Err(err) => {
                let err = translate_object_error(err, bucket, &object);
                debug!(%bucket, %object, %err, "create_object: failed");
                Err(err)
            }
        }
    }

    /// Delete an object record at its routed location.
    pub async fn delete_object(
        &self,
        owner: OwnerId,
        bucket: &BucketName,
        bucket_id: Uuid,
        object: &ObjectName,
    ) -> Result<()> {
        let location = self.object_location(owner, bucket_id, object);
        let client = self.client_for(location)?;
        debug!(%owner, %bucket, %object, vnode = location.vnode, "delete_object: requested");

        match client.delete_object(owner, bucket_id, object, location.vnode).await {
            Ok(()) => {
                debug!(%owner, %bucket, %object, "delete_object: done");
                Ok(())
            }
            Err(err) => {
                let err = translate_object_error(err, bucket, object);
                debug!(%owner, %bucket, %object, %err, "delete_object: failed");
                Err(err)
            }
        }
    }
}
