//! In-memory metadata client
//!
//! A single-process `MetadataClient` used by the dev gateway and by
//! tests. Tracks invocation counts so tests can assert that structurally
//! invalid requests never reach a backend.

use crate::client::{CreateObjectParams, MetaClientError, MetadataClient};
use crate::record::{BucketRecord, ObjectRecord};
use async_trait::async_trait;
use chrono::Utc;
use mantle_common::{BucketName, ObjectName, OwnerId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// In-memory metadata shard
#[derive(Default)]
pub struct InMemoryMetadataClient {
    buckets: RwLock<HashMap<(OwnerId, String), BucketRecord>>,
    objects: RwLock<HashMap<(OwnerId, Uuid, String), ObjectRecord>>,
    fail_next: RwLock<Option<MetaClientError>>,
    calls: AtomicUsize,
}

impl InMemoryMetadataClient {
    /// Create an empty shard
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total calls this shard has served
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Arrange for the next call to fail with the given cause
    pub fn fail_next(&self, err: MetaClientError) {
        *self.fail_next.write() = Some(err);
    }

    /// Create a bucket record directly, returning its id
    pub fn seed_bucket(&self, owner: OwnerId, name: &BucketName) -> Uuid {
        let id = Uuid::new_v4();
        self.buckets.write().insert(
            (owner, name.to_string()),
            BucketRecord {
                id,
                owner,
                name: name.clone(),
                created: Utc::now(),
            },
        );
        id
    }

    /// Insert an object record directly
    pub fn seed_object(&self, record: ObjectRecord) {
        self.objects.write().insert(
            (record.owner, record.bucket_id, record.name.to_string()),
            record,
        );
    }

    fn take_failure(&self) -> Result<(), MetaClientError> {
        match self.fail_next.write().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MetadataClient for InMemoryMetadataClient {
    async fn get_bucket(
        &self,
        owner: OwnerId,
        name: &BucketName,
    ) -> Result<BucketRecord, MetaClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        self.buckets
            .read()
            .get(&(owner, name.to_string()))
            .cloned()
            .ok_or(MetaClientError::BucketNotFound)
    }

    async fn get_object(
        &self,
        owner: OwnerId,
        bucket_id: Uuid,
        name: &ObjectName,
        _vnode: u32,
    ) -> Result<ObjectRecord, MetaClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        self.objects
            .read()
            .get(&(owner, bucket_id, name.to_string()))
            .cloned()
            .ok_or(MetaClientError::ObjectNotFound)
    }

    async fn create_object(
        &self,
        params: CreateObjectParams,
    ) -> Result<ObjectRecord, MetaClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let record = ObjectRecord {
            id: params.object_id,
            owner: params.owner,
            bucket_id: params.bucket_id,
            name: params.name,
            content_length: params.content_length,
            content_md5: params.content_md5,
            content_type: params.content_type,
            headers: params.headers,
            roles: params.roles,
            sharks: params.sharks,
            modified: Utc::now(),
        };
        self.objects.write().insert(
            (record.owner, record.bucket_id, record.name.to_string()),
            record.clone(),
        );
        Ok(record)
    }

    async fn delete_object(
        &self,
        owner: OwnerId,
        bucket_id: Uuid,
        name: &ObjectName,
        _vnode: u32,
    ) -> Result<(), MetaClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        self.objects
            .write()
            .remove(&(owner, bucket_id, name.to_string()))
            .map(|_| ())
            .ok_or(MetaClientError::ObjectNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantle_common::ObjectId;

    #[tokio::test]
    async fn test_create_then_get_roundtrip() {
        let client = InMemoryMetadataClient::new();
        let owner = OwnerId::new();
        let bucket = BucketName::new("photos").unwrap();
        let bucket_id = client.seed_bucket(owner, &bucket);
        let name = ObjectName::new("cat.jpg").unwrap();

        let created = client
            .create_object(CreateObjectParams {
                owner,
                bucket_id,
                name: name.clone(),
                object_id: ObjectId::new(),
                content_length: 3,
                content_md5: "rL0Y20zC+Fzt72VPzMSk2A==".into(),
                content_type: "image/jpeg".into(),
                headers: HashMap::new(),
                roles: vec![],
                sharks: vec![],
                vnode: 7,
                request_id: "req-1".into(),
            })
            .await
            .unwrap();

        let fetched = client.get_object(owner, bucket_id, &name, 7).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_record() {
        let client = InMemoryMetadataClient::new();
        let owner = OwnerId::new();
        let bucket = BucketName::new("photos").unwrap();
        let bucket_id = client.seed_bucket(owner, &bucket);
        let name = ObjectName::new("cat.jpg").unwrap();

        let params = |id| CreateObjectParams {
            owner,
            bucket_id,
            name: name.clone(),
            object_id: id,
            content_length: 0,
            content_md5: mantle_common::headers::ZERO_BYTE_MD5.into(),
            content_type: "application/octet-stream".into(),
            headers: HashMap::new(),
            roles: vec![],
            sharks: vec![],
            vnode: 0,
            request_id: "req".into(),
        };

        let first = ObjectId::new();
        let second = ObjectId::new();
        client.create_object(params(first)).await.unwrap();
        client.create_object(params(second)).await.unwrap();

        let fetched = client.get_object(owner, bucket_id, &name, 0).await.unwrap();
        assert_eq!(fetched.id, second);
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let client = InMemoryMetadataClient::new();
        let owner = OwnerId::new();
        let bucket = BucketName::new("photos").unwrap();
        client.seed_bucket(owner, &bucket);

        client.fail_next(MetaClientError::Unavailable("down".into()));
        assert!(client.get_bucket(owner, &bucket).await.is_err());
        assert!(client.get_bucket(owner, &bucket).await.is_ok());
    }
}
