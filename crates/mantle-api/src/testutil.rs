//! Shared test fixtures for the pipeline orchestrators
//!
//! One single-shard placement backed by the in-memory metadata client,
//! an in-memory identity service, and a stub streamer. Backends count
//! invocations so tests can assert which stages ran.

use crate::authz::OpenAuthorizer;
use crate::content::{SharkStreamer, StreamedContent};
use crate::delete::ObjectDeleteOrchestrator;
use crate::read::ObjectReadOrchestrator;
use crate::write::ObjectWriteOrchestrator;
use async_trait::async_trait;
use chrono::Utc;
use http::{HeaderMap, HeaderName, HeaderValue};
use mantle_common::config::{ApiConfig, DurabilityConfig};
use mantle_common::{
    BucketName, Error, ObjectId, ObjectName, OwnerId, Result, SharkLocation,
};
use mantle_identity::{Account, Caller, IdentityLookup, InMemoryIdentity, RoleResolver};
use mantle_meta::{InMemoryMetadataClient, MetadataClient, MetadataPlacement, ObjectRecord};
use mantle_placement::{PlacementRing, ShardInfo};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Build a header map from name/value pairs
pub fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.append(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    map
}

/// Streamer double: yields one placement per requested copy and a fixed
/// checksum, or a pre-arranged failure.
#[derive(Default)]
pub struct StubStreamer {
    calls: AtomicUsize,
    fail_next: Mutex<Option<Error>>,
}

impl StubStreamer {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self, err: Error) {
        *self.fail_next.lock() = Some(err);
    }
}

pub const STUB_MD5: &str = "rL0Y20zC+Fzt72VPzMSk2A==";

#[async_trait]
impl SharkStreamer for StubStreamer {
    async fn stream(
        &self,
        _owner: OwnerId,
        _object_id: ObjectId,
        size: u64,
        copies: u32,
    ) -> Result<StreamedContent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_next.lock().take() {
            return Err(err);
        }
        Ok(StreamedContent {
            sharks: (0..copies)
                .map(|i| SharkLocation::new(format!("dc-{i}"), format!("stor-{:03}", i + 1)))
                .collect(),
            content_md5: STUB_MD5.to_string(),
            bytes_written: size,
        })
    }
}

pub struct Harness {
    pub caller: Caller,
    pub meta: Arc<InMemoryMetadataClient>,
    pub identity: Arc<InMemoryIdentity>,
    pub streamer: Arc<StubStreamer>,
    pub placement: Arc<MetadataPlacement>,
    pub config: ApiConfig,
    seeded_buckets: Mutex<HashMap<String, Uuid>>,
}

impl Harness {
    pub fn new() -> Self {
        let ring = PlacementRing::new(vec![ShardInfo::new("shard-0")], 1024).unwrap();
        let placement = Arc::new(MetadataPlacement::new(ring));
        let meta = Arc::new(InMemoryMetadataClient::new());
        placement.register_client(0, Arc::clone(&meta) as Arc<dyn MetadataClient>);

        Self {
            caller: Caller::account(Account::new(OwnerId::new(), "alice")),
            meta,
            identity: Arc::new(InMemoryIdentity::new()),
            streamer: Arc::new(StubStreamer::default()),
            placement,
            config: ApiConfig {
                durability: DurabilityConfig {
                    min_copies: 2,
                    max_copies: 6,
                    default_copies: 2,
                },
                ..ApiConfig::default()
            },
            seeded_buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn writer(&self) -> ObjectWriteOrchestrator {
        ObjectWriteOrchestrator::new(
            Arc::clone(&self.placement),
            RoleResolver::new(Arc::clone(&self.identity) as Arc<dyn IdentityLookup>),
            Arc::clone(&self.streamer) as Arc<dyn SharkStreamer>,
            Arc::new(OpenAuthorizer),
            self.config.clone(),
        )
    }

    pub fn reader(&self) -> ObjectReadOrchestrator {
        ObjectReadOrchestrator::new(Arc::clone(&self.placement), Arc::new(OpenAuthorizer))
    }

    pub fn deleter(&self) -> ObjectDeleteOrchestrator {
        ObjectDeleteOrchestrator::new(Arc::clone(&self.placement), Arc::new(OpenAuthorizer))
    }

    /// Seed a bucket without touching backend call counters
    pub fn seed_bucket(&self, name: &str) -> Uuid {
        let bucket = BucketName::new(name).unwrap();
        let id = self.meta.seed_bucket(self.caller.owner(), &bucket);
        self.seeded_buckets.lock().insert(name.to_string(), id);
        id
    }

    /// Seed an object (and its bucket if needed) without touching
    /// backend call counters
    pub async fn seed_object(&self, bucket: &str, object: &str, length: u64) -> ObjectRecord {
        let bucket_id = {
            let seeded = self.seeded_buckets.lock().get(bucket).copied();
            match seeded {
                Some(id) => id,
                None => self.seed_bucket(bucket),
            }
        };
        let record = ObjectRecord {
            id: ObjectId::new(),
            owner: self.caller.owner(),
            bucket_id,
            name: ObjectName::new(object).unwrap(),
            content_length: length,
            content_md5: STUB_MD5.to_string(),
            content_type: "application/octet-stream".to_string(),
            headers: HashMap::new(),
            roles: Vec::new(),
            sharks: vec![
                SharkLocation::new("dc-0", "stor-001"),
                SharkLocation::new("dc-1", "stor-002"),
            ],
            modified: Utc::now(),
        };
        self.meta.seed_object(record.clone());
        record
    }

    /// Fetch an object through the routed placement; counts as backend
    /// calls, so assert counters before using this
    pub async fn fetch(&self, bucket: &str, object: &str) -> Option<ObjectRecord> {
        let bucket_id = (*self.seeded_buckets.lock()).get(bucket).copied()?;
        let bucket = BucketName::new(bucket).unwrap();
        let object = ObjectName::new(object).unwrap();
        self.placement
            .fetch_object(self.caller.owner(), &bucket, bucket_id, &object)
            .await
            .unwrap()
    }
}
