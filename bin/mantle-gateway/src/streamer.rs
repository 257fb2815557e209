//! In-process content store standing in for the shark fleet
//!
//! The dev gateway buffers request bodies and "streams" them into a
//! process-local store, computing the checksum the way a real streamer
//! would. Placements rotate round-robin over a synthetic shark pool.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use dashmap::DashMap;
use mantle_api::{SharkStreamer, StreamedContent};
use mantle_common::{ObjectId, OwnerId, Result, SharkLocation};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Synthetic shark fleet plus the content written to it
pub struct SharkPool {
    sharks: Vec<SharkLocation>,
    next: AtomicUsize,
    content: DashMap<ObjectId, Bytes>,
}

impl SharkPool {
    /// Build a pool of `count` sharks spread over alternating datacenters
    #[must_use]
    pub fn new(count: usize) -> Self {
        let sharks = (0..count)
            .map(|i| SharkLocation::new(format!("dc-{}", i % 2), format!("stor-{:03}", i + 1)))
            .collect();
        Self {
            sharks,
            next: AtomicUsize::new(0),
            content: DashMap::new(),
        }
    }

    /// Pick the next `copies` placements, wrapping around the fleet
    fn select(&self, copies: u32) -> Vec<SharkLocation> {
        let start = self.next.fetch_add(copies as usize, Ordering::Relaxed);
        (0..copies as usize)
            .map(|i| self.sharks[(start + i) % self.sharks.len()].clone())
            .collect()
    }

    /// Stored content for an object, if any was streamed
    #[must_use]
    pub fn content(&self, object_id: ObjectId) -> Option<Bytes> {
        self.content.get(&object_id).map(|entry| entry.clone())
    }

    /// Drop stored content for an object
    pub fn remove(&self, object_id: ObjectId) {
        self.content.remove(&object_id);
    }
}

/// One-shot streamer over an already-buffered request body
pub struct BufferedStreamer {
    pool: Arc<SharkPool>,
    body: Bytes,
}

impl BufferedStreamer {
    #[must_use]
    pub fn new(pool: Arc<SharkPool>, body: Bytes) -> Self {
        Self { pool, body }
    }
}

#[async_trait]
impl SharkStreamer for BufferedStreamer {
    async fn stream(
        &self,
        _owner: OwnerId,
        object_id: ObjectId,
        _size: u64,
        copies: u32,
    ) -> Result<StreamedContent> {
        let digest = md5::compute(&self.body);
        let sharks = self.pool.select(copies);
        self.pool.content.insert(object_id, self.body.clone());
        Ok(StreamedContent {
            sharks,
            content_md5: STANDARD.encode(digest.0),
            bytes_written: self.body.len() as u64,
        })
    }
}
