//! Virtual-node hash ring over the metadata shards
//!
//! Keys hash onto a fixed vnode space with xxh64; contiguous vnode ranges
//! are owned by shards. The ring is immutable after construction and safe
//! for unsynchronized concurrent reads.

use mantle_common::{BucketName, ObjectName, OwnerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xxhash_rust::xxh64::xxh64;

/// Deterministic routing target for a metadata record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementLocation {
    /// Index of the owning shard in the ring
    pub shard: u32,
    /// Virtual-node partition within the shard
    pub vnode: u32,
}

/// A metadata shard known to the ring
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardInfo {
    /// Shard name (host identifier for the backing metadata service)
    pub name: String,
}

impl ShardInfo {
    /// Create a new shard entry
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Errors that can occur when constructing a placement ring
#[derive(Debug, Clone, thiserror::Error)]
pub enum RingError {
    #[error("placement ring requires at least one shard")]
    NoShards,
    #[error("placement ring requires at least one vnode per shard")]
    TooFewVnodes,
}

/// Immutable vnode ring over the metadata shards
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacementRing {
    shards: Vec<ShardInfo>,
    vnode_count: u32,
}

impl PlacementRing {
    /// Build a ring over the given shards with `vnode_count` virtual
    /// nodes split into contiguous per-shard ranges.
    pub fn new(shards: Vec<ShardInfo>, vnode_count: u32) -> Result<Self, RingError> {
        if shards.is_empty() {
            return Err(RingError::NoShards);
        }
        if (vnode_count as usize) < shards.len() {
            return Err(RingError::TooFewVnodes);
        }
        Ok(Self {
            shards,
            vnode_count,
        })
    }

    /// Number of shards in the ring
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Number of virtual nodes in the ring
    #[must_use]
    pub const fn vnode_count(&self) -> u32 {
        self.vnode_count
    }

    /// Shard metadata for a location produced by this ring
    #[must_use]
    pub fn shard(&self, location: PlacementLocation) -> Option<&ShardInfo> {
        self.shards.get(location.shard as usize)
    }

    /// Locate the bucket record for (owner, bucket name).
    #[must_use]
    pub fn locate_bucket(&self, owner: OwnerId, bucket: &BucketName) -> PlacementLocation {
        self.locate_key(&format!("{owner}/{bucket}"))
    }

    /// Locate the object record for (owner, bucket id, object name). The
    /// bucket id rather than its name keys object placement so renamed or
    /// recreated buckets never alias each other's objects.
    #[must_use]
    pub fn locate_object(
        &self,
        owner: OwnerId,
        bucket_id: Uuid,
        object: &ObjectName,
    ) -> PlacementLocation {
        self.locate_key(&format!("{owner}/{bucket_id}/{object}"))
    }

    /// Pure key-to-location mapping. No I/O, no shared mutable state.
    fn locate_key(&self, key: &str) -> PlacementLocation {
        let vnode = (xxh64(key.as_bytes(), 0) % u64::from(self.vnode_count)) as u32;
        // Contiguous vnode ranges per shard
        let shard = (u64::from(vnode) * self.shards.len() as u64 / u64::from(self.vnode_count))
            as u32;
        PlacementLocation { shard, vnode }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ring(shards: usize) -> PlacementRing {
        let shards = (0..shards)
            .map(|i| ShardInfo::new(format!("shard-{i}")))
            .collect();
        PlacementRing::new(shards, 1024).unwrap()
    }

    #[test]
    fn test_locate_is_deterministic() {
        let r = ring(4);
        let owner = OwnerId::new();
        let bucket = BucketName::new("photos").unwrap();
        let first = r.locate_bucket(owner, &bucket);
        for _ in 0..10 {
            assert_eq!(r.locate_bucket(owner, &bucket), first);
        }
    }

    #[test]
    fn test_object_location_uses_bucket_id() {
        let r = ring(4);
        let owner = OwnerId::new();
        let object = ObjectName::new("a.txt").unwrap();
        let loc1 = r.locate_object(owner, Uuid::new_v4(), &object);
        let loc2 = r.locate_object(owner, Uuid::new_v4(), &object);
        // Different bucket incarnations should not systematically collide;
        // the locations are allowed to match by chance but the keyed input
        // must differ, so repeated distinct ids rarely all agree.
        let any_differs = (0..8).any(|_| r.locate_object(owner, Uuid::new_v4(), &object) != loc1);
        assert!(any_differs || loc1 != loc2);
    }

    #[test]
    fn test_every_vnode_maps_to_valid_shard() {
        let r = ring(5);
        let owner = OwnerId::new();
        for i in 0..200 {
            let bucket = BucketName::new(format!("bucket-{i}")).unwrap();
            let loc = r.locate_bucket(owner, &bucket);
            assert!(loc.vnode < r.vnode_count());
            assert!(r.shard(loc).is_some());
        }
    }

    #[test]
    fn test_distribution_covers_all_shards() {
        let r = ring(4);
        let owner = OwnerId::new();
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for i in 0..400 {
            let bucket = BucketName::new(format!("b{i}.data")).unwrap();
            *counts.entry(r.locate_bucket(owner, &bucket).shard).or_default() += 1;
        }
        assert_eq!(counts.len(), 4, "all shards should receive keys");
    }

    #[test]
    fn test_empty_ring_rejected() {
        assert!(PlacementRing::new(vec![], 1024).is_err());
        assert!(PlacementRing::new(vec![ShardInfo::new("s"), ShardInfo::new("t")], 1).is_err());
    }
}
