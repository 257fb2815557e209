//! Mantle Placement - deterministic metadata-shard routing
//!
//! Maps an (owner, bucket key[, object key]) tuple onto a metadata shard
//! and virtual-node partition. The mapping is a pure function of its
//! inputs: the same key always lands on the same shard and vnode, which
//! is what read-after-write consistency and safe retries of idempotent
//! lookups rely on.

pub mod ring;

pub use ring::{PlacementLocation, PlacementRing, ShardInfo};
