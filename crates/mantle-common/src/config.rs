//! Configuration types for Mantle
//!
//! Read-only configuration shared by every in-flight pipeline. Nothing
//! here is mutated after startup.

use serde::{Deserialize, Serialize};

/// Configuration for the request-orchestration pipeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Durability (replica count) bounds and default
    pub durability: DurabilityConfig,
    /// Assumed size for chunked uploads without a `max-content-length`
    /// header (bytes)
    pub max_streaming_size: u64,
    /// Cumulative byte budget for caller-defined metadata header values
    pub max_header_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            durability: DurabilityConfig::default(),
            max_streaming_size: 5 * 1024 * 1024 * 1024, // 5 GB
            max_header_bytes: 4 * 1024,
        }
    }
}

/// Bounds for the requested replica count. Validated against the request
/// independent of actual replica availability.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DurabilityConfig {
    /// Minimum accepted replica count
    pub min_copies: u32,
    /// Maximum accepted replica count
    pub max_copies: u32,
    /// Replica count applied when the request does not specify one
    pub default_copies: u32,
}

impl Default for DurabilityConfig {
    fn default() -> Self {
        Self {
            min_copies: 1,
            max_copies: 9,
            default_copies: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.durability.default_copies, 2);
        assert!(config.durability.min_copies <= config.durability.max_copies);
        assert_eq!(config.max_header_bytes, 4096);
    }
}
