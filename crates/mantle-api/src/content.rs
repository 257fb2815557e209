//! Content size determination and the shark-streaming seam
//!
//! Object content never flows through this crate; the pipeline only
//! determines how large the body is allowed to be and hands streaming to
//! an external capability that returns replica placements and the bytes'
//! checksum.

use async_trait::async_trait;
use mantle_common::{ApiConfig, Error, ObjectId, OwnerId, Result, SharkLocation};

/// What the pipeline decided about the request body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentPlan {
    /// Declared (or bounded, for chunked uploads) size in bytes
    pub size: u64,
    /// Zero-length body; short-circuits streaming entirely
    pub is_zero: bool,
    /// Chunked transfer encoding was used
    pub chunked: bool,
}

/// Determine the content size for a write.
///
/// Chunked uploads are bounded by the `max-content-length` header
/// (falling back to the configured streaming maximum); fixed-length
/// uploads require a content length, with zero-byte bodies allowed.
pub fn plan_content(
    chunked: bool,
    content_length: Option<u64>,
    max_content_length: Option<&str>,
    config: &ApiConfig,
) -> Result<ContentPlan> {
    if chunked {
        let size = match max_content_length {
            Some(raw) => {
                let declared = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| Error::MaxContentLengthExceeded { length: -1 })?;
                if declared < 0 {
                    return Err(Error::MaxContentLengthExceeded { length: declared });
                }
                declared as u64
            }
            None => config.max_streaming_size,
        };
        return Ok(ContentPlan {
            size,
            is_zero: size == 0,
            chunked: true,
        });
    }

    match content_length {
        None => Err(Error::ContentLengthRequired),
        Some(size) => Ok(ContentPlan {
            size,
            is_zero: size == 0,
            chunked: false,
        }),
    }
}

/// Result of streaming content to the selected replicas
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamedContent {
    /// Replica placements the content landed on
    pub sharks: Vec<SharkLocation>,
    /// Base64-encoded MD5 computed over the streamed bytes
    pub content_md5: String,
    /// Bytes actually written
    pub bytes_written: u64,
}

/// Replica selection and content streaming, consumed as an external
/// capability. Invoked only after durability validation has passed and
/// never for zero-length bodies.
#[async_trait]
pub trait SharkStreamer: Send + Sync {
    async fn stream(
        &self,
        owner: OwnerId,
        object_id: ObjectId,
        size: u64,
        copies: u32,
    ) -> Result<StreamedContent>;
}
