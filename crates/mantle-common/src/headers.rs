//! Shared HTTP header names and constants
//!
//! Header names consumed and produced by the orchestration pipeline, and
//! the well-known checksum for empty content.

/// MD5 of zero bytes, base64-encoded. Used for all zero-length objects,
/// including chunked uploads that resolve to empty bodies.
pub const ZERO_BYTE_MD5: &str = "1B2M2Y8AsgTpgAmY7PhCfg==";

/// CORS response headers preserved verbatim into object metadata when
/// supplied on a write.
pub const CORS_RESPONSE_HEADERS: [&str; 5] = [
    "access-control-allow-headers",
    "access-control-allow-methods",
    "access-control-allow-origin",
    "access-control-expose-headers",
    "access-control-max-age",
];

/// Prefix that marks a request header as caller-defined object metadata
pub const CUSTOM_METADATA_PREFIX: &str = "m-";

/// Requested replica count for a write
pub const DURABILITY_LEVEL: &str = "durability-level";

/// Upper size bound supplied with chunked (streaming) uploads
pub const MAX_CONTENT_LENGTH: &str = "max-content-length";

/// Comma-separated role tags to attach to the object
pub const ROLE_TAG: &str = "role-tag";

/// Conditional request headers. When none of the four is present the
/// metadata pre-fetch is skipped entirely.
pub const IF_MATCH: &str = "if-match";
pub const IF_NONE_MATCH: &str = "if-none-match";
pub const IF_MODIFIED_SINCE: &str = "if-modified-since";
pub const IF_UNMODIFIED_SINCE: &str = "if-unmodified-since";

/// Check whether a (lowercase) header name carries caller-defined object
/// metadata. Matches the prefix followed by at least one word character.
#[must_use]
pub fn is_custom_metadata_header(name: &str) -> bool {
    name.strip_prefix(CUSTOM_METADATA_PREFIX)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_metadata_header() {
        assert!(is_custom_metadata_header("m-tag"));
        assert!(is_custom_metadata_header("m-_internal"));
        assert!(is_custom_metadata_header("m-7days"));
        assert!(!is_custom_metadata_header("m-"));
        assert!(!is_custom_metadata_header("m--x"));
        assert!(!is_custom_metadata_header("max-content-length"));
        assert!(!is_custom_metadata_header("cache-control"));
    }
}
