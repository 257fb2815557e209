//! Metadata assembly
//!
//! Builds the canonical metadata for a new object from validated inputs,
//! resolved roles, and externally-supplied replica placements. Persisted
//! only after every prior stage has succeeded; the assembler itself is
//! pure.

use http::HeaderMap;
use mantle_common::headers::{
    CORS_RESPONSE_HEADERS, ZERO_BYTE_MD5, is_custom_metadata_header,
};
use mantle_common::{ObjectId, RoleId, SharkLocation};
use std::collections::HashMap;

/// Draft of an object metadata record, ready to persist
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledMetadata {
    pub object_id: ObjectId,
    pub content_length: u64,
    pub content_md5: String,
    pub content_type: String,
    pub headers: HashMap<String, String>,
    pub roles: Vec<RoleId>,
    pub sharks: Vec<SharkLocation>,
}

/// Assemble object metadata from the request and upstream stage outputs.
///
/// Zero-length content pins the checksum to the empty-body MD5 and the
/// shark list to empty, whatever was supplied. When placements are not
/// known (attribute-only updates) the shark list defaults to empty
/// rather than failing.
#[must_use]
pub fn assemble(
    object_id: ObjectId,
    request_headers: &HeaderMap,
    content_length: u64,
    content_md5: String,
    content_type: Option<&str>,
    roles: Vec<RoleId>,
    sharks: Vec<SharkLocation>,
    max_header_bytes: usize,
) -> AssembledMetadata {
    let mut headers = HashMap::new();

    for name in CORS_RESPONSE_HEADERS {
        if let Some(value) = header_str(request_headers, name) {
            headers.insert(name.to_string(), value.to_string());
        }
    }

    if let Some(value) = header_str(request_headers, "cache-control") {
        headers.insert("Cache-Control".to_string(), value.to_string());
    }
    if let Some(value) = header_str(request_headers, "surrogate-key") {
        headers.insert("Surrogate-Key".to_string(), value.to_string());
    }

    // Custom metadata headers are admitted cumulatively while the running
    // value-byte total stays under the budget; overflow is dropped, not
    // rejected.
    let mut header_bytes = 0usize;
    for (name, value) in request_headers {
        let name = name.as_str();
        if !is_custom_metadata_header(name) {
            continue;
        }
        let Ok(value) = value.to_str() else { continue };
        header_bytes += value.len();
        if header_bytes < max_header_bytes {
            headers.insert(name.to_string(), value.to_string());
        }
    }

    let (content_md5, sharks) = if content_length == 0 {
        (ZERO_BYTE_MD5.to_string(), Vec::new())
    } else {
        (content_md5, sharks)
    };

    AssembledMetadata {
        object_id,
        content_length,
        content_md5,
        content_type: content_type
            .unwrap_or("application/octet-stream")
            .to_string(),
        headers,
        roles,
        sharks,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    fn sharks() -> Vec<SharkLocation> {
        vec![
            SharkLocation::new("us-east-1a", "stor-001"),
            SharkLocation::new("us-east-1b", "stor-002"),
        ]
    }

    #[test]
    fn test_zero_length_pins_checksum_and_sharks() {
        let md = assemble(
            ObjectId::new(),
            &headers(&[("m-owner", "alice")]),
            0,
            "should-be-ignored".into(),
            Some("text/plain"),
            vec![],
            sharks(),
            4096,
        );
        assert_eq!(md.content_md5, ZERO_BYTE_MD5);
        assert!(md.sharks.is_empty());
        assert_eq!(md.content_type, "text/plain");
        assert_eq!(md.headers.get("m-owner").unwrap(), "alice");
    }

    #[test]
    fn test_nonzero_keeps_streamed_checksum_and_sharks() {
        let md = assemble(
            ObjectId::new(),
            &HeaderMap::new(),
            12,
            "9e107d9d372bb6826bd81d3542a419d6".into(),
            None,
            vec![],
            sharks(),
            4096,
        );
        assert_eq!(md.sharks.len(), 2);
        assert_eq!(md.content_md5, "9e107d9d372bb6826bd81d3542a419d6");
        assert_eq!(md.content_type, "application/octet-stream");
    }

    #[test]
    fn test_unknown_placements_default_to_empty() {
        let md = assemble(
            ObjectId::new(),
            &HeaderMap::new(),
            12,
            "x".into(),
            None,
            vec![],
            Vec::new(),
            4096,
        );
        assert!(md.sharks.is_empty());
    }

    #[test]
    fn test_allow_listed_headers_captured() {
        let md = assemble(
            ObjectId::new(),
            &headers(&[
                ("access-control-allow-origin", "*"),
                ("access-control-max-age", "600"),
                ("cache-control", "no-cache"),
                ("surrogate-key", "builds"),
                ("x-forwarded-for", "10.0.0.1"),
                ("content-encoding", "gzip"),
            ]),
            1,
            "m".into(),
            None,
            vec![],
            vec![],
            4096,
        );
        assert_eq!(md.headers.get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(md.headers.get("access-control-max-age").unwrap(), "600");
        assert_eq!(md.headers.get("Cache-Control").unwrap(), "no-cache");
        assert_eq!(md.headers.get("Surrogate-Key").unwrap(), "builds");
        assert!(!md.headers.contains_key("x-forwarded-for"));
        assert!(!md.headers.contains_key("content-encoding"));
    }

    #[test]
    fn test_custom_header_budget_drops_overflow_silently() {
        let big = "v".repeat(30);
        let md = assemble(
            ObjectId::new(),
            &headers(&[
                ("m-first", &big),
                ("m-second", &big),
                ("m-third", &big),
            ]),
            1,
            "m".into(),
            None,
            vec![],
            vec![],
            70,
        );
        // 30 + 30 stays under 70; the third pushes the total to 90
        assert!(md.headers.contains_key("m-first"));
        assert!(md.headers.contains_key("m-second"));
        assert!(!md.headers.contains_key("m-third"));
    }

    #[test]
    fn test_roles_carried_through() {
        let roles = vec![RoleId::new(), RoleId::new()];
        let md = assemble(
            ObjectId::new(),
            &HeaderMap::new(),
            1,
            "m".into(),
            None,
            roles.clone(),
            vec![],
            4096,
        );
        assert_eq!(md.roles, roles);
    }
}
