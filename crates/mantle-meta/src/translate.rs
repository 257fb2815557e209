//! Backend error translation
//!
//! Total mapping from shard-reported failure causes onto the
//! client-facing taxonomy. Bucket-level and object-level lookups
//! translate their not-found causes differently, and unrecognized
//! diagnostics are carried through rather than swallowed.

use crate::client::MetaClientError;
use mantle_common::{BucketName, Error, ObjectName};

/// Translate a failure from a bucket-level metadata call.
#[must_use]
pub fn translate_bucket_error(err: MetaClientError, bucket: &BucketName) -> Error {
    match err {
        MetaClientError::BucketNotFound => Error::BucketNotFound(bucket.to_string()),
        // An object-level cause from a bucket call means the shard and the
        // router disagree about the key; surface it for diagnosis.
        MetaClientError::ObjectNotFound => {
            Error::internal(format!("object cause on bucket lookup: {bucket}"))
        }
        MetaClientError::Unavailable(msg) | MetaClientError::Timeout(msg) => {
            Error::BackendUnavailable(msg)
        }
        MetaClientError::Protocol { code, message } => {
            Error::internal(format!("[{code}] {message}"))
        }
    }
}

/// Translate a failure from an object-level metadata call.
#[must_use]
pub fn translate_object_error(
    err: MetaClientError,
    bucket: &BucketName,
    object: &ObjectName,
) -> Error {
    match err {
        MetaClientError::ObjectNotFound => Error::ObjectNotFound {
            bucket: bucket.to_string(),
            name: object.to_string(),
        },
        MetaClientError::BucketNotFound => Error::BucketNotFound(bucket.to_string()),
        MetaClientError::Unavailable(msg) | MetaClientError::Timeout(msg) => {
            Error::BackendUnavailable(msg)
        }
        MetaClientError::Protocol { code, message } => {
            Error::internal(format!("[{code}] {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> (BucketName, ObjectName) {
        (
            BucketName::new("photos").unwrap(),
            ObjectName::new("cat.jpg").unwrap(),
        )
    }

    #[test]
    fn test_bucket_not_found_translates() {
        let (bucket, _) = names();
        let err = translate_bucket_error(MetaClientError::BucketNotFound, &bucket);
        assert!(matches!(err, Error::BucketNotFound(name) if name == "photos"));
    }

    #[test]
    fn test_object_not_found_translates() {
        let (bucket, object) = names();
        let err = translate_object_error(MetaClientError::ObjectNotFound, &bucket, &object);
        assert!(matches!(err, Error::ObjectNotFound { .. }));
    }

    #[test]
    fn test_transient_causes_become_unavailable() {
        let (bucket, object) = names();
        let err = translate_object_error(
            MetaClientError::Unavailable("shard-2 down".into()),
            &bucket,
            &object,
        );
        assert!(err.is_retryable());

        let err = translate_bucket_error(MetaClientError::Timeout("5s elapsed".into()), &bucket);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unrecognized_cause_preserves_diagnostics() {
        let (bucket, object) = names();
        let err = translate_object_error(
            MetaClientError::Protocol {
                code: "ETAG_CONFLICT".into(),
                message: "concurrent writer".into(),
            },
            &bucket,
            &object,
        );
        assert!(err.to_string().contains("ETAG_CONFLICT"));
        assert!(err.to_string().contains("concurrent writer"));
    }
}
