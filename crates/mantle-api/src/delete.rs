//! Object delete orchestration
//!
//! Deletes follow the write-side ordering: bucket existence, then
//! authorization, then the conditional pre-fetch only when a conditional
//! header demands it. The routed delete is the last stage; a missing
//! object surfaces as `ObjectNotFound` from the backend.

use crate::authz::Authorizer;
use crate::conditional::{ConditionalOutcome, Preconditions};
use crate::context::RequestContext;
use http::{HeaderMap, Method};
use mantle_common::{Error, Result};
use mantle_identity::Caller;
use mantle_meta::MetadataPlacement;
use std::sync::Arc;
use tracing::debug;

/// Sequences the object delete pipeline
pub struct ObjectDeleteOrchestrator {
    placement: Arc<MetadataPlacement>,
    authorizer: Arc<dyn Authorizer>,
}

impl ObjectDeleteOrchestrator {
    #[must_use]
    pub fn new(placement: Arc<MetadataPlacement>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            placement,
            authorizer,
        }
    }

    /// Remove an object's metadata record.
    pub async fn delete_object(
        &self,
        caller: &Caller,
        bucket: &str,
        object: &str,
        headers: &HeaderMap,
    ) -> Result<()> {
        let ctx =
            RequestContext::load(caller.clone(), &Method::DELETE, Some(bucket), Some(object))?;
        let bucket = ctx
            .bucket
            .clone()
            .ok_or_else(|| Error::internal("delete without bucket context"))?;
        let object = ctx
            .object
            .clone()
            .ok_or_else(|| Error::internal("delete without object context"))?;
        let owner = caller.owner();

        debug!(%owner, bucket = %bucket.name, object = %object.name, "delete_object: requested");

        let bucket_record = self.placement.fetch_bucket(owner, &bucket.name).await?;

        self.authorizer.authorize(&ctx).await?;

        let preconditions = Preconditions::from_headers(headers);
        if preconditions.requires_fetch() {
            let existing = self
                .placement
                .fetch_object(owner, &bucket.name, bucket_record.id, &object.name)
                .await?;
            let current = existing.as_ref().map(|r| (r.etag(), r.modified));
            match preconditions.evaluate(current.as_ref().map(|(etag, m)| (etag.as_str(), *m))) {
                ConditionalOutcome::Failed(header) => {
                    return Err(Error::PreconditionFailed(header.to_string()));
                }
                ConditionalOutcome::Passed | ConditionalOutcome::AbsentAcceptable => {}
            }
        }

        self.placement
            .delete_object(owner, &bucket.name, bucket_record.id, &object.name)
            .await?;

        debug!(bucket = %bucket.name, object = %object.name, "delete_object: done");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Harness, headers};

    #[tokio::test]
    async fn test_delete_removes_record() {
        let h = Harness::new();
        h.seed_object("photos", "cat.jpg", 64).await;
        let hdrs = headers(&[]);

        h.deleter()
            .delete_object(&h.caller, "photos", "cat.jpg", &hdrs)
            .await
            .unwrap();
        assert!(h.fetch("photos", "cat.jpg").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_object_not_found() {
        let h = Harness::new();
        h.seed_bucket("photos");
        let hdrs = headers(&[]);

        let err = h
            .deleter()
            .delete_object(&h.caller, "photos", "cat.jpg", &hdrs)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ObjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_bucket_stops_early() {
        let h = Harness::new();
        let hdrs = headers(&[]);

        let err = h
            .deleter()
            .delete_object(&h.caller, "photos", "cat.jpg", &hdrs)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BucketNotFound(_)));
        assert_eq!(h.meta.call_count(), 1);
    }

    #[tokio::test]
    async fn test_conditional_delete_wrong_etag_keeps_record() {
        let h = Harness::new();
        h.seed_object("photos", "cat.jpg", 64).await;
        let hdrs = headers(&[("if-match", "\"deadbeef\"")]);

        let err = h
            .deleter()
            .delete_object(&h.caller, "photos", "cat.jpg", &hdrs)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PreconditionFailed(_)));
        assert!(h.fetch("photos", "cat.jpg").await.is_some());
    }

    #[tokio::test]
    async fn test_conditional_delete_matching_etag_removes() {
        let h = Harness::new();
        let record = h.seed_object("photos", "cat.jpg", 64).await;
        let hdrs = headers(&[("if-match", &record.etag())]);

        h.deleter()
            .delete_object(&h.caller, "photos", "cat.jpg", &hdrs)
            .await
            .unwrap();
        assert!(h.fetch("photos", "cat.jpg").await.is_none());
    }

    #[tokio::test]
    async fn test_unconditional_delete_skips_prefetch() {
        let h = Harness::new();
        h.seed_object("photos", "cat.jpg", 64).await;
        let before = h.meta.call_count();
        let hdrs = headers(&[]);

        h.deleter()
            .delete_object(&h.caller, "photos", "cat.jpg", &hdrs)
            .await
            .unwrap();
        // get_bucket + delete_object only
        assert_eq!(h.meta.call_count() - before, 2);
    }
}
