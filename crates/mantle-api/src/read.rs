//! Object read orchestration
//!
//! Reads fetch the metadata record first and authorize against it, so
//! the record is available when the response is formatted. Conditional
//! headers are evaluated against the fetched record; a failed
//! precondition surfaces before any content is served.

use crate::authz::Authorizer;
use crate::conditional::{ConditionalOutcome, Preconditions};
use crate::context::RequestContext;
use http::{HeaderMap, Method};
use mantle_common::{Error, Result};
use mantle_identity::Caller;
use mantle_meta::{MetadataPlacement, ObjectRecord};
use std::sync::Arc;
use tracing::debug;

/// Successful read result, ready for response formatting
#[derive(Clone, Debug)]
pub struct ReadOutcome {
    /// The fetched metadata record
    pub record: ObjectRecord,
    /// Echoed `Access-Control-Allow-Origin` when the request carried an
    /// `origin` header
    pub allow_origin: Option<String>,
}

impl ReadOutcome {
    /// Current entity tag, the object's immutable id
    #[must_use]
    pub fn etag(&self) -> String {
        self.record.etag()
    }

    /// Replica count reported as `Durability-Level`
    #[must_use]
    pub fn durability(&self) -> usize {
        self.record.durability()
    }
}

/// Sequences the object read pipeline. Serves both GET and HEAD; the
/// caller decides whether a body follows the metadata.
pub struct ObjectReadOrchestrator {
    placement: Arc<MetadataPlacement>,
    authorizer: Arc<dyn Authorizer>,
}

impl ObjectReadOrchestrator {
    #[must_use]
    pub fn new(placement: Arc<MetadataPlacement>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            placement,
            authorizer,
        }
    }

    /// Fetch object metadata for a GET or HEAD request.
    pub async fn get_object(
        &self,
        caller: &Caller,
        bucket: &str,
        object: &str,
        headers: &HeaderMap,
    ) -> Result<ReadOutcome> {
        let ctx = RequestContext::load(caller.clone(), &Method::GET, Some(bucket), Some(object))?;
        let bucket = ctx
            .bucket
            .clone()
            .ok_or_else(|| Error::internal("read without bucket context"))?;
        let object = ctx
            .object
            .clone()
            .ok_or_else(|| Error::internal("read without object context"))?;
        let owner = caller.owner();

        debug!(%owner, bucket = %bucket.name, object = %object.name, "get_object: requested");

        let bucket_record = self.placement.fetch_bucket(owner, &bucket.name).await?;

        let record = self
            .placement
            .fetch_object(owner, &bucket.name, bucket_record.id, &object.name)
            .await?
            .ok_or_else(|| Error::ObjectNotFound {
                bucket: bucket.name.to_string(),
                name: object.name.to_string(),
            })?;

        self.authorizer.authorize(&ctx).await?;

        let preconditions = Preconditions::from_headers(headers);
        match preconditions.evaluate(Some((&record.etag(), record.modified))) {
            ConditionalOutcome::Failed(header) => {
                return Err(Error::PreconditionFailed(header.to_string()));
            }
            ConditionalOutcome::Passed | ConditionalOutcome::AbsentAcceptable => {}
        }

        debug!(bucket = %bucket.name, object = %object.name, etag = %record.etag(), "get_object: done");

        Ok(ReadOutcome {
            record,
            allow_origin: headers
                .get("origin")
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
        })
    }
}
