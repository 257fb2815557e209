//! Object write orchestration
//!
//! The full write pipeline: context load, bucket existence, authorization,
//! conditional evaluation, size and durability validation, content
//! streaming alongside role resolution, metadata assembly, and the routed
//! persist. Any failure propagates after translation; no partial record
//! is ever written.

use crate::assembler::assemble;
use crate::authz::Authorizer;
use crate::conditional::{ConditionalOutcome, Preconditions};
use crate::content::{SharkStreamer, StreamedContent, plan_content};
use crate::context::RequestContext;
use crate::durability::validate_durability;
use chrono::{DateTime, Utc};
use http::{HeaderMap, Method};
use mantle_common::headers::{DURABILITY_LEVEL, MAX_CONTENT_LENGTH, ROLE_TAG, ZERO_BYTE_MD5};
use mantle_common::{ApiConfig, Error, ObjectId, Result};
use mantle_identity::{Caller, RoleResolver};
use mantle_meta::{CreateObjectParams, MetadataPlacement};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Raw inputs for one object write
#[derive(Debug)]
pub struct WriteRequest<'a> {
    pub bucket: &'a str,
    pub object: &'a str,
    pub headers: &'a HeaderMap,
    /// Chunked transfer encoding in use (no declared content length)
    pub chunked: bool,
    /// Declared content length for fixed-length uploads
    pub content_length: Option<u64>,
    /// Role tags from an authorization query parameter; takes precedence
    /// over the `role-tag` header
    pub role_tag_param: Option<&'a str>,
}

/// Successful write result, ready for response formatting
#[derive(Clone, Debug)]
pub struct WriteOutcome {
    /// New object identifier; reported as the `Etag`
    pub object_id: ObjectId,
    /// Modification time assigned by the metadata store
    pub modified: DateTime<Utc>,
    /// Checksum computed over the streamed bytes (`Computed-MD5`)
    pub computed_md5: String,
    /// Echoed `Access-Control-Allow-Origin` when the request carried an
    /// `origin` header
    pub allow_origin: Option<String>,
}

/// Sequences the object write pipeline
pub struct ObjectWriteOrchestrator {
    placement: Arc<MetadataPlacement>,
    roles: RoleResolver,
    streamer: Arc<dyn SharkStreamer>,
    authorizer: Arc<dyn Authorizer>,
    config: ApiConfig,
}

impl ObjectWriteOrchestrator {
    /// Create a write orchestrator over the given collaborators
    #[must_use]
    pub fn new(
        placement: Arc<MetadataPlacement>,
        roles: RoleResolver,
        streamer: Arc<dyn SharkStreamer>,
        authorizer: Arc<dyn Authorizer>,
        config: ApiConfig,
    ) -> Self {
        Self {
            placement,
            roles,
            streamer,
            authorizer,
            config,
        }
    }

    /// Execute one object write end to end.
    pub async fn put_object(&self, caller: &Caller, req: WriteRequest<'_>) -> Result<WriteOutcome> {
        let request_id = Uuid::new_v4().to_string();
        let ctx = RequestContext::load(
            caller.clone(),
            &Method::PUT,
            Some(req.bucket),
            Some(req.object),
        )?;
        // Loader validated both names, so these are always present
        let bucket = ctx
            .bucket
            .clone()
            .ok_or_else(|| Error::internal("write without bucket context"))?;
        let object = ctx
            .object
            .clone()
            .ok_or_else(|| Error::internal("write without object context"))?;
        let owner = caller.owner();

        debug!(%owner, bucket = %bucket.name, object = %object.name, %request_id, "put_object: requested");

        // Bucket existence; populates the id every later stage keys on
        let bucket_record = self.placement.fetch_bucket(owner, &bucket.name).await?;
        let bucket_id = bucket_record.id;

        self.authorizer.authorize(&ctx).await?;

        // Conditional pre-fetch happens only when a conditional header is
        // present; unconditional writes skip the round-trip entirely.
        let preconditions = Preconditions::from_headers(req.headers);
        let existing = if preconditions.requires_fetch() {
            self.placement
                .fetch_object(owner, &bucket.name, bucket_id, &object.name)
                .await?
        } else {
            None
        };

        let current = existing.as_ref().map(|r| (r.etag(), r.modified));
        match preconditions.evaluate(current.as_ref().map(|(etag, m)| (etag.as_str(), *m))) {
            ConditionalOutcome::Failed(header) => {
                return Err(Error::PreconditionFailed(header.to_string()));
            }
            ConditionalOutcome::Passed | ConditionalOutcome::AbsentAcceptable => {}
        }

        let plan = plan_content(
            req.chunked,
            req.content_length,
            header_str(req.headers, MAX_CONTENT_LENGTH),
            &self.config,
        )?;
        let copies = validate_durability(
            header_str(req.headers, DURABILITY_LEVEL),
            &self.config.durability,
        )?;
        let object_id = ObjectId::new();

        let explicit_tags = req.role_tag_param.or_else(|| header_str(req.headers, ROLE_TAG));

        // Role resolution is independent of content streaming; both run
        // concurrently and both must finish before metadata is assembled.
        // When both fail, the streaming error wins: it is the earlier
        // stage in the pipeline's sequential order.
        let (streamed, roles) = if plan.is_zero {
            let roles = self.roles.resolve(explicit_tags, caller).await?;
            (
                StreamedContent {
                    sharks: Vec::new(),
                    content_md5: ZERO_BYTE_MD5.to_string(),
                    bytes_written: 0,
                },
                roles,
            )
        } else {
            let stream_fut = self.streamer.stream(owner, object_id, plan.size, copies);
            let roles_fut = self.roles.resolve(explicit_tags, caller);
            let (streamed, roles) = tokio::join!(stream_fut, roles_fut);
            (streamed?, roles?)
        };

        let metadata = assemble(
            object_id,
            req.headers,
            if plan.is_zero { 0 } else { streamed.bytes_written },
            streamed.content_md5,
            header_str(req.headers, "content-type"),
            roles,
            streamed.sharks,
            self.config.max_header_bytes,
        );
        let computed_md5 = metadata.content_md5.clone();

        let record = self
            .placement
            .create_object(
                &bucket.name,
                CreateObjectParams {
                    owner,
                    bucket_id,
                    name: object.name.clone(),
                    object_id: metadata.object_id,
                    content_length: metadata.content_length,
                    content_md5: metadata.content_md5,
                    content_type: metadata.content_type,
                    headers: metadata.headers,
                    roles: metadata.roles,
                    sharks: metadata.sharks,
                    vnode: 0, // assigned by the placement layer
                    request_id,
                },
            )
            .await?;

        debug!(bucket = %bucket.name, object = %object.name, etag = %record.etag(), "put_object: done");

        Ok(WriteOutcome {
            object_id: record.id,
            modified: record.modified,
            computed_md5,
            allow_origin: header_str(req.headers, "origin").map(ToString::to_string),
        })
    }
}

impl ObjectWriteOrchestrator {
    /// Replace an object's caller-defined attributes without re-streaming
    /// content. Headers, content type, and roles are rebuilt from the
    /// request; content fields and replica placements carry over from the
    /// current record, as does the entity tag.
    pub async fn update_object_metadata(
        &self,
        caller: &Caller,
        req: WriteRequest<'_>,
    ) -> Result<WriteOutcome> {
        let request_id = Uuid::new_v4().to_string();
        let ctx = RequestContext::load(
            caller.clone(),
            &Method::PUT,
            Some(req.bucket),
            Some(req.object),
        )?;
        let bucket = ctx
            .bucket
            .clone()
            .ok_or_else(|| Error::internal("update without bucket context"))?;
        let object = ctx
            .object
            .clone()
            .ok_or_else(|| Error::internal("update without object context"))?;
        let owner = caller.owner();

        debug!(%owner, bucket = %bucket.name, object = %object.name, %request_id, "update_object_metadata: requested");

        let bucket_record = self.placement.fetch_bucket(owner, &bucket.name).await?;
        self.authorizer.authorize(&ctx).await?;

        let existing = self
            .placement
            .fetch_object(owner, &bucket.name, bucket_record.id, &object.name)
            .await?
            .ok_or_else(|| Error::ObjectNotFound {
                bucket: bucket.name.to_string(),
                name: object.name.to_string(),
            })?;

        let preconditions = Preconditions::from_headers(req.headers);
        match preconditions.evaluate(Some((&existing.etag(), existing.modified))) {
            ConditionalOutcome::Failed(header) => {
                return Err(Error::PreconditionFailed(header.to_string()));
            }
            ConditionalOutcome::Passed | ConditionalOutcome::AbsentAcceptable => {}
        }

        let explicit_tags = req.role_tag_param.or_else(|| header_str(req.headers, ROLE_TAG));
        let roles = self.roles.resolve(explicit_tags, caller).await?;

        let metadata = assemble(
            existing.id,
            req.headers,
            existing.content_length,
            existing.content_md5.clone(),
            header_str(req.headers, "content-type").or(Some(existing.content_type.as_str())),
            roles,
            existing.sharks.clone(),
            self.config.max_header_bytes,
        );
        let computed_md5 = metadata.content_md5.clone();

        let record = self
            .placement
            .create_object(
                &bucket.name,
                CreateObjectParams {
                    owner,
                    bucket_id: bucket_record.id,
                    name: object.name.clone(),
                    object_id: metadata.object_id,
                    content_length: metadata.content_length,
                    content_md5: metadata.content_md5,
                    content_type: metadata.content_type,
                    headers: metadata.headers,
                    roles: metadata.roles,
                    sharks: metadata.sharks,
                    vnode: 0,
                    request_id,
                },
            )
            .await?;

        debug!(bucket = %bucket.name, object = %object.name, etag = %record.etag(), "update_object_metadata: done");

        Ok(WriteOutcome {
            object_id: record.id,
            modified: record.modified,
            computed_md5,
            allow_origin: header_str(req.headers, "origin").map(ToString::to_string),
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
