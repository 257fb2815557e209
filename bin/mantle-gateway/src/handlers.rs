//! HTTP handlers mapping the object API onto the orchestration pipeline
//!
//! Thin layer: extract path/headers/body, mint the dev caller, run the
//! pipeline, translate outcome or error onto the wire. All object
//! semantics live in mantle-api.

use crate::streamer::{BufferedStreamer, SharkPool};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use dashmap::DashMap;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use mantle_api::{
    Authorizer, ObjectDeleteOrchestrator, ObjectReadOrchestrator, ObjectWriteOrchestrator,
    ReadOutcome, SharkStreamer, WriteOutcome, WriteRequest,
};
use mantle_common::{ApiConfig, BucketName, Error, ObjectName, OwnerId};
use mantle_identity::{Account, Caller, InMemoryIdentity, RoleResolver};
use mantle_meta::{InMemoryMetadataClient, MetadataPlacement, ObjectRecord};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared gateway state; everything here is read-only or internally
/// synchronized
pub struct AppState {
    pub placement: Arc<MetadataPlacement>,
    pub shard_clients: Vec<Arc<InMemoryMetadataClient>>,
    pub identity: Arc<InMemoryIdentity>,
    pub roles: RoleResolver,
    pub authorizer: Arc<dyn Authorizer>,
    pub config: ApiConfig,
    pub pool: Arc<SharkPool>,
    pub dev_roles: Vec<String>,
    accounts: DashMap<String, Caller>,
}

impl AppState {
    #[must_use]
    pub fn new(
        placement: Arc<MetadataPlacement>,
        shard_clients: Vec<Arc<InMemoryMetadataClient>>,
        identity: Arc<InMemoryIdentity>,
        roles: RoleResolver,
        authorizer: Arc<dyn Authorizer>,
        config: ApiConfig,
        pool: Arc<SharkPool>,
        dev_roles: Vec<String>,
    ) -> Self {
        Self {
            placement,
            shard_clients,
            identity,
            roles,
            authorizer,
            config,
            pool,
            dev_roles,
            accounts: DashMap::new(),
        }
    }

    /// Dev registry: accounts are minted on first use, with the
    /// configured role names pre-registered
    fn caller_for(&self, login: &str) -> Caller {
        self.accounts
            .entry(login.to_string())
            .or_insert_with(|| {
                for role in &self.dev_roles {
                    self.identity.add_role(login, role);
                }
                Caller::account(Account::new(OwnerId::new(), login))
            })
            .clone()
    }

    fn writer(&self, body: Bytes) -> ObjectWriteOrchestrator {
        ObjectWriteOrchestrator::new(
            Arc::clone(&self.placement),
            self.roles.clone(),
            Arc::new(BufferedStreamer::new(Arc::clone(&self.pool), body)) as Arc<dyn SharkStreamer>,
            Arc::clone(&self.authorizer),
            self.config.clone(),
        )
    }

    fn reader(&self) -> ObjectReadOrchestrator {
        ObjectReadOrchestrator::new(Arc::clone(&self.placement), Arc::clone(&self.authorizer))
    }

    fn deleter(&self) -> ObjectDeleteOrchestrator {
        ObjectDeleteOrchestrator::new(Arc::clone(&self.placement), Arc::clone(&self.authorizer))
    }

    /// Direct record lookup, outside the conditional pipeline. Used to
    /// find the content key before a delete removes the record.
    async fn lookup_record(
        &self,
        caller: &Caller,
        bucket: &str,
        object: &str,
    ) -> Option<ObjectRecord> {
        let bucket = BucketName::new(bucket).ok()?;
        let object = ObjectName::new(object).ok()?;
        let bucket_record = self
            .placement
            .fetch_bucket(caller.owner(), &bucket)
            .await
            .ok()?;
        self.placement
            .fetch_object(caller.owner(), &bucket, bucket_record.id, &object)
            .await
            .ok()
            .flatten()
    }
}

/// Pipeline error carried onto the wire as `{code, message}` with the
/// taxonomy's status
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::json!({
            "code": self.0.code(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub async fn put_bucket(
    State(state): State<Arc<AppState>>,
    Path((account, bucket)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let caller = state.caller_for(&account);
    let name = BucketName::new(&bucket).map_err(Error::from)?;

    match state.placement.fetch_bucket(caller.owner(), &name).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(Error::BucketNotFound(_)) => {
            let location = state.placement.bucket_location(caller.owner(), &name);
            let client = state
                .shard_clients
                .get(location.shard as usize)
                .ok_or_else(|| Error::unavailable(format!("no shard {}", location.shard)))?;
            client.seed_bucket(caller.owner(), &name);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn head_bucket(
    State(state): State<Arc<AppState>>,
    Path((account, bucket)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let caller = state.caller_for(&account);
    let name = BucketName::new(&bucket).map_err(Error::from)?;
    state.placement.fetch_bucket(caller.owner(), &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn put_object(
    State(state): State<Arc<AppState>>,
    Path((account, bucket, object)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let caller = state.caller_for(&account);
    let chunked = headers
        .get(header::TRANSFER_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));
    let content_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let request = WriteRequest {
        bucket: &bucket,
        object: &object,
        headers: &headers,
        chunked,
        content_length,
        role_tag_param: params.get("role-tag").map(String::as_str),
    };

    let writer = state.writer(body);
    let outcome = if params.contains_key("metadata") {
        writer.update_object_metadata(&caller, request).await?
    } else {
        writer.put_object(&caller, request).await?
    };

    Ok(write_response(&outcome))
}

pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path((account, bucket, object)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = state.caller_for(&account);
    let outcome = state
        .reader()
        .get_object(&caller, &bucket, &object, &headers)
        .await?;

    let body = state
        .pool
        .content(outcome.record.id)
        .unwrap_or_else(Bytes::new);
    Ok((StatusCode::OK, read_headers(&outcome), body).into_response())
}

pub async fn delete_object(
    State(state): State<Arc<AppState>>,
    Path((account, bucket, object)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let caller = state.caller_for(&account);
    // Capture the content key before the record disappears
    let existing = state.lookup_record(&caller, &bucket, &object).await;

    state
        .deleter()
        .delete_object(&caller, &bucket, &object, &headers)
        .await?;

    if let Some(record) = existing {
        state.pool.remove(record.id);
    }
    Ok(StatusCode::NO_CONTENT)
}

fn write_response(outcome: &WriteOutcome) -> Response {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, "etag", &outcome.object_id.to_string());
    insert_header(&mut headers, "last-modified", &outcome.modified.to_rfc2822());
    insert_header(&mut headers, "computed-md5", &outcome.computed_md5);
    if let Some(origin) = &outcome.allow_origin {
        insert_header(&mut headers, "access-control-allow-origin", origin);
    }
    (StatusCode::NO_CONTENT, headers).into_response()
}

fn read_headers(outcome: &ReadOutcome) -> HeaderMap {
    let record = &outcome.record;
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, "etag", &outcome.etag());
    insert_header(&mut headers, "last-modified", &record.modified.to_rfc2822());
    insert_header(&mut headers, "durability-level", &outcome.durability().to_string());
    insert_header(&mut headers, "content-md5", &record.content_md5);
    insert_header(&mut headers, "content-type", &record.content_type);

    // Headers captured at write time come back verbatim
    for (name, value) in &record.headers {
        insert_header(&mut headers, name, value);
    }
    if let Some(origin) = &outcome.allow_origin {
        insert_header(&mut headers, "access-control-allow-origin", origin);
    }
    headers
}

/// Insert a header, skipping values the wire cannot carry
fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) {
    if let (Ok(name), Ok(value)) = (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        headers.insert(name, value);
    }
}
