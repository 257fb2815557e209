//! Mantle Gateway - development HTTP front end
//!
//! Serves the object API over in-process backends: an in-memory
//! metadata shard per ring slot, an in-memory identity service, and a
//! buffering content store. Accounts are minted on first use.

mod handlers;
mod streamer;

use anyhow::Result;
use axum::Router;
use axum::routing::{get, put};
use clap::Parser;
use handlers::AppState;
use mantle_api::{Authorizer, OpenAuthorizer};
use mantle_common::config::{ApiConfig, DurabilityConfig};
use mantle_identity::{IdentityLookup, InMemoryIdentity, RoleResolver};
use mantle_meta::{InMemoryMetadataClient, MetadataClient, MetadataPlacement};
use mantle_placement::{PlacementRing, ShardInfo};
use std::sync::Arc;
use streamer::SharkPool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "mantle-gateway")]
#[command(about = "Mantle object API gateway (development backends)")]
#[command(version)]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Number of metadata shards
    #[arg(long, default_value = "2")]
    shards: u32,

    /// Virtual nodes on the placement ring
    #[arg(long, default_value = "1024")]
    vnodes: u32,

    /// Sharks in the synthetic content fleet
    #[arg(long, default_value = "6")]
    sharks: usize,

    /// Minimum accepted durability level
    #[arg(long, default_value = "1")]
    durability_min: u32,

    /// Maximum accepted durability level
    #[arg(long, default_value = "9")]
    durability_max: u32,

    /// Durability level applied when the request does not specify one
    #[arg(long, default_value = "2")]
    durability_default: u32,

    /// Role names pre-registered for every minted account
    #[arg(long = "role", default_values_t = vec!["admin".to_string(), "ops".to_string()])]
    roles: Vec<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mantle Gateway");
    info!(
        "Placement: {} shards, {} vnodes; content fleet: {} sharks",
        args.shards, args.vnodes, args.sharks
    );

    let shard_infos = (0..args.shards)
        .map(|i| ShardInfo::new(format!("shard-{i}")))
        .collect();
    let ring = PlacementRing::new(shard_infos, args.vnodes)?;
    let placement = Arc::new(MetadataPlacement::new(ring));

    let shard_clients: Vec<Arc<InMemoryMetadataClient>> = (0..args.shards)
        .map(|shard| {
            let client = Arc::new(InMemoryMetadataClient::new());
            placement.register_client(shard, Arc::clone(&client) as Arc<dyn MetadataClient>);
            client
        })
        .collect();

    let identity = Arc::new(InMemoryIdentity::new());
    let roles = RoleResolver::new(Arc::clone(&identity) as Arc<dyn IdentityLookup>);

    let config = ApiConfig {
        durability: DurabilityConfig {
            min_copies: args.durability_min,
            max_copies: args.durability_max,
            default_copies: args.durability_default,
        },
        ..ApiConfig::default()
    };
    info!(
        "Durability: {}..={} copies, default {}",
        config.durability.min_copies, config.durability.max_copies, config.durability.default_copies
    );

    let state = Arc::new(AppState::new(
        placement,
        shard_clients,
        identity,
        roles,
        Arc::new(OpenAuthorizer) as Arc<dyn Authorizer>,
        config,
        Arc::new(SharkPool::new(args.sharks)),
        args.roles.clone(),
    ));

    let app = Router::new()
        .route(
            "/{account}/buckets/{bucket}",
            put(handlers::put_bucket).head(handlers::head_bucket),
        )
        .route(
            "/{account}/buckets/{bucket}/objects/{*object}",
            put(handlers::put_object)
                .get(handlers::get_object)
                .delete(handlers::delete_object),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(&args.listen).await?;
    info!("Listening on {}", args.listen);
    axum::serve(listener, app).await?;
    Ok(())
}
