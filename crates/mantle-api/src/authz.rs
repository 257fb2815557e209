//! Authorization seam
//!
//! The rules engine that decides whether a caller may perform an action
//! lives outside this crate; the pipeline only consumes the decision at
//! its fixed position in the stage ordering.

use crate::context::RequestContext;
use async_trait::async_trait;
use mantle_common::Result;

/// Authorization decision point, invoked once per request after the
/// bucket existence check (write path) or metadata fetch (read path).
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, ctx: &RequestContext) -> Result<()>;
}

/// Permits every action. Used by the dev gateway and tests; production
/// deployments supply a real rules engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenAuthorizer;

#[async_trait]
impl Authorizer for OpenAuthorizer {
    async fn authorize(&self, _ctx: &RequestContext) -> Result<()> {
        Ok(())
    }
}
