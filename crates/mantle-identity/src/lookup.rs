//! External identity lookup seam
//!
//! One async round-trip that maps role-tag names onto stable identifiers
//! for an account. The in-memory implementation backs the dev gateway and
//! tests, and counts invocations.

use async_trait::async_trait;
use mantle_common::RoleId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Failures the identity service can report
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("account not found: {0}")]
    UnknownAccount(String),

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Identity lookup capability consumed by the role resolver
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Resolve role-tag names for an account login. Names absent from the
    /// account simply do not appear in the returned mapping; deciding
    /// whether that fails the request is the resolver's business.
    async fn resolve_role_names(
        &self,
        login: &str,
        names: &[String],
    ) -> Result<HashMap<String, RoleId>, IdentityError>;
}

/// In-memory identity service for tests and the dev gateway
#[derive(Default)]
pub struct InMemoryIdentity {
    roles: RwLock<HashMap<(String, String), RoleId>>,
    calls: AtomicUsize,
}

impl InMemoryIdentity {
    /// Create an empty identity service
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lookups served
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Register a role for an account, returning its id
    pub fn add_role(&self, login: &str, name: &str) -> RoleId {
        let id = RoleId::new();
        self.roles
            .write()
            .insert((login.to_string(), name.to_string()), id);
        id
    }
}

#[async_trait]
impl IdentityLookup for InMemoryIdentity {
    async fn resolve_role_names(
        &self,
        login: &str,
        names: &[String],
    ) -> Result<HashMap<String, RoleId>, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let roles = self.roles.read();
        let mut out = HashMap::new();
        for name in names {
            if let Some(id) = roles.get(&(login.to_string(), name.clone())) {
                out.insert(name.clone(), *id);
            }
        }
        Ok(out)
    }
}
