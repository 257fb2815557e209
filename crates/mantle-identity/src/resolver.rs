//! Role-tag resolution
//!
//! Explicit role tags resolve through the identity lookup all-or-nothing:
//! the first unresolved name fails the request and no partial role set is
//! ever applied. Without explicit tags, a sub-user caller contributes its
//! active roles and an account caller contributes none.

use crate::caller::Caller;
use crate::lookup::{IdentityError, IdentityLookup};
use mantle_common::{Error, Result, RoleId};
use std::sync::Arc;
use tracing::debug;

/// Split a comma-separated role-tag list, trimming surrounding whitespace
#[must_use]
pub fn parse_role_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Resolves role tags to stable role identifiers
#[derive(Clone)]
pub struct RoleResolver {
    lookup: Arc<dyn IdentityLookup>,
}

impl RoleResolver {
    /// Create a resolver over the given identity lookup
    #[must_use]
    pub fn new(lookup: Arc<dyn IdentityLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve the role set for a write.
    ///
    /// `explicit` is the raw comma-separated tag list from an
    /// authorization parameter or the `role-tag` header, when supplied.
    pub async fn resolve(&self, explicit: Option<&str>, caller: &Caller) -> Result<Vec<RoleId>> {
        let Some(raw) = explicit else {
            // No explicit tags: a sub-user keeps its active roles, an
            // account-level caller gets none.
            if caller.user.is_some() {
                return Ok(caller.active_roles.clone());
            }
            return Ok(Vec::new());
        };

        let names = parse_role_tags(raw);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        debug!(login = %caller.account.login, count = names.len(), "resolve_roles: requested");
        let mapping = self
            .lookup
            .resolve_role_names(&caller.account.login, &names)
            .await
            .map_err(|err| match err {
                IdentityError::Unavailable(msg) => Error::BackendUnavailable(msg),
                IdentityError::UnknownAccount(login) => {
                    Error::internal(format!("authenticated account unknown to identity: {login}"))
                }
            })?;

        let mut roles = Vec::with_capacity(names.len());
        for name in &names {
            match mapping.get(name) {
                Some(id) => roles.push(*id),
                None => {
                    debug!(login = %caller.account.login, role = %name, "resolve_roles: failed");
                    return Err(Error::InvalidRoleTag(name.clone()));
                }
            }
        }
        debug!(login = %caller.account.login, count = roles.len(), "resolve_roles: done");
        Ok(roles)
    }
}
