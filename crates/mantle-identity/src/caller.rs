//! Authenticated caller types
//!
//! Authentication itself happens upstream; the pipeline receives an
//! already-established caller. A caller acting as a sub-user carries the
//! role set activated for that session.

use mantle_common::{OwnerId, RoleId};
use serde::{Deserialize, Serialize};

/// The account a request operates on behalf of
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier (the bucket/object owner key)
    pub uuid: OwnerId,
    /// Account login used to key identity lookups
    pub login: String,
}

impl Account {
    /// Create a new account reference
    #[must_use]
    pub fn new(uuid: OwnerId, login: impl Into<String>) -> Self {
        Self {
            uuid,
            login: login.into(),
        }
    }
}

/// A sub-user (impersonated identity) within an account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubUser {
    /// Sub-user login within the account
    pub login: String,
}

/// The authenticated caller attached to every request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Account the request operates on
    pub account: Account,
    /// Present when the caller is a sub-user of the account
    pub user: Option<SubUser>,
    /// Roles active for this session; used verbatim when a sub-user
    /// supplies no explicit role tags
    pub active_roles: Vec<RoleId>,
}

impl Caller {
    /// An account-level caller with no sub-user and no active roles
    #[must_use]
    pub fn account(account: Account) -> Self {
        Self {
            account,
            user: None,
            active_roles: Vec::new(),
        }
    }

    /// A sub-user caller with the given active role set
    #[must_use]
    pub fn sub_user(
        account: Account,
        login: impl Into<String>,
        active_roles: Vec<RoleId>,
    ) -> Self {
        Self {
            account,
            user: Some(SubUser {
                login: login.into(),
            }),
            active_roles,
        }
    }

    /// Owner key for placement and metadata lookups
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.account.uuid
    }
}
