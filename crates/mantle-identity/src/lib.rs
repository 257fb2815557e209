//! Mantle Identity - caller identity and role-tag resolution
//!
//! Role tags are human-readable access-control labels. The resolver maps
//! them onto stable role identifiers through an external identity lookup,
//! all-or-nothing, or falls back to a sub-user caller's active role set.

pub mod caller;
pub mod lookup;
pub mod resolver;

pub use caller::{Account, Caller, SubUser};
pub use lookup::{IdentityError, IdentityLookup, InMemoryIdentity};
pub use resolver::RoleResolver;
