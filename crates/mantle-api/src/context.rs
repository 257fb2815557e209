//! Request context loading
//!
//! Turns raw path identifiers and the HTTP method into typed entities
//! and the authorization action. Name validation happens here,
//! synchronously, so a structurally invalid request never triggers any
//! backend call.

use http::Method;
use mantle_common::{BucketName, ObjectName, Result};
use mantle_identity::Caller;
use uuid::Uuid;

/// The verb half of an authorization action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionVerb {
    Get,
    Put,
    Delete,
}

impl ActionVerb {
    /// Map an HTTP method onto its authorization verb
    #[must_use]
    pub fn from_method(method: &Method) -> Self {
        match *method {
            Method::GET | Method::HEAD | Method::OPTIONS => Self::Get,
            Method::DELETE => Self::Delete,
            _ => Self::Put,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }
}

/// The resource half of an authorization action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Bucket,
    Object,
    /// Top-level listing space, addressed when no bucket key is present
    Directory,
}

impl ResourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::Object => "object",
            Self::Directory => "directory",
        }
    }
}

/// Authorization action evaluated against the caller's rules
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthAction {
    pub verb: ActionVerb,
    pub resource: ResourceKind,
}

impl AuthAction {
    /// Combined action label, e.g. `putobject`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.verb.as_str(), self.resource.as_str())
    }
}

/// A bucket referenced by a request. The id is populated only after a
/// successful existence lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    pub name: BucketName,
    pub id: Option<Uuid>,
}

/// An object referenced by a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketObject {
    pub bucket_name: BucketName,
    pub name: ObjectName,
}

/// Typed per-request state threaded through the pipeline stages. Built
/// once by the loader; later stages receive it as an explicit input and
/// produce updated values rather than mutating shared request state.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub caller: Caller,
    pub action: AuthAction,
    pub bucket: Option<Bucket>,
    pub object: Option<BucketObject>,
}

impl RequestContext {
    /// Load and validate a request context. Fails with
    /// `InvalidBucketName` / `InvalidBucketObjectName` before any network
    /// I/O when a name breaks the grammar.
    pub fn load(
        caller: Caller,
        method: &Method,
        bucket_name: Option<&str>,
        object_name: Option<&str>,
    ) -> Result<Self> {
        let bucket = bucket_name
            .map(BucketName::new)
            .transpose()?
            .map(|name| Bucket { name, id: None });

        let object = match (&bucket, object_name) {
            (Some(bucket), Some(raw)) => Some(BucketObject {
                bucket_name: bucket.name.clone(),
                name: ObjectName::new(raw)?,
            }),
            _ => None,
        };

        let resource = if object.is_some() {
            ResourceKind::Object
        } else if bucket.is_some() {
            ResourceKind::Bucket
        } else {
            ResourceKind::Directory
        };

        Ok(Self {
            caller,
            action: AuthAction {
                verb: ActionVerb::from_method(method),
                resource,
            },
            bucket,
            object,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantle_common::{Error, OwnerId};
    use mantle_identity::Account;

    fn caller() -> Caller {
        Caller::account(Account::new(OwnerId::new(), "alice"))
    }

    #[test]
    fn test_action_verb_mapping() {
        assert_eq!(ActionVerb::from_method(&Method::GET), ActionVerb::Get);
        assert_eq!(ActionVerb::from_method(&Method::HEAD), ActionVerb::Get);
        assert_eq!(ActionVerb::from_method(&Method::OPTIONS), ActionVerb::Get);
        assert_eq!(ActionVerb::from_method(&Method::DELETE), ActionVerb::Delete);
        assert_eq!(ActionVerb::from_method(&Method::PUT), ActionVerb::Put);
        assert_eq!(ActionVerb::from_method(&Method::POST), ActionVerb::Put);
    }

    #[test]
    fn test_resource_kind_from_path_parts() {
        let ctx = RequestContext::load(caller(), &Method::PUT, Some("photos"), Some("cat.jpg"))
            .unwrap();
        assert_eq!(ctx.action.resource, ResourceKind::Object);
        assert_eq!(ctx.action.label(), "putobject");

        let ctx = RequestContext::load(caller(), &Method::GET, Some("photos"), None).unwrap();
        assert_eq!(ctx.action.resource, ResourceKind::Bucket);
        assert_eq!(ctx.action.label(), "getbucket");

        let ctx = RequestContext::load(caller(), &Method::GET, None, None).unwrap();
        assert_eq!(ctx.action.resource, ResourceKind::Directory);
        assert!(ctx.bucket.is_none());
    }

    #[test]
    fn test_invalid_bucket_name_rejected_synchronously() {
        let err = RequestContext::load(caller(), &Method::PUT, Some("NOPE"), Some("cat.jpg"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBucketName(_)));
    }

    #[test]
    fn test_invalid_object_name_rejected_synchronously() {
        let err =
            RequestContext::load(caller(), &Method::PUT, Some("photos"), Some("")).unwrap_err();
        assert!(matches!(err, Error::InvalidBucketObjectName(_)));
    }

    #[test]
    fn test_bucket_id_absent_before_lookup() {
        let ctx = RequestContext::load(caller(), &Method::GET, Some("photos"), None).unwrap();
        assert!(ctx.bucket.unwrap().id.is_none());
    }
}
