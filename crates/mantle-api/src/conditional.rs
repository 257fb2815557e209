//! Conditional request evaluation
//!
//! The four conditional headers decide whether the pipeline pre-fetches
//! current metadata at all: with none present the fetch is skipped
//! entirely, which halves the backend round-trips on unconditional
//! operations. Match headers compare opaque entity tags; the
//! modified-since pair compares timestamps at second granularity.

use chrono::{DateTime, Utc};
use http::HeaderMap;
use mantle_common::headers::{IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE};

/// Terminal outcome of evaluating preconditions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionalOutcome {
    /// All supplied preconditions hold; continue
    Passed,
    /// A precondition failed; the request must not proceed and no
    /// mutation may be attempted. Carries the failing header name.
    Failed(&'static str),
    /// The resource is absent and the supplied preconditions accept that
    /// (e.g. `if-none-match: *`); continue as unconditional
    AbsentAcceptable,
}

impl ConditionalOutcome {
    /// Whether the pipeline may continue
    #[must_use]
    pub const fn passed(self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Parsed conditional headers for one request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Preconditions {
    if_match: Option<Vec<String>>,
    if_none_match: Option<Vec<String>>,
    if_modified_since: Option<DateTime<Utc>>,
    if_unmodified_since: Option<DateTime<Utc>>,
}

impl Preconditions {
    /// Extract the conditional headers from a request. Headers with
    /// unparseable dates are ignored, per HTTP semantics.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            if_match: parse_etag_list(headers, IF_MATCH),
            if_none_match: parse_etag_list(headers, IF_NONE_MATCH),
            if_modified_since: parse_http_date(headers, IF_MODIFIED_SINCE),
            if_unmodified_since: parse_http_date(headers, IF_UNMODIFIED_SINCE),
        }
    }

    /// True when none of the four conditional headers is present. The
    /// caller skips the metadata pre-fetch in that case.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.if_match.is_none()
            && self.if_none_match.is_none()
            && self.if_modified_since.is_none()
            && self.if_unmodified_since.is_none()
    }

    /// Whether evaluating these preconditions requires current metadata
    #[must_use]
    pub const fn requires_fetch(&self) -> bool {
        !self.is_empty()
    }

    /// Evaluate against the current resource state: `Some((etag,
    /// modified))` when it exists, `None` when it does not.
    #[must_use]
    pub fn evaluate(&self, current: Option<(&str, DateTime<Utc>)>) -> ConditionalOutcome {
        let Some((etag, modified)) = current else {
            return self.evaluate_absent();
        };

        if let Some(candidates) = &self.if_match {
            if !etag_list_matches(candidates, etag) {
                return ConditionalOutcome::Failed(IF_MATCH);
            }
        } else if let Some(limit) = self.if_unmodified_since {
            if modified.timestamp() > limit.timestamp() {
                return ConditionalOutcome::Failed(IF_UNMODIFIED_SINCE);
            }
        }

        if let Some(candidates) = &self.if_none_match {
            if etag_list_matches(candidates, etag) {
                return ConditionalOutcome::Failed(IF_NONE_MATCH);
            }
        } else if let Some(since) = self.if_modified_since {
            if modified.timestamp() <= since.timestamp() {
                return ConditionalOutcome::Failed(IF_MODIFIED_SINCE);
            }
        }

        ConditionalOutcome::Passed
    }

    /// Evaluation rules when the resource does not exist. `if-match`
    /// demands an entity to compare and fails; `if-none-match` accepts
    /// the absence; the date headers have nothing to compare.
    const fn evaluate_absent(&self) -> ConditionalOutcome {
        if self.if_match.is_some() {
            return ConditionalOutcome::Failed(IF_MATCH);
        }
        if self.if_none_match.is_some() {
            return ConditionalOutcome::AbsentAcceptable;
        }
        ConditionalOutcome::Passed
    }
}

/// Compare an entity tag against a candidate list, honoring `*`. Entity
/// tags are opaque identities here; weak-comparison prefixes and quoting
/// are stripped, nothing else is interpreted.
fn etag_list_matches(candidates: &[String], etag: &str) -> bool {
    candidates
        .iter()
        .any(|c| c == "*" || normalize_etag(c) == normalize_etag(etag))
}

fn normalize_etag(raw: &str) -> &str {
    let raw = raw.strip_prefix("W/").unwrap_or(raw);
    raw.trim_matches('"')
}

fn parse_etag_list(headers: &HeaderMap, name: &str) -> Option<Vec<String>> {
    let value = headers.get(name)?.to_str().ok()?;
    Some(
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
    )
}

fn parse_http_date(headers: &HeaderMap, name: &str) -> Option<DateTime<Utc>> {
    let value = headers.get(name)?.to_str().ok()?;
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
