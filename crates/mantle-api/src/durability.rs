//! Durability level validation
//!
//! The requested replica count is validated against configured bounds
//! before any replica is selected; availability of actual replicas never
//! enters into it. Failures carry the configured bounds so callers can
//! self-correct.

use mantle_common::config::DurabilityConfig;
use mantle_common::{Error, Result};

/// Validate the requested copy count from the `durability-level` header.
/// An absent header falls back to the configured default, which is
/// subject to the same bounds.
pub fn validate_durability(requested: Option<&str>, config: &DurabilityConfig) -> Result<u32> {
    let out_of_bounds = || Error::InvalidDurabilityLevel {
        min: config.min_copies,
        max: config.max_copies,
    };

    let copies = match requested {
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| out_of_bounds())?,
        None => i64::from(config.default_copies),
    };

    if copies < i64::from(config.min_copies) || copies > i64::from(config.max_copies) {
        return Err(out_of_bounds());
    }

    Ok(copies as u32)
}
