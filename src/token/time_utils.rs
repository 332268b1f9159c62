//! Clock access and the expiry policy.

use crate::token::error::CellarError;
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in seconds since Unix epoch.
///
/// A system clock set before the epoch yields an error rather than a panic.
pub(crate) fn current_timestamp() -> Result<u64, CellarError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| CellarError::ClockError("System time is before Unix epoch".to_string()))
}

/// A token is expired from the very second its expiry is reached.
pub fn is_expired(expiry: u64, now: u64) -> bool {
    now >= expiry
}

/// Compute `now + lifetime`, refusing to wrap.
pub(crate) fn expiry_after(now: u64, lifetime: u64) -> Result<u64, CellarError> {
    now.checked_add(lifetime)
        .ok_or(CellarError::LifetimeOverflow(lifetime))
}
