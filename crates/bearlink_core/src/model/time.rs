//! Store timestamp codec.
//!
//! The host app persists timestamps as seconds (often fractional) since
//! 2001-01-01T00:00:00Z. Everything outside the read path works with UTC
//! calendar time.

use chrono::{DateTime, Utc};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
pub const STORE_EPOCH_OFFSET_SECS: i64 = 978_307_200;

/// Converts a stored epoch-offset value into UTC calendar time.
///
/// Returns `None` when the value is not finite or falls outside the range
/// `chrono` can represent.
pub fn from_store_seconds(stored: f64) -> Option<DateTime<Utc>> {
    if !stored.is_finite() {
        return None;
    }

    let whole = stored.floor();
    let nanos = ((stored - whole) * 1_000_000_000.0).round() as i64;
    // Rounding can carry the fraction into the next whole second.
    let (whole, nanos) = if nanos >= 1_000_000_000 {
        (whole + 1.0, 0)
    } else {
        (whole, nanos)
    };

    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let unix_secs = (whole as i64).checked_add(STORE_EPOCH_OFFSET_SECS)?;
    DateTime::from_timestamp(unix_secs, nanos as u32)
}
