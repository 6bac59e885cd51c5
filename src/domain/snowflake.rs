//! Discord snowflake <-> timestamp conversion.

use chrono::{DateTime, Utc};

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01T00:00:00Z).
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

const TIMESTAMP_SHIFT: u32 = 22;
const LOW_BITS: u64 = (1 << TIMESTAMP_SHIFT) - 1;

/// Returns the timestamp encoded in a snowflake.
#[must_use]
pub fn timestamp_of(id: u64) -> Option<DateTime<Utc>> {
    let offset = i64::try_from(id >> TIMESTAMP_SHIFT).ok()?;
    DateTime::from_timestamp_millis(offset + DISCORD_EPOCH_MS)
}

/// Returns the lowest snowflake that can be minted at `time`.
#[must_use]
pub fn lowest_at(time: DateTime<Utc>) -> u64 {
    let offset = (time.timestamp_millis() - DISCORD_EPOCH_MS).max(0);
    u64::try_from(offset).unwrap_or(0) << TIMESTAMP_SHIFT
}

/// Returns the highest snowflake that can be minted at `time`.
///
/// Used as an exclusive `after` bound: every message created in the same
/// millisecond as `time`, or earlier, has an id at or below it.
#[must_use]
pub fn highest_at(time: DateTime<Utc>) -> u64 {
    lowest_at(time) | LOW_BITS
}
