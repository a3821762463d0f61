//! Timestamp bookkeeping helpers.
//!
//! Used by `RecordRepository::track_timestamps` to maintain
//! `created_at` / `updated_at` in epoch milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

/// Current wall-clock time in epoch milliseconds.
pub fn epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::epoch_ms;

    #[test]
    fn epoch_ms_is_monotonic_enough() {
        let first = epoch_ms();
        let second = epoch_ms();
        assert!(second >= first);
        assert!(first > 1_500_000_000_000);
    }
}
