use std::time::{SystemTime, UNIX_EPOCH};

use otpkit_state::Hash;

use crate::core::constants::EFFECTIVE_TIME_ALIGNMENT;

//=============================================================================
// Time Helpers
//=============================================================================

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// One-time code counter for `time`.
pub fn counter_at(time: u64, interval: u32) -> u64 {
    time / interval.max(1) as u64
}

/// Start of a new tree: `time` rounded down to a multiple of
/// `EFFECTIVE_TIME_ALIGNMENT` intervals.
pub fn effective_time_for(time: u64, interval: u32) -> u64 {
    let step = interval as u64 * EFFECTIVE_TIME_ALIGNMENT;
    if step == 0 {
        return time;
    }
    time / step * step
}

//=============================================================================
// Encoding Helpers
//=============================================================================

/// Hex form used as the tree store key.
pub fn hex_view(hash: &Hash) -> String {
    hex::encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_time_is_aligned() {
        assert_eq!(effective_time_for(1_000, 30), 900);
        assert_eq!(effective_time_for(1_080, 30), 1_080);
        assert_eq!(effective_time_for(1_079, 30) % 30, 0);
    }

    #[test]
    fn counter_rounds_down() {
        assert_eq!(counter_at(59, 30), 1);
        assert_eq!(counter_at(60, 30), 2);
    }
}
