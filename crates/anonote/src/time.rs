use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in seconds.
pub fn unix_time_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
