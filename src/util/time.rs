use chrono::{DateTime, Local, Utc};

/// Get a timestamp in seconds since the UNIX epoch
pub fn timestamp_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

/// Local wall-clock `HH:MM:SS`, for "last saved" labels
pub fn clock_label(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}
