use chrono::{DateTime, Local, Utc};

/// Function to format timestamp as readable date
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Current time in milliseconds since the Unix epoch
pub fn current_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert UTC timestamp to local time string
pub fn utc_to_local(timestamp: &DateTime<Utc>) -> String {
    let local_time: DateTime<Local> = DateTime::from(*timestamp);
    local_time.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}
