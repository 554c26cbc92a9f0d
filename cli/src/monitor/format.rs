use std::time::Duration;

use bytesize::ByteSize;

/// Format a byte rate with SI units (e.g., "512 B/s", "1.5 kB/s").
pub fn speed(bytes_per_sec: u64) -> String {
    format!("{}/s", ByteSize::b(bytes_per_sec).display().si())
}

/// Format seconds as human-readable duration (e.g., "2h 37m").
pub fn duration(secs: u64) -> String {
    humantime::format_duration(Duration::from_secs(secs)).to_string()
}

pub fn celsius(temp: f32) -> String {
    format!("{:.1}°C", temp)
}
