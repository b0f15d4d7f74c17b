//! Human-readable formatting for sizes, rates, durations and status levels.

/// Severity bucket used to colour gauges and status badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Ok,
    Info,
    Warn,
    Critical,
    Neutral,
}

/// Human-readable size string (`"0 B"`, `"3.4 KB"`, `"15 MB"`).
pub fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut size = bytes as f64;
    for &unit in UNITS {
        if size < 1024.0 {
            return format!("{} {unit}", trim_decimal(size));
        }
        size /= 1024.0;
    }
    format!("{} PB", trim_decimal(size))
}

/// One decimal place, dropping a trailing `.0`.
fn trim_decimal(v: f64) -> String {
    let s = format!("{v:.1}");
    match s.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => s,
    }
}

/// Bytes-per-second as `B/s`, `KB/s`, `MB/s` or `GB/s`.
pub fn format_speed(bytes_per_sec: f64) -> String {
    if bytes_per_sec < 1024.0 {
        format!("{bytes_per_sec:.1} B/s")
    } else if bytes_per_sec < 1_048_576.0 {
        format!("{:.1} KB/s", bytes_per_sec / 1024.0)
    } else if bytes_per_sec < 1_073_741_824.0 {
        format!("{:.1} MB/s", bytes_per_sec / 1_048_576.0)
    } else {
        format!("{:.1} GB/s", bytes_per_sec / 1_073_741_824.0)
    }
}

/// `"14d 6h 56m"`, `"3h 2m"` or `"5m"`.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// Green below 60 %, amber below 85 %, red above.
pub fn percentage_level(percentage: f64) -> Level {
    if percentage < 60.0 {
        Level::Ok
    } else if percentage < 85.0 {
        Level::Warn
    } else {
        Level::Critical
    }
}

/// Map a free-form status word to a [`Level`].
pub fn status_level(status: &str) -> Level {
    match status.to_lowercase().as_str() {
        "running" | "active" | "online" | "up" | "established" => Level::Ok,
        "stopped" | "inactive" | "offline" | "down" => Level::Neutral,
        "error" | "failed" => Level::Critical,
        "warning" | "degraded" | "time_wait" => Level::Warn,
        "restarting" | "starting" | "pending" | "sleeping" | "listen" => Level::Info,
        _ => Level::Neutral,
    }
}
