//! Formatting utilities for durations and rates.

/// Formats seconds as `MM:SS`.
///
/// Minutes are not rolled over into hours, so long runs show e.g. `125:07`.
/// Negative and non-finite inputs render as `00:00`.
pub fn format_time(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Formats a rate with two decimals.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}")
}
