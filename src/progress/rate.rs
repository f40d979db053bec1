//! Throughput and ETA estimation.
//!
//! The rate is the instantaneous rate between the two most recent redraws, not
//! a sliding-window average. Callers wanting a steadier figure should raise the
//! bar's minimum redraw interval.

use std::time::Instant;

/// Items per second between the last render and `now`.
///
/// Returns `0.0` when there is no previous render, when no time has passed,
/// or when the clock appears to have gone backwards.
pub fn estimate_rate(now: Instant, current: u64, last: Option<(Instant, u64)>) -> f64 {
    let Some((last_time, last_progress)) = last else {
        return 0.0;
    };
    let Some(elapsed) = now.checked_duration_since(last_time) else {
        return 0.0;
    };
    let elapsed = elapsed.as_secs_f64();
    if elapsed <= 0.0 {
        return 0.0;
    }
    current.saturating_sub(last_progress) as f64 / elapsed
}

/// Estimated seconds until `progress` reaches `total` at `rate`.
pub fn eta(total: u64, progress: u64, rate: f64) -> f64 {
    if progress == 0 || rate <= 0.0 {
        return 0.0;
    }
    total.saturating_sub(progress) as f64 / rate
}
