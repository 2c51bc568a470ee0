//! Sparse throughput sampling for a single transfer.

use std::time::Duration;

use tokio::time::Instant;

use super::constants::THROUGHPUT_SAMPLE_INTERVAL;

/// Windowed throughput meter.
///
/// Bytes accumulate into the current window; the rate is only recomputed once
/// the window is at least `interval` old, after which a new window starts.
/// Between samples [`kbps`](Self::kbps) keeps reporting the previous value.
#[derive(Debug, Clone)]
pub struct ThroughputMeter {
    interval: Duration,
    window_start: Instant,
    window_bytes: u64,
    kbps: u64,
}

impl ThroughputMeter {
    /// Creates a meter with the default 200 ms sampling interval.
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self::with_interval(now, THROUGHPUT_SAMPLE_INTERVAL)
    }

    /// Creates a meter with a custom sampling interval.
    #[must_use]
    pub fn with_interval(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            window_start: now,
            window_bytes: 0,
            kbps: 0,
        }
    }

    /// Starts a fresh window at `now`. The last reported rate is kept.
    pub fn restart_window(&mut self, now: Instant) {
        self.window_start = now;
        self.window_bytes = 0;
    }

    /// Resets the reported rate to zero.
    pub fn clear_rate(&mut self) {
        self.kbps = 0;
    }

    /// Adds `bytes` to the current window and samples the rate if the window is old enough.
    ///
    /// Returns true when a new sample was taken.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn record(&mut self, bytes: u64, now: Instant) -> bool {
        self.window_bytes = self.window_bytes.saturating_add(bytes);

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval || elapsed.is_zero() {
            return false;
        }

        let kib_per_sec = self.window_bytes as f64 / 1024.0 / elapsed.as_secs_f64();
        self.kbps = kib_per_sec.round() as u64;
        self.restart_window(now);
        true
    }

    /// Last sampled rate in KB/s, rounded to the nearest whole unit.
    #[must_use]
    pub fn kbps(&self) -> u64 {
        self.kbps
    }
}
