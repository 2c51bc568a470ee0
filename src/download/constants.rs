//! Constants for the download module (timeouts, telemetry sampling).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large images).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Minimum time between two throughput samples of one transfer.
pub const THROUGHPUT_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// Capacity of the per-transfer progress channel; snapshots beyond it are dropped.
pub(crate) const PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// Upper bound on the buffer pre-allocated from a declared content length.
pub(crate) const MAX_PREALLOCATION_BYTES: u64 = 16 * 1024 * 1024;

/// How often an in-flight transfer checks its cancellation flag while waiting on the peer.
pub(crate) const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);
