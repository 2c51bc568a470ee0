//! Live transfer state shared between one writer and many observers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::time::Instant;

use super::throughput::ThroughputMeter;
use crate::model::ItemId;

/// Point-in-time view of a transfer, safe to hand to a UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// True from the start of a transfer until its terminal event.
    pub busy: bool,
    /// Bytes received in the current (or last) transfer.
    pub received_bytes: u64,
    /// Declared content length, 0 when unknown.
    pub expected_bytes: u64,
    /// `received / expected`; unchanged by chunks while the length is unknown.
    pub progress: f64,
    /// Last sampled throughput in KB/s.
    pub throughput_kbps: u64,
}

impl ProgressSnapshot {
    /// Formats the throughput the way the list row shows it, e.g. `"120 KB/s"`.
    #[must_use]
    pub fn speed_label(&self) -> String {
        format!("{} KB/s", self.throughput_kbps)
    }
}

#[derive(Debug)]
struct TransferState {
    received: u64,
    expected: u64,
    progress: f64,
    meter: ThroughputMeter,
}

/// Transfer state for one item identity.
///
/// Handles are created by the [`TransferRegistry`](super::TransferRegistry) and
/// reused across fetches of the same item, so an observer that looks a handle up
/// again sees the live state of whatever transfer is running. Only the engine
/// task that won [`try_begin`](Self::try_begin) mutates the state until it calls
/// `finish`.
#[derive(Debug)]
pub struct TransferHandle {
    id: ItemId,
    busy: AtomicBool,
    state: Mutex<TransferState>,
    cancel: Mutex<Arc<AtomicBool>>,
}

impl TransferHandle {
    pub(crate) fn new(id: ItemId) -> Self {
        Self {
            id,
            busy: AtomicBool::new(false),
            state: Mutex::new(TransferState {
                received: 0,
                expected: 0,
                progress: 0.0,
                meter: ThroughputMeter::new(Instant::now()),
            }),
            cancel: Mutex::new(Arc::new(AtomicBool::new(false))),
        }
    }

    /// Returns the identity this handle tracks.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Returns true while a transfer is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Reads the current state.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.lock_state();
        ProgressSnapshot {
            busy: self.is_busy(),
            received_bytes: state.received,
            expected_bytes: state.expected,
            progress: state.progress,
            throughput_kbps: state.meter.kbps(),
        }
    }

    /// Claims the handle for a new transfer.
    ///
    /// Returns the new transfer's cancellation flag, or `None` if a transfer
    /// is already in flight.
    pub(crate) fn try_begin(&self) -> Option<Arc<AtomicBool>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }

        {
            let mut state = self.lock_state();
            state.received = 0;
            state.expected = 0;
            state.progress = 0.0;
            state.meter.restart_window(Instant::now());
        }

        let flag = Arc::new(AtomicBool::new(false));
        *self.lock_cancel() = Arc::clone(&flag);
        Some(flag)
    }

    /// Records the declared length from a successful response head.
    pub(crate) fn record_headers(&self, expected: u64) {
        let mut state = self.lock_state();
        state.expected = expected;
        state.received = 0;
        state.meter.restart_window(Instant::now());
    }

    /// Records one body chunk and returns the resulting snapshot.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn record_chunk(&self, len: u64, now: Instant) -> ProgressSnapshot {
        let mut state = self.lock_state();
        state.received = state.received.saturating_add(len);
        if state.expected > 0 {
            state.progress = state.received as f64 / state.expected as f64;
        }
        state.meter.record(len, now);

        ProgressSnapshot {
            busy: true,
            received_bytes: state.received,
            expected_bytes: state.expected,
            progress: state.progress,
            throughput_kbps: state.meter.kbps(),
        }
    }

    /// Marks the transfer finished. A failed transfer reports zero throughput.
    pub(crate) fn finish(&self, failed: bool) {
        if failed {
            self.lock_state().meter.clear_rate();
        }
        self.busy.store(false, Ordering::SeqCst);
    }

    /// Signals the in-flight transfer, if any, to stop.
    pub(crate) fn cancel(&self) {
        self.lock_cancel().store(true, Ordering::SeqCst);
    }

    fn lock_state(&self) -> MutexGuard<'_, TransferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cancel(&self) -> MutexGuard<'_, Arc<AtomicBool>> {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
