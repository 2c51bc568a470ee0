//! Progress UI (spinner) fed from live transfer snapshots.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ftcr_core::model::format_size;
use ftcr_core::{ItemId, TransferRegistry};
use indicatif::{ProgressBar, ProgressStyle};

/// Spawns the progress UI (spinner) when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_spinner` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    registry: Arc<TransferRegistry>,
    tracked: Vec<ItemId>,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_spinner {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_spinner_inner(registry, tracked, Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_spinner_inner(
    registry: Arc<TransferRegistry>,
    tracked: Vec<ItemId>,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        while !stop.load(Ordering::SeqCst) {
            spinner.set_message(status_line(&registry, &tracked));
            tokio::time::sleep(Duration::from_millis(120)).await;
        }

        spinner.finish_and_clear();
    })
}

/// Summarizes tracked transfers, e.g. `"[3/5] 1.2 MB received, 340 KB/s"`.
fn status_line(registry: &TransferRegistry, tracked: &[ItemId]) -> String {
    let mut busy = 0usize;
    let mut received = 0u64;
    let mut kbps = 0u64;
    for snapshot in tracked.iter().filter_map(|id| registry.snapshot(*id)) {
        if snapshot.busy {
            busy += 1;
            kbps = kbps.saturating_add(snapshot.throughput_kbps);
        }
        received = received.saturating_add(snapshot.received_bytes);
    }

    let total = tracked.len();
    let done = total.saturating_sub(busy);
    format!(
        "[{done}/{total}] {} received, {kbps} KB/s",
        format_size(usize::try_from(received).unwrap_or(usize::MAX))
    )
}
