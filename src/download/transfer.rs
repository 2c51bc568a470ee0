//! Transfer engine: one streaming GET with progress telemetry.
//!
//! A transfer runs in its own Tokio task. It publishes [`TransferEvent::Progress`]
//! snapshots while the body streams in and ends with exactly one
//! [`TransferEvent::Finished`] carrying either the full payload or the error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::constants::{CANCEL_POLL_INTERVAL, MAX_PREALLOCATION_BYTES};
use super::handle::{ProgressSnapshot, TransferHandle};
use super::transport::Transport;
use super::DownloadError;

/// One event of a transfer's lifecycle.
#[derive(Debug)]
pub enum TransferEvent {
    /// A body chunk arrived. Byte counts never decrease within a transfer.
    Progress(ProgressSnapshot),
    /// Terminal outcome; always the last event.
    Finished(Result<Vec<u8>, DownloadError>),
}

/// Receiving side of one transfer's events.
///
/// Progress snapshots are best effort: if the subscriber falls behind, some are
/// dropped (the handle still holds the latest state). The terminal event is
/// always delivered while the subscription is alive.
#[derive(Debug)]
pub struct TransferSubscription {
    url: Url,
    events: mpsc::Receiver<TransferEvent>,
}

impl TransferSubscription {
    pub(crate) fn new(url: Url, events: mpsc::Receiver<TransferEvent>) -> Self {
        Self { url, events }
    }

    /// The URL being transferred.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Waits for the next event. Returns `None` after the terminal event.
    pub async fn next_event(&mut self) -> Option<TransferEvent> {
        self.events.recv().await
    }

    /// Skips progress events and returns the terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns the transfer's error, or [`DownloadError::Interrupted`] if the
    /// engine task went away without reporting an outcome.
    pub async fn finish(mut self) -> Result<Vec<u8>, DownloadError> {
        while let Some(event) = self.events.recv().await {
            if let TransferEvent::Finished(outcome) = event {
                return outcome;
            }
        }
        Err(DownloadError::interrupted(
            self.url.as_str(),
            "transfer task ended without an outcome",
        ))
    }
}

/// Drives one transfer to completion and reports the terminal event.
#[instrument(skip_all, fields(item = %handle.id(), url = %url))]
pub(crate) async fn run_transfer(
    transport: Arc<dyn Transport>,
    handle: Arc<TransferHandle>,
    url: Url,
    cancel: Arc<AtomicBool>,
    events: mpsc::Sender<TransferEvent>,
) {
    debug!("transfer started");
    let outcome = stream_body(transport.as_ref(), &handle, &url, &cancel, &events).await;

    match &outcome {
        Ok(bytes) => info!(bytes = bytes.len(), "transfer complete"),
        Err(e) if e.is_cancelled() => debug!("transfer cancelled"),
        Err(e) => warn!(error = %e, "transfer failed"),
    }

    handle.finish(outcome.is_err());

    if events.send(TransferEvent::Finished(outcome)).await.is_err() {
        debug!("subscriber dropped before terminal event");
    }
}

async fn stream_body(
    transport: &dyn Transport,
    handle: &TransferHandle,
    url: &Url,
    cancel: &AtomicBool,
    events: &mpsc::Sender<TransferEvent>,
) -> Result<Vec<u8>, DownloadError> {
    // Cancellation is raced against each await so a stalled peer cannot pin the task.
    let response = tokio::select! {
        biased;
        () = cancelled(cancel) => return Err(DownloadError::cancelled(url.as_str())),
        response = transport.get(url) => response?,
    };
    if !response.is_success() {
        return Err(DownloadError::http_status(url.as_str(), response.status));
    }

    let expected = response.content_length.unwrap_or(0);
    handle.record_headers(expected);

    let capacity = usize::try_from(expected.min(MAX_PREALLOCATION_BYTES)).unwrap_or(0);
    let mut buffer = Vec::with_capacity(capacity);
    let mut body = response.body;

    loop {
        let next = tokio::select! {
            biased;
            () = cancelled(cancel) => return Err(DownloadError::cancelled(url.as_str())),
            next = body.next() => next,
        };
        let Some(chunk) = next else {
            break;
        };
        let chunk = chunk?;
        if cancel.load(Ordering::SeqCst) {
            return Err(DownloadError::cancelled(url.as_str()));
        }

        buffer.extend_from_slice(&chunk);
        let snapshot = handle.record_chunk(chunk.len() as u64, Instant::now());
        // Progress is lossy; observers can always read the handle.
        let _ = events.try_send(TransferEvent::Progress(snapshot));
    }

    Ok(buffer)
}

/// Resolves once `flag` is set.
async fn cancelled(flag: &AtomicBool) {
    while !flag.load(Ordering::SeqCst) {
        tokio::time::sleep(CANCEL_POLL_INTERVAL).await;
    }
}
