//! In-process [`Transport`] whose responses are scripted per URL.
//!
//! Each call to [`ScriptedTransport::script`] queues one response for a URL and
//! returns a [`ScriptedBody`] that feeds its chunks. Unscripted GETs answer 404
//! with an empty body.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use url::Url;

use crate::download::{
    BodyStream, DownloadError, Transport, TransportResponse, body_from_bytes,
};

enum Scripted {
    Response {
        status: u16,
        content_length: Option<u64>,
        body: BodyStream,
    },
    Error(DownloadError),
}

/// Transport double driven by the test.
#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<HashMap<String, usize>>,
}

/// Feeds body chunks to one scripted response.
pub struct ScriptedBody {
    url: String,
    tx: mpsc::Sender<Result<Vec<u8>, DownloadError>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a streamed response; chunks arrive when the test sends them.
    pub fn script(&self, url: &str, status: u16, content_length: Option<u64>) -> ScriptedBody {
        let (tx, rx) = mpsc::channel(16);
        let body = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed();
        self.push(
            url,
            Scripted::Response {
                status,
                content_length,
                body,
            },
        );
        ScriptedBody {
            url: url.to_string(),
            tx,
        }
    }

    /// Queues a complete response with a declared length.
    pub fn respond(&self, url: &str, status: u16, bytes: &[u8]) {
        self.push(
            url,
            Scripted::Response {
                status,
                content_length: Some(bytes.len() as u64),
                body: body_from_bytes(bytes.to_vec()),
            },
        );
    }

    /// Queues a request-level failure.
    pub fn fail(&self, url: &str, error: DownloadError) {
        self.push(url, Scripted::Error(error));
    }

    /// Number of GETs issued for `url` so far.
    pub fn get_count(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    fn push(&self, url: &str, scripted: Scripted) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(url.to_string())
            .or_default()
            .push_back(scripted);
    }
}

impl fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, DownloadError> {
        let key = url.as_str().to_string();
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default() += 1;

        let next = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Response {
                status,
                content_length,
                body,
            }) => Ok(TransportResponse {
                status,
                content_length,
                body,
            }),
            Some(Scripted::Error(error)) => Err(error),
            None => Ok(TransportResponse {
                status: 404,
                content_length: Some(0),
                body: body_from_bytes(Vec::new()),
            }),
        }
    }
}

impl ScriptedBody {
    /// Delivers one chunk. Ignored if the transfer already stopped reading.
    pub async fn send_chunk(&self, bytes: &[u8]) {
        let _ = self.tx.send(Ok(bytes.to_vec())).await;
    }

    /// Makes the body stream fail with `reason`.
    pub async fn fail(&self, reason: &str) {
        let _ = self
            .tx
            .send(Err(DownloadError::interrupted(self.url.clone(), reason)))
            .await;
    }

    /// Ends the body stream.
    pub fn finish(self) {}
}
