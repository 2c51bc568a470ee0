//! Transport seam between the fetch logic and the HTTP stack.
//!
//! Page scrapes and image transfers only need a GET with a streamed body,
//! the status code and the declared length. Keeping that behind a trait lets
//! the transfer engine be driven chunk by chunk in tests.

use std::fmt;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use url::Url;

use super::DownloadError;

/// Streamed response body: byte chunks in arrival order.
pub type BodyStream = BoxStream<'static, Result<Vec<u8>, DownloadError>>;

/// Response head plus streamed body returned by a [`Transport`].
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Declared `Content-Length`, if the server sent one.
    pub content_length: Option<u64>,
    /// Body chunks.
    pub body: BodyStream,
}

impl TransportResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Buffers the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by the body stream.
    pub async fn collect_body(self) -> Result<Vec<u8>, DownloadError> {
        self.body
            .try_fold(Vec::new(), |mut buffer, chunk| async move {
                buffer.extend_from_slice(&chunk);
                Ok(buffer)
            })
            .await
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Issues GET requests and streams response bodies.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends a GET request for `url` and returns once response headers arrive.
    ///
    /// Non-success statuses are returned as responses, not errors; callers
    /// decide how to treat them.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] when the request cannot be sent or times out
    /// before headers arrive.
    async fn get(&self, url: &Url) -> Result<TransportResponse, DownloadError>;
}

/// Wraps an in-memory body as a single-chunk stream.
#[must_use]
pub fn body_from_bytes(bytes: Vec<u8>) -> BodyStream {
    futures_util::stream::once(async move { Ok(bytes) }).boxed()
}
