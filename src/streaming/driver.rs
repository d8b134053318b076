//! Streaming sequence driver
//!
//! [`ChunkStream`] is a pull-based state machine: every `poll_next` first
//! checks the cancel signal, then reads at most as many lines as it takes to
//! produce one chunk or reach a terminal state.
//!
//! ```text
//! Streaming ──[DONE] / body end──▶ Done
//!     │  ├────cancel signal──────▶ Cancelled
//!     │  └─decode / read error───▶ Failed
//!     └─chunk──▶ Streaming
//! ```
//!
//! The body is released exactly once, on whichever terminal transition
//! happens first. Dropping the stream releases it as well.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{FusedStream, Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use tokio_util::sync::WaitForCancellationFutureOwned;

use super::cancel::CancelHandle;
use super::decode::decode_chunk;
use super::sse::{extract_payload, is_done_sentinel};
use crate::error::LlmError;
use crate::types::{ChatChunk, ChatMessage, ChatMessageAccumulator, CompletionChunk};

/// Raw body lines, without line terminators.
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

type Decoder<T> = fn(&str) -> Result<T, LlmError>;

pub type ChatStream = ChunkStream<ChatChunk>;
pub type CompletionStream = ChunkStream<CompletionChunk>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Reading lines; more chunks may follow.
    Streaming,
    /// The server sent the sentinel or closed the body.
    Done,
    /// The cancel signal fired.
    Cancelled,
    /// A read or decode error was returned to the caller.
    Failed,
}

impl StreamState {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Streaming)
    }
}

/// Split a response body into lines.
///
/// Lines may span any number of network reads, and `\r\n` endings are
/// handled. A final line without a terminator is still delivered. A line
/// longer than `max_line_length` bytes ends the source with a
/// `StreamError`.
pub fn response_lines(response: reqwest::Response, max_line_length: usize) -> LineStream {
    let bytes = response
        .bytes_stream()
        .map(|chunk| chunk.map_err(std::io::Error::other));
    let lines = FramedRead::new(
        StreamReader::new(bytes),
        LinesCodec::new_with_max_length(max_line_length),
    );
    Box::pin(lines.map(|line| line.map_err(LlmError::from)))
}

/// Lazy, single-pass, cancellable sequence of decoded chunks.
pub struct ChunkStream<T> {
    lines: Option<LineStream>,
    decode: Decoder<T>,
    cancel: CancelHandle,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    state: StreamState,
    emitted: usize,
}

impl<T: DeserializeOwned> ChunkStream<T> {
    /// Drive an arbitrary line source, decoding payloads as `T`.
    pub fn from_lines<S>(lines: S, cancel: CancelHandle) -> Self
    where
        S: Stream<Item = Result<String, LlmError>> + Send + 'static,
    {
        Self::with_decoder(lines, decode_chunk::<T>, cancel)
    }

    pub fn from_response(
        response: reqwest::Response,
        max_line_length: usize,
        cancel: CancelHandle,
    ) -> Self {
        Self::with_decoder(
            response_lines(response, max_line_length),
            decode_chunk::<T>,
            cancel,
        )
    }
}

impl<T> ChunkStream<T> {
    pub fn with_decoder<S>(lines: S, decode: Decoder<T>, cancel: CancelHandle) -> Self
    where
        S: Stream<Item = Result<String, LlmError>> + Send + 'static,
    {
        let cancelled = Box::pin(cancel.cancelled_owned());
        Self {
            lines: Some(Box::pin(lines)),
            decode,
            cancel,
            cancelled,
            state: StreamState::Streaming,
            emitted: 0,
        }
    }

    /// A stream whose call was cancelled before the body was opened.
    pub(crate) fn already_cancelled(decode: Decoder<T>, cancel: CancelHandle) -> Self {
        let cancelled = Box::pin(cancel.cancelled_owned());
        Self {
            lines: None,
            decode,
            cancel,
            cancelled,
            state: StreamState::Cancelled,
            emitted: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Number of chunks handed to the caller so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// The signal this stream observes.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Cancel and release the connection now, without waiting for the next
    /// poll. No-op once the stream is terminal.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if !self.state.is_terminal() {
            self.finish(StreamState::Cancelled);
        }
    }

    fn finish(&mut self, state: StreamState) {
        self.state = state;
        tracing::debug!(?state, emitted = self.emitted, "stream finished");
        self.release();
    }

    /// Drop the body. Safe to call any number of times.
    fn release(&mut self) {
        if self.lines.take().is_some() {
            tracing::debug!("stream released");
        }
    }
}

impl<T> Stream for ChunkStream<T> {
    type Item = Result<T, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.state.is_terminal() {
                return Poll::Ready(None);
            }
            if this.cancelled.as_mut().poll(cx).is_ready() {
                this.finish(StreamState::Cancelled);
                return Poll::Ready(None);
            }
            let Some(lines) = this.lines.as_mut() else {
                this.finish(StreamState::Done);
                return Poll::Ready(None);
            };

            let line = match lines.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    this.finish(StreamState::Done);
                    return Poll::Ready(None);
                }
                Poll::Ready(Some(Err(e))) => {
                    tracing::warn!(error = %e, "stream read failed");
                    this.finish(StreamState::Failed);
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(Some(Ok(line))) => line,
            };

            let payload = extract_payload(&line);
            if payload.is_empty() {
                continue;
            }
            tracing::trace!(payload, "sse payload");
            if is_done_sentinel(payload) {
                this.finish(StreamState::Done);
                return Poll::Ready(None);
            }

            match (this.decode)(payload) {
                Ok(chunk) => {
                    this.emitted += 1;
                    return Poll::Ready(Some(Ok(chunk)));
                }
                Err(e) => {
                    tracing::warn!(payload_len = payload.len(), "failed to decode sse payload");
                    this.finish(StreamState::Failed);
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }
    }
}

impl<T> FusedStream for ChunkStream<T> {
    fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }
}

impl<T> fmt::Debug for ChunkStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkStream")
            .field("state", &self.state)
            .field("emitted", &self.emitted)
            .field("body_open", &self.lines.is_some())
            .finish()
    }
}

impl ChunkStream<ChatChunk> {
    /// Drain the stream into the message of choice 0.
    ///
    /// A cancelled stream yields whatever was received before cancelling.
    pub async fn collect_message(mut self) -> Result<ChatMessage, LlmError> {
        let mut acc = ChatMessageAccumulator::new();
        while let Some(chunk) = self.next().await {
            acc.push(&chunk?);
        }
        Ok(acc.into_message())
    }
}

impl ChunkStream<CompletionChunk> {
    /// Drain the stream, concatenating the text of choice 0.
    pub async fn collect_text(mut self) -> Result<String, LlmError> {
        let mut text = String::new();
        while let Some(chunk) = self.next().await {
            if let Some(fragment) = chunk?.text() {
                text.push_str(fragment);
            }
        }
        Ok(text)
    }
}
