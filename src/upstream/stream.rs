//! Retrying NDJSON stream calls.
//!
//! # State Transitions
//! ```text
//! Connect(attempt) → Streaming(attempt) → Done
//!        ↑                  │
//!        └── retryable failure, attempts left (restart from the start)
//! ```
//! A non-retryable failure, or a retryable one with no attempts left, is
//! yielded once and ends the stream.

use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;

use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::upstream::classify::{check_status, decode, server_error};
use crate::upstream::error::{UpstreamError, UpstreamOutcome};
use crate::upstream::request::UpstreamRequest;

type ByteStream = BoxStream<'static, reqwest::Result<Bytes>>;

enum State {
    Connect { attempt: u32 },
    Streaming { attempt: u32, body: ByteStream, lines: LineBuffer },
    Done,
}

struct Call {
    http: reqwest::Client,
    request: UpstreamRequest,
    policy: RetryPolicy,
}

impl Call {
    async fn connect(&self) -> Result<ByteStream, UpstreamError> {
        let dependency = &self.request.dependency;
        let response = self
            .http
            .get(self.request.url())
            .send()
            .await
            .map_err(|e| server_error(dependency, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            check_status(&self.request, status, &body)?;
            return Err(server_error(dependency, format_args!("answered with status {}", status)));
        }
        Ok(response.bytes_stream().boxed())
    }

    /// Next state after `error` on `attempt`, or the error to yield.
    async fn recover(&self, attempt: u32, error: UpstreamError) -> Result<State, UpstreamError> {
        let name = &self.request.dependency.name;
        if !self.policy.should_retry(attempt, &error) {
            tracing::warn!(dependency = %name, attempt, error = %error, "Upstream stream failed");
            return Err(error);
        }
        let delay = self.policy.delay(attempt);
        tracing::info!(dependency = %name, attempt, delay = ?delay, error = %error, "Restarting upstream stream");
        metrics::record_retry(name);
        tokio::time::sleep(delay).await;
        Ok(State::Connect { attempt: attempt + 1 })
    }
}

pub(crate) fn retrying_stream<T>(
    http: reqwest::Client,
    request: UpstreamRequest,
    policy: RetryPolicy,
) -> BoxStream<'static, UpstreamOutcome<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let call = Call { http, request, policy };
    stream::unfold((call, State::Connect { attempt: 1 }), |(call, mut state)| async move {
        loop {
            let failure = match state {
                State::Done => return None,
                State::Connect { attempt } => match call.connect().await {
                    Ok(body) => {
                        state = State::Streaming {
                            attempt,
                            body,
                            lines: LineBuffer::default(),
                        };
                        continue;
                    }
                    Err(error) => (attempt, error),
                },
                State::Streaming {
                    attempt,
                    mut body,
                    mut lines,
                } => {
                    if let Some(line) = lines.next_line() {
                        match decode::<T>(&call.request.dependency, &line) {
                            Ok(item) => {
                                let next = State::Streaming { attempt, body, lines };
                                return Some((Ok(item), (call, next)));
                            }
                            Err(error) => (attempt, error),
                        }
                    } else {
                        match body.next().await {
                            Some(Ok(chunk)) => {
                                lines.extend(&chunk);
                                state = State::Streaming { attempt, body, lines };
                                continue;
                            }
                            Some(Err(e)) => (attempt, server_error(&call.request.dependency, e)),
                            None => match lines.finish() {
                                Some(line) => match decode::<T>(&call.request.dependency, &line) {
                                    Ok(item) => return Some((Ok(item), (call, State::Done))),
                                    Err(error) => (attempt, error),
                                },
                                None => return None,
                            },
                        }
                    }
                }
            };

            let (attempt, error) = failure;
            match call.recover(attempt, error).await {
                Ok(next) => state = next,
                Err(error) => return Some((Err(error), (call, State::Done))),
            }
        }
    })
    .boxed()
}

/// Splits a byte stream into non-empty lines.
#[derive(Debug, Default)]
struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<String> {
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }

    /// Trailing data without a final newline.
    fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.buf);
        let line = String::from_utf8_lossy(&raw).trim().to_string();
        (!line.is_empty()).then_some(line)
    }
}
