//! Push transport over a long-lived streamed HTTP response.
//!
//! The server keeps `GET {push_url}?userId=<id>` open and writes one JSON
//! frame per line, either bare (NDJSON) or as an SSE `data:` field:
//!
//! ```text
//! data: {"event":"orderAssigned","data":{"message":"...","referenceOrderId":42}}
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use reqwest::Client;
use reqwest::cookie::Jar;
use taller_core::config::ClientConfig;
use taller_core::push::{PushEvent, PushStream, PushTransport};
use taller_core::session::UserId;
use taller_core::{Result, TallerError};

pub struct HttpPushTransport {
    client: Client,
    url: String,
    jar: Arc<Jar>,
}

impl HttpPushTransport {
    /// Builds a transport for `config.push_url()` that sends the session
    /// cookies held in `jar` (normally [`HttpGateway::jar`](super::HttpGateway::jar)).
    ///
    /// Only the connect phase is bounded by the request timeout; the stream
    /// itself stays open until the server or `close` ends it.
    pub fn new(config: &ClientConfig, jar: Arc<Jar>) -> Result<Self> {
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .connect_timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TallerError::internal(format!("Failed to build push client: {e}")))?;
        Ok(Self {
            client,
            url: config.push_url(),
            jar,
        })
    }

    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }
}

#[async_trait]
impl PushTransport for HttpPushTransport {
    async fn connect(&self, identity_id: UserId) -> Result<PushStream> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("userId", identity_id)])
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| TallerError::push(format!("Failed to open push stream: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TallerError::push(format!(
                "Push registration for user {identity_id} rejected ({status})"
            )));
        }
        tracing::debug!("[HttpPushTransport] Registered user {}", identity_id);

        let events = response
            .bytes_stream()
            .scan(FrameDecoder::default(), |decoder, chunk| {
                let decoded = match chunk {
                    Ok(bytes) => decoder.feed(&bytes),
                    Err(e) => vec![Err(TallerError::network(format!(
                        "Push stream read failed: {e}"
                    )))],
                };
                future::ready(Some(stream::iter(decoded)))
            })
            .flatten()
            .boxed();
        Ok(events)
    }
}

/// Splits a byte stream into newline-terminated frames.
#[derive(Debug, Default)]
pub(crate) struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    /// Appends `chunk` and returns every frame it completed.
    pub(crate) fn feed(&mut self, chunk: &[u8]) -> Vec<Result<PushEvent>> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            if let Some(frame) = parse_frame(&line) {
                frames.push(frame);
            }
        }
        frames
    }
}

/// Parses one line; `None` for lines that carry no event.
pub(crate) fn parse_frame(line: &[u8]) -> Option<Result<PushEvent>> {
    let Ok(text) = std::str::from_utf8(line) else {
        return Some(Err(TallerError::push("push frame is not valid UTF-8")));
    };
    let text = text.trim();

    // SSE comments, keep-alives and non-data fields
    if text.is_empty() || text.starts_with(':') {
        return None;
    }
    let payload = match text.strip_prefix("data:") {
        Some(rest) => rest.trim_start(),
        None if is_sse_field(text) => return None,
        None => text,
    };
    Some(serde_json::from_str(payload).map_err(TallerError::from))
}

fn is_sse_field(text: &str) -> bool {
    ["event:", "id:", "retry:"]
        .iter()
        .any(|field| text.starts_with(field))
}
