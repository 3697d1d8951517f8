//! Streaming variant of the Messages API.
//!
//! The API answers `stream: true` requests with Server-Sent Events. Only text deltas
//! are surfaced to callers; everything else (message_start, pings, block boundaries)
//! is skipped.

use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tracing::debug;

use super::{
    api_error_message, AnthropicErrorBody, AnthropicRequest, LlmClient, LlmError, Message,
    MAX_TOKENS, MODEL,
};

/// The subset of stream events we act on.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    MessageStop,
    Error { error: AnthropicErrorBody },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

/// What a single SSE frame means for the caller.
#[derive(Debug, PartialEq)]
enum Frame {
    Text(String),
    Stop,
    Skip,
}

/// Incremental SSE decoder. Bytes go in as they arrive; complete frames come out.
/// Bytes are buffered raw so a UTF-8 sequence split across chunks survives.
#[derive(Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, LlmError> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let raw: Vec<u8> = self.buffer.drain(..end + 2).collect();
            frames.push(parse_frame(&String::from_utf8_lossy(&raw))?);
        }
        Ok(frames)
    }
}

fn parse_frame(raw: &str) -> Result<Frame, LlmError> {
    let data: Vec<&str> = raw
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim_start)
        .collect();

    if data.is_empty() {
        return Ok(Frame::Skip);
    }

    match serde_json::from_str::<StreamEvent>(&data.join("\n"))? {
        StreamEvent::ContentBlockDelta {
            delta: Delta::TextDelta { text },
        } => Ok(Frame::Text(text)),
        StreamEvent::MessageStop => Ok(Frame::Stop),
        StreamEvent::Error { error } => Err(LlmError::Stream(error.message)),
        _ => Ok(Frame::Skip),
    }
}

impl LlmClient {
    /// Sends a conversation with `stream: true` and yields text chunks as they arrive.
    ///
    /// The stream is lazy: nothing is sent until it is first polled. It ends on
    /// `message_stop`; a connection that closes before that yields a final
    /// `LlmError::Stream`. Dropping it stops delivery. Streams are never retried.
    pub fn stream_messages(
        &self,
        system: String,
        messages: Vec<Message>,
        temperature: Option<f32>,
    ) -> impl Stream<Item = Result<String, LlmError>> + Send + 'static {
        let client = self.clone();

        async_stream::stream! {
            let request_body = AnthropicRequest {
                model: MODEL,
                max_tokens: MAX_TOKENS,
                system: &system,
                messages: &messages,
                temperature,
                stream: true,
            };

            let response = match client.post(&request_body).send().await {
                Ok(r) => r,
                Err(e) => {
                    yield Err(LlmError::Http(e));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                yield Err(LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
                return;
            }

            let mut decoder = SseDecoder::default();
            let mut bytes = response.bytes_stream();
            while let Some(chunk) = bytes.next().await {
                let frames = match chunk.map_err(LlmError::Http).and_then(|c| decoder.push(&c)) {
                    Ok(frames) => frames,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                for frame in frames {
                    match frame {
                        Frame::Text(text) => {
                            yield Ok(text);
                        }
                        Frame::Stop => {
                            debug!("LLM stream finished");
                            return;
                        }
                        Frame::Skip => {}
                    }
                }
            }
            yield Err(LlmError::Stream("stream closed before message_stop".to_string()));
        }
    }
}
