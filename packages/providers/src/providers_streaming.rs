//! Streaming aggregator for `OpenAI`-compatible servers that emit
//! server-sent events instead of a single JSON body.
//!
//! Reads `data: {...}` lines until the literal sentinel `data: [DONE]`,
//! accumulating `delta.content` and `delta.text` into one buffer and
//! `delta.reasoning_content`/`delta.reasoning` into a second. If the
//! content buffer is empty once the stream ends, the reasoning buffer is
//! used instead — some reasoning models only ever populate the reasoning
//! field and put the final JSON answer there.

use futures::StreamExt as _;
use serde::Serialize;
use serde_json::Value;

use crate::{DEFAULT_STREAMING_TIMEOUT, LlmProvider, ProviderError, RequestContext};

const DONE_SENTINEL: &str = "[DONE]";

/// Streaming chat-completions provider.
pub struct StreamingOpenAiProvider {
    tag: String,
    api_key: Option<String>,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl StreamingOpenAiProvider {
    #[must_use]
    pub fn new(tag: String, api_key: Option<String>, model: String, endpoint: String) -> Self {
        Self {
            tag,
            api_key,
            model,
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct StreamingRequest<'a> {
    model: &'a str,
    messages: [StreamingMessage<'a>; 1],
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct StreamingMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[async_trait::async_trait]
impl LlmProvider for StreamingOpenAiProvider {
    fn name(&self) -> &str {
        &self.tag
    }

    fn is_available(&self, ctx: &RequestContext) -> bool {
        ctx.has_user_key(&self.tag) || self.api_key.is_some()
    }

    async fn complete(&self, prompt: &str, ctx: &RequestContext) -> Result<String, ProviderError> {
        let api_key = ctx
            .key_for(&self.tag, self.api_key.as_deref())
            .ok_or_else(|| ProviderError::Config {
                message: format!("no API key configured for provider '{}'", self.tag),
            })?
            .to_string();

        let request = StreamingRequest {
            model: &self.model,
            messages: [StreamingMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: 4096,
            stream: true,
        };

        let call = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&api_key)
            .json(&request)
            .send();

        let resp = ctx
            .cancellation()
            .race(DEFAULT_STREAMING_TIMEOUT, call)
            .await
            .ok_or(ProviderError::Timeout)??;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Provider {
                message: format!("HTTP {status}: {body}"),
            });
        }

        let mut content = String::new();
        let mut reasoning = String::new();
        let mut leftover = String::new();
        let mut stream = resp.bytes_stream();

        'stream: while let Some(chunk) = ctx
            .cancellation()
            .race(DEFAULT_STREAMING_TIMEOUT, stream.next())
            .await
            .ok_or(ProviderError::Timeout)?
        {
            let bytes = chunk?;
            leftover.push_str(&String::from_utf8_lossy(&bytes));

            while let Some(newline_pos) = leftover.find('\n') {
                let line = leftover[..newline_pos].trim_end_matches('\r').to_string();
                leftover.drain(..=newline_pos);

                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();

                if data == DONE_SENTINEL {
                    break 'stream;
                }
                if data.is_empty() {
                    continue;
                }

                let Ok(frame) = serde_json::from_str::<Value>(data) else {
                    continue;
                };
                let delta = &frame["choices"][0]["delta"];

                if let Some(text) = delta["content"].as_str() {
                    content.push_str(text);
                }
                if let Some(text) = delta["text"].as_str() {
                    content.push_str(text);
                }
                if let Some(text) = delta["reasoning_content"].as_str() {
                    reasoning.push_str(text);
                }
                if let Some(text) = delta["reasoning"].as_str() {
                    reasoning.push_str(text);
                }
            }
        }

        if content.is_empty() {
            Ok(reasoning)
        } else {
            Ok(content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_frame(content: &mut String, reasoning: &mut String, data: &str) {
        let frame: Value = serde_json::from_str(data).unwrap();
        let delta = &frame["choices"][0]["delta"];
        if let Some(text) = delta["content"].as_str() {
            content.push_str(text);
        }
        if let Some(text) = delta["reasoning"].as_str() {
            reasoning.push_str(text);
        }
    }

    #[test]
    fn falls_back_to_reasoning_when_content_is_empty() {
        let mut content = String::new();
        let mut reasoning = String::new();
        apply_frame(
            &mut content,
            &mut reasoning,
            r#"{"choices":[{"delta":{"reasoning":"{\"recommendations\":[]}"}}]}"#,
        );

        let result = if content.is_empty() { reasoning } else { content };
        assert_eq!(result, r#"{"recommendations":[]}"#);
    }
}
