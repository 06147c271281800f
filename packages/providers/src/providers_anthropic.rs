//! Anthropic Messages API adapter.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_CHAT_TIMEOUT, LlmProvider, ProviderError, RequestContext};

/// Credential-scope tag for this provider; also its `name()`.
pub const TAG: &str = "anthropic";

/// Anthropic Claude provider, configured with a server-side API key and
/// model but overridable per-request via [`RequestContext`].
pub struct AnthropicProvider {
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    #[must_use]
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [AnthropicMessage<'a>; 1],
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        TAG
    }

    fn is_available(&self, ctx: &RequestContext) -> bool {
        ctx.has_user_key(TAG) || self.api_key.is_some()
    }

    async fn complete(&self, prompt: &str, ctx: &RequestContext) -> Result<String, ProviderError> {
        let api_key = ctx
            .key_for(TAG, self.api_key.as_deref())
            .ok_or_else(|| ProviderError::Config {
                message: "no Anthropic API key configured".to_string(),
            })?
            .to_string();

        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: 4096,
            messages: [AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let call = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send();

        let resp = ctx
            .cancellation()
            .race(DEFAULT_CHAT_TIMEOUT, call)
            .await
            .ok_or(ProviderError::Timeout)??;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}: {body}"));
            return Err(ProviderError::Provider { message });
        }

        let response: AnthropicResponse = serde_json::from_str(&body)?;
        let text = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text),
                AnthropicContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}
