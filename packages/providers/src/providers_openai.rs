//! `OpenAI`-compatible chat-completions adapter.
//!
//! Also the base shape for any self-hosted server that speaks the same
//! `/v1/chat/completions` wire format; pass a custom `endpoint` to target
//! one instead of `api.openai.com`.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_CHAT_TIMEOUT, LlmProvider, ProviderError, RequestContext};

/// Credential-scope tag for the default `OpenAI` adapter.
pub const TAG: &str = "openai";

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// `OpenAI` (or `OpenAI`-compatible) chat-completions provider.
pub struct OpenAiProvider {
    tag: String,
    api_key: Option<String>,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    #[must_use]
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            tag: TAG.to_string(),
            api_key,
            model,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Builds an adapter against a non-default `OpenAI`-compatible endpoint,
    /// registered under its own credential-scope tag.
    #[must_use]
    pub fn with_endpoint(tag: String, api_key: Option<String>, model: String, endpoint: String) -> Self {
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
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: [OpenAiMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
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

        let request = OpenAiRequest {
            model: &self.model,
            messages: [OpenAiMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: 4096,
        };

        let call = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&api_key)
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
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}: {body}"));
            return Err(ProviderError::Provider { message });
        }

        let response: OpenAiResponse = serde_json::from_str(&body)?;
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(text)
    }
}
