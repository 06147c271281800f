#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! LLM provider abstraction.
//!
//! An adapter is a value implementing [`LlmProvider`]. Every operation the
//! pipeline needs from an LLM (generation, cross-validation, synthesis) goes
//! through the single [`LlmProvider::complete`] method; only the prompt text
//! and the caller's interpretation of the response differ between those
//! three use cases, so the trait does not repeat itself per use case.

pub mod cancellation;
pub mod context;
#[cfg(feature = "bedrock")]
pub mod providers_bedrock;
pub mod providers_anthropic;
pub mod providers_openai;
pub mod providers_streaming;
pub mod registry;

pub use cancellation::CancellationToken;
pub use context::RequestContext;
pub use providers_anthropic::AnthropicProvider;
pub use providers_openai::OpenAiProvider;
pub use providers_streaming::StreamingOpenAiProvider;
pub use registry::create_providers_from_env;

use thiserror::Error;

/// Errors an adapter can surface. Every variant is absorbed by the pipeline
/// into a failed `ProviderResult`; none of them propagate as a fatal
/// pipeline error.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response JSON could not be decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("provider returned an error: {message}")]
    Provider { message: String },

    #[error("call exceeded its timeout")]
    Timeout,

    #[error("call was cancelled")]
    Cancelled,

    #[error("provider is not configured: {message}")]
    Config { message: String },
}

/// Default timeout for a single non-streaming chat completion call.
pub const DEFAULT_CHAT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
/// Default timeout for a single streaming aggregation call.
pub const DEFAULT_STREAMING_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

/// An LLM provider adapter.
///
/// Implementations own their own `reqwest::Client` (or SDK client) and
/// whatever per-provider configuration (model name, endpoint, API key) they
/// need; none of that is visible to callers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stable identifier used in `metadata.providersUsed/providersFailed`
    /// and as the credential-scope lookup tag.
    fn name(&self) -> &str;

    /// Whether this adapter can currently be invoked, considering both
    /// process configuration and any per-request credential override.
    fn is_available(&self, ctx: &RequestContext) -> bool;

    /// Sends `prompt` as a single user-role message and returns the raw
    /// text of the model's reply. Callers are responsible for parsing that
    /// text as JSON via `vicinity_parser`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on any transport, timeout, cancellation,
    /// or upstream-reported failure. Never panics on malformed upstream
    /// JSON; that is the caller's concern via the response parser.
    async fn complete(&self, prompt: &str, ctx: &RequestContext) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_match_documented_defaults() {
        assert_eq!(DEFAULT_CHAT_TIMEOUT.as_secs(), 30);
        assert_eq!(DEFAULT_STREAMING_TIMEOUT.as_secs(), 120);
    }
}
