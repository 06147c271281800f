//! Builds the set of provider adapters available to a process from its
//! environment.
//!
//! Unlike a single-provider factory, [`create_providers_from_env`] returns
//! every adapter whose process configuration is present; which ones are
//! actually used for a given request is decided later by
//! `LlmProvider::is_available` against that request's credential scope.

use crate::{AnthropicProvider, LlmProvider, OpenAiProvider, StreamingOpenAiProvider};

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Reads `VICINITY_ANTHROPIC_*` / `VICINITY_OPENAI_*` / `VICINITY_STREAM_*`
/// environment variables and constructs an adapter for each provider that
/// has at least a model configured. A provider with no API key is still
/// constructed (so a per-request `userApiKeys` override can activate it
/// later); it simply reports `is_available = false` until then.
#[must_use]
pub fn create_providers_from_env() -> Vec<Box<dyn LlmProvider>> {
    let mut providers: Vec<Box<dyn LlmProvider>> = Vec::new();

    let anthropic_model = env("VICINITY_ANTHROPIC_MODEL").unwrap_or_else(|| "claude-sonnet-4-20250514".to_string());
    providers.push(Box::new(AnthropicProvider::new(
        env("VICINITY_ANTHROPIC_API_KEY"),
        anthropic_model,
    )));

    let openai_model = env("VICINITY_OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string());
    providers.push(Box::new(OpenAiProvider::new(env("VICINITY_OPENAI_API_KEY"), openai_model)));

    if let Some(endpoint) = env("VICINITY_STREAM_ENDPOINT") {
        let model = env("VICINITY_STREAM_MODEL").unwrap_or_else(|| "default".to_string());
        providers.push(Box::new(StreamingOpenAiProvider::new(
            "stream".to_string(),
            env("VICINITY_STREAM_API_KEY"),
            model,
            endpoint,
        )));
    }

    #[cfg(feature = "bedrock")]
    if let Some(model_id) = env("VICINITY_BEDROCK_MODEL_ID") {
        // Bedrock construction is async (it loads AWS config), so it cannot
        // be built inside this synchronous factory; callers opt in by
        // pushing it themselves once they are inside an async context.
        log::debug!("VICINITY_BEDROCK_MODEL_ID={model_id} set; construct BedrockProvider::new(...) separately");
    }

    providers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_registers_anthropic_and_openai_adapters() {
        let providers = create_providers_from_env();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert!(names.contains(&"anthropic"));
        assert!(names.contains(&"openai"));
    }
}
