//! AWS Bedrock Converse API adapter, gated behind the `bedrock` feature.
//!
//! Authentication uses the standard AWS credential chain (env vars, IAM
//! role, `~/.aws/credentials`); there is no per-request credential-scope
//! override for Bedrock since AWS credentials are not an API key string.

use aws_sdk_bedrockruntime::types::{ContentBlock as BedrockContent, ConversationRole, Message as BedrockMessage};

use crate::{LlmProvider, ProviderError, RequestContext};

pub const TAG: &str = "bedrock";

/// Bedrock Converse API provider.
pub struct BedrockProvider {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockProvider {
    /// Loads AWS configuration from the environment (region, credentials).
    /// `model_id` is a Bedrock model id such as
    /// `us.anthropic.claude-sonnet-4-20250514-v1:0`.
    pub async fn new(model_id: String, region: Option<String>) -> Self {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            config_loader = config_loader.region(aws_config::Region::new(region));
        }
        let config = config_loader.load().await;
        let client = aws_sdk_bedrockruntime::Client::new(&config);
        Self { client, model_id }
    }
}

#[async_trait::async_trait]
impl LlmProvider for BedrockProvider {
    fn name(&self) -> &str {
        TAG
    }

    fn is_available(&self, _ctx: &RequestContext) -> bool {
        true
    }

    async fn complete(&self, prompt: &str, ctx: &RequestContext) -> Result<String, ProviderError> {
        let message = BedrockMessage::builder()
            .role(ConversationRole::User)
            .content(BedrockContent::Text(prompt.to_string()))
            .build()
            .map_err(|e| ProviderError::Provider {
                message: format!("failed to build Bedrock message: {e}"),
            })?;

        let call = self
            .client
            .converse()
            .model_id(&self.model_id)
            .messages(message)
            .send();

        let response = ctx
            .cancellation()
            .race(crate::DEFAULT_CHAT_TIMEOUT, call)
            .await
            .ok_or(ProviderError::Timeout)?
            .map_err(|e| ProviderError::Provider {
                message: format!("Bedrock Converse error: {e}"),
            })?;

        let output = response.output().ok_or_else(|| ProviderError::Provider {
            message: "no output in Bedrock response".to_string(),
        })?;

        let aws_sdk_bedrockruntime::types::ConverseOutput::Message(response_msg) = output else {
            return Err(ProviderError::Provider {
                message: "unexpected Bedrock output variant".to_string(),
            });
        };

        let text = response_msg
            .content()
            .iter()
            .filter_map(|block| match block {
                BedrockContent::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}
