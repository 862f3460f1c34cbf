//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use crate::config::LlmConfig;
use crate::error::{BallerError, Result};
use crate::llm::{LlmClient, LlmProvider, MockLlmClient, OpenAiClient, OpenAiConfig};

/// Creates an LLM client from the resolved LLM configuration.
///
/// The configuration is expected to already carry environment overrides
/// (see [`LlmConfig::apply_env`]). OpenAI requires an API key.
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    let provider: LlmProvider = config.provider.parse().map_err(BallerError::config)?;

    match provider {
        LlmProvider::OpenAi => {
            let key = config.api_key.clone().ok_or_else(|| {
                BallerError::config(
                    "No API key configured. Set OPENAI_API_KEY or [llm] api_key in the config file.",
                )
            })?;

            let mut openai = OpenAiConfig::new(key, &config.model).with_timeout(config.timeout_secs);
            if let Some(base_url) = &config.base_url {
                openai = openai.with_base_url(base_url);
            }

            Ok(Box::new(OpenAiClient::new(openai)?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}
