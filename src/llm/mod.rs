//! LLM integration for BallerSQL.
//!
//! Provides the completion client trait, its implementations, and the two
//! pipeline stages built on it: the query generator and the result narrator.

pub mod factory;
pub mod generator;
pub mod mock;
pub mod narrator;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod types;

pub use factory::create_client;
pub use generator::QueryGenerator;
pub use mock::MockLlmClient;
pub use narrator::ResultNarrator;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use parser::strip_code_fence;
pub use types::{CompletionRequest, Message, Role};

use async_trait::async_trait;
use std::str::FromStr;

use crate::error::Result;

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends one completion request and returns the top choice's text.
    ///
    /// Makes exactly one attempt; failures are returned, never retried.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// OpenAI Chat Completions (or a compatible endpoint)
    #[default]
    OpenAi,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
