//! Query generation: natural-language question to one SQL statement.

use std::sync::Arc;
use std::time::Instant;

use crate::error::{BallerError, Result};
use crate::llm::parser::strip_code_fence;
use crate::llm::prompt::build_generation_request;
use crate::llm::LlmClient;

/// Default sampling temperature for generation.
pub const DEFAULT_GENERATION_TEMPERATURE: f32 = 0.0;

/// Turns a question into SQL using the fixed league schema.
///
/// Each call is a fresh request; no history is kept between questions.
pub struct QueryGenerator {
    client: Arc<dyn LlmClient>,
    temperature: f32,
}

impl QueryGenerator {
    /// Creates a generator at the default temperature.
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            temperature: DEFAULT_GENERATION_TEMPERATURE,
        }
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Generates one SQL statement for `question`.
    ///
    /// The response is trimmed and unwrapped from a surrounding code fence;
    /// nothing else is checked, so the statement may well be invalid SQL.
    pub async fn generate(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(BallerError::internal("Question must not be empty"));
        }

        let start = Instant::now();
        let request = build_generation_request(question, self.temperature);
        tracing::debug!(
            question_len = question.len(),
            temperature = self.temperature,
            "Requesting SQL generation"
        );

        let response = self.client.complete(&request).await?;
        let sql = strip_code_fence(&response);

        if sql != response.trim() {
            tracing::debug!("Removed code fence from generated SQL");
        }
        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            sql = %sql,
            "Generated SQL"
        );

        Ok(sql)
    }
}
