//! Result narration: explains an executed result set in plain language.

use std::sync::Arc;
use std::time::Instant;

use crate::db::QueryResult;
use crate::error::Result;
use crate::llm::prompt::build_narration_request;
use crate::llm::LlmClient;

/// Default sampling temperature for narration.
pub const DEFAULT_NARRATION_TEMPERATURE: f32 = 0.7;

/// Asks the model to explain query results.
pub struct ResultNarrator {
    client: Arc<dyn LlmClient>,
    temperature: f32,
}

impl ResultNarrator {
    /// Creates a narrator at the default temperature.
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            temperature: DEFAULT_NARRATION_TEMPERATURE,
        }
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns a trimmed explanation of `result` for display.
    pub async fn narrate(&self, question: &str, sql: &str, result: &QueryResult) -> Result<String> {
        let start = Instant::now();
        let request = build_narration_request(question, sql, result, self.temperature);
        tracing::debug!(
            rows = result.row_count,
            temperature = self.temperature,
            "Requesting result narration"
        );

        let explanation = self.client.complete(&request).await?.trim().to_string();

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            explanation_len = explanation.len(),
            "Narrated results"
        );
        Ok(explanation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ColumnInfo, Value};
    use crate::error::BallerError;
    use crate::llm::MockLlmClient;

    #[tokio::test]
    async fn test_narrate_empty_result() {
        let mock = MockLlmClient::new();
        let narrator = ResultNarrator::new(Arc::new(mock.clone()));
        let result = QueryResult::with_data(vec![ColumnInfo::new("TeamName", "VARCHAR")], vec![]);

        narrator
            .narrate("Tell me about the Lakers", "SELECT * FROM Team WHERE TeamName LIKE '%Lakers%'", &result)
            .await
            .unwrap();

        let requests = mock.narration_requests();
        assert_eq!(requests.len(), 1);
        let prompt = requests[0].user_input();
        assert!(prompt.contains("No results found"));
        assert!(!prompt.contains("Columns:"));
        assert!(!prompt.contains("Rows:"));
        assert_eq!(requests[0].temperature, 0.7);
    }

    #[tokio::test]
    async fn test_narrate_trims_response() {
        let mock = MockLlmClient::new().with_narration("\n  There are three teams.  \n");
        let narrator = ResultNarrator::new(Arc::new(mock));
        let result = QueryResult::with_data(
            vec![ColumnInfo::new("n", "BIGINT")],
            vec![vec![Value::Int(3)]],
        );

        let explanation = narrator
            .narrate("How many teams?", "SELECT COUNT(*) AS n FROM Team", &result)
            .await
            .unwrap();

        assert_eq!(explanation, "There are three teams.");
    }

    #[tokio::test]
    async fn test_narrate_error() {
        let mock = MockLlmClient::new().with_narration_error("Rate limited");
        let narrator = ResultNarrator::new(Arc::new(mock));

        let err = narrator
            .narrate("q", "SELECT 1", &QueryResult::new())
            .await
            .unwrap_err();

        assert!(matches!(err, BallerError::Llm(_)));
    }
}
