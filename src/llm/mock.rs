//! Mock LLM client for testing.
//!
//! Provides deterministic responses based on input patterns and records every
//! request it receives.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{BallerError, Result};
use crate::llm::prompt::{NARRATION_SYSTEM_PROMPT, NO_RESULTS};
use crate::llm::types::CompletionRequest;
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Generation requests are answered with SQL for the league schema; narration
/// requests (recognized by their system prompt) get a plain summary of the
/// listed rows. Clones share the request log.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom generation mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// Fixed narration response.
    narration: Option<String>,
    generation_error: Option<String>,
    narration_error: Option<String>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom generation response.
    ///
    /// When the question contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Returns `response` for every narration request.
    pub fn with_narration(mut self, response: impl Into<String>) -> Self {
        self.narration = Some(response.into());
        self
    }

    /// Fails every generation request with `message`.
    pub fn with_generation_error(mut self, message: impl Into<String>) -> Self {
        self.generation_error = Some(message.into());
        self
    }

    /// Fails every narration request with `message`.
    pub fn with_narration_error(mut self, message: impl Into<String>) -> Self {
        self.narration_error = Some(message.into());
        self
    }

    /// Returns every request received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Returns the narration requests received so far.
    pub fn narration_requests(&self) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(Self::is_narration)
            .collect()
    }

    /// Returns the generation requests received so far.
    pub fn generation_requests(&self) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(|r| !Self::is_narration(r))
            .collect()
    }

    fn is_narration(request: &CompletionRequest) -> bool {
        request.system_prompt() == Some(NARRATION_SYSTEM_PROMPT)
    }

    /// Generates SQL for a question.
    fn mock_sql(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        // Check custom responses first
        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        if input_lower.contains("coach") {
            return "SELECT p.FirstName, p.LastName, t.TeamName, c.Role FROM Coach c \
                    JOIN Person p ON c.CoachID = p.PersonID \
                    JOIN Team t ON c.TeamID = t.TeamID;"
                .to_string();
        }

        if input_lower.contains("tallest") {
            return "SELECT p.FirstName, p.LastName, p.HeightCM FROM Player pl \
                    JOIN Person p ON pl.PlayerID = p.PersonID \
                    ORDER BY p.HeightCM DESC LIMIT 1;"
                .to_string();
        }

        if input_lower.contains("game") || input_lower.contains("score") {
            return "SELECT g.GameDate, h.TeamName AS HomeTeam, a.TeamName AS AwayTeam, \
                    g.HomeScore, g.AwayScore FROM Game g \
                    JOIN Team h ON g.HomeTeamID = h.TeamID \
                    JOIN Team a ON g.AwayTeamID = a.TeamID \
                    ORDER BY g.GameDate;"
                .to_string();
        }

        if input_lower.contains("player") {
            return "SELECT p.FirstName, p.LastName, pl.JerseyNumber, pl.Position FROM Player pl \
                    JOIN Person p ON pl.PlayerID = p.PersonID;"
                .to_string();
        }

        if input_lower.contains("team") {
            return "SELECT TeamName, City, HomeArena FROM Team;".to_string();
        }

        "I don't understand that question. Could you please rephrase it?".to_string()
    }

    /// Summarizes the rows listed in a narration prompt.
    fn mock_narration(&self, input: &str) -> String {
        if let Some(narration) = &self.narration {
            return narration.clone();
        }

        if input.contains(NO_RESULTS) {
            return "I couldn't find anything matching your question.".to_string();
        }

        let rows: Vec<&str> = input
            .lines()
            .filter_map(|line| line.strip_prefix("  ("))
            .filter_map(|line| line.strip_suffix(')'))
            .collect();

        let mut response = format!("The query returned {} result(s):", rows.len());
        for row in rows {
            response.push_str(&format!("\n- {row}"));
        }
        response
    }

    fn record(&self, request: &CompletionRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.record(request);
        let input = request.user_input();

        if Self::is_narration(request) {
            match &self.narration_error {
                Some(message) => Err(BallerError::llm(message.clone())),
                None => Ok(self.mock_narration(input)),
            }
        } else {
            match &self.generation_error {
                Some(message) => Err(BallerError::llm(message.clone())),
                None => Ok(self.mock_sql(input)),
            }
        }
    }
}
