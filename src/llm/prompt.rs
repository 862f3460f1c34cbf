//! Prompt construction for LLM requests.
//!
//! Builds the generation prompt around the fixed league schema and the
//! narration prompt around an executed result set.

use crate::db::QueryResult;
use crate::llm::types::CompletionRequest;

/// The league schema as shown to the model.
///
/// Must stay consistent with the DDL in [`crate::db::seed`].
pub const SCHEMA_DESCRIPTION: &str = r#"Tables in the database:

Person (PersonID INT PK, FirstName VARCHAR, LastName VARCHAR, BirthDate DATE, HeightCM INT, WeightKG INT)
Team (TeamID INT PK, TeamName VARCHAR, City VARCHAR, HomeArena VARCHAR)
Player (PlayerID INT PK/FK->Person, TeamID FK->Team, JerseyNumber INT, Position VARCHAR)
Coach (CoachID INT PK/FK->Person, TeamID FK->Team, Role VARCHAR)
Game (GameID INT PK, HomeTeamID FK->Team, AwayTeamID FK->Team, GameDate DATETIME, Location VARCHAR, HomeScore INT, AwayScore INT)

IMPORTANT: When searching for teams by name, use LIKE with wildcards for partial matches (e.g., WHERE TeamName LIKE '%Stingers%')."#;

/// System prompt template for SQL generation.
const GENERATION_PROMPT_TEMPLATE: &str = r#"You are a SQL expert. Given the following database schema, generate ONLY a valid MySQL query to answer the user's question.
Return ONLY the SQL query, no explanations, no markdown, no code blocks.

{schema}"#;

/// System prompt for result narration.
pub const NARRATION_SYSTEM_PROMPT: &str = "You are a helpful assistant that explains database query results in clear, natural language. Be concise but informative.";

/// Results section used when a query returned zero rows.
pub const NO_RESULTS: &str = "No results found.";

/// Builds the generation system prompt with the schema injected.
pub fn build_generation_prompt() -> String {
    GENERATION_PROMPT_TEMPLATE.replace("{schema}", SCHEMA_DESCRIPTION)
}

/// Builds the generation request. The question is passed through verbatim.
pub fn build_generation_request(question: &str, temperature: f32) -> CompletionRequest {
    CompletionRequest::new(build_generation_prompt(), question, temperature)
}

/// Renders a result set for the narration prompt.
///
/// Zero rows yield [`NO_RESULTS`] with no column listing; otherwise a
/// `Columns: [..]` line, a `Rows:` line and one indented tuple per row.
pub fn format_results(result: &QueryResult) -> String {
    if result.rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut output = format!("Columns: [{}]\nRows:\n", result.column_names().join(", "));
    for row in &result.rows {
        let values: Vec<String> = row.iter().map(|v| v.to_display_string()).collect();
        output.push_str(&format!("  ({})\n", values.join(", ")));
    }
    output
}

/// Builds the narration request for an executed statement.
pub fn build_narration_request(
    question: &str,
    sql: &str,
    result: &QueryResult,
    temperature: f32,
) -> CompletionRequest {
    let user = format!(
        "The user asked: \"{question}\"\n\n\
         I ran this SQL query:\n{sql}\n\n\
         Here are the results:\n{}\n\n\
         Please explain these results in a friendly, easy-to-understand way.",
        format_results(result)
    );
    CompletionRequest::new(NARRATION_SYSTEM_PROMPT, user, temperature)
}
