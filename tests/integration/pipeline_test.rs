//! End-to-end pipeline tests against the mock store and mock LLM.

use std::sync::Arc;

use ballersql::db::{DatabaseClient, MockDatabaseClient, Value};
use ballersql::error::BallerError;
use ballersql::llm::{MockLlmClient, QueryGenerator};
use ballersql::pipeline::{Pipeline, PipelineOutcome};
use ballersql::query::{ExecutionOutcome, QueryExecutor};
use pretty_assertions::assert_eq;

const TEAMS_SQL: &str = "SELECT TeamName, City, HomeArena FROM Team;";
const TEAM_NAMES_SQL: &str = "SELECT TeamName FROM Team;";
const LAKERS_SQL: &str = "SELECT * FROM Team WHERE TeamName LIKE '%Lakers%'";

fn league_db() -> MockDatabaseClient {
    MockDatabaseClient::new()
        .with_rows(
            TEAMS_SQL,
            &["TeamName", "City", "HomeArena"],
            vec![
                vec![
                    Value::from("Provo Wildcats"),
                    Value::from("Provo"),
                    Value::from("Marriott Center"),
                ],
                vec![
                    Value::from("Salt Lake Stingers"),
                    Value::from("Salt Lake City"),
                    Value::from("Delta Center"),
                ],
                vec![
                    Value::from("Ogden Thunder"),
                    Value::from("Ogden"),
                    Value::from("Dee Events Center"),
                ],
            ],
        )
        .with_rows(
            TEAM_NAMES_SQL,
            &["TeamName"],
            vec![
                vec![Value::from("Provo Wildcats")],
                vec![Value::from("Salt Lake Stingers")],
                vec![Value::from("Ogden Thunder")],
            ],
        )
        .with_rows(
            LAKERS_SQL,
            &["TeamID", "TeamName", "City", "HomeArena"],
            vec![],
        )
}

#[tokio::test]
async fn test_what_teams_are_there() {
    let llm = MockLlmClient::new();
    let pipeline = Pipeline::new(Arc::new(llm.clone()), Box::new(league_db()));

    let outcome = pipeline.ask("What teams are there?").await.unwrap();

    let PipelineOutcome::Answered {
        sql,
        result,
        explanation,
    } = outcome
    else {
        panic!("expected an answer, got {outcome:?}");
    };
    assert_eq!(sql, TEAMS_SQL);
    assert_eq!(result.row_count, 3);
    assert!(explanation.contains("Salt Lake Stingers"));

    let narration = llm.narration_requests();
    assert_eq!(narration.len(), 1);
    assert!(narration[0].user_input().contains("Columns: [TeamName, City, HomeArena]"));
}

/// Returns the results section embedded in a narration prompt.
fn results_section(prompt: &str) -> &str {
    let start = prompt.find("Here are the results:\n").unwrap() + "Here are the results:\n".len();
    let end = start + prompt[start..].find("\n\nPlease").unwrap();
    &prompt[start..end]
}

#[tokio::test]
async fn test_team_names_listed_for_narrator() {
    let llm = MockLlmClient::new().with_response("what teams", TEAM_NAMES_SQL);
    let pipeline = Pipeline::new(Arc::new(llm.clone()), Box::new(league_db()));

    let outcome = pipeline.ask("What teams are there?").await.unwrap();

    assert!(outcome.is_answered(), "{outcome:?}");
    assert_eq!(outcome.sql(), TEAM_NAMES_SQL);
    let result = outcome.result().unwrap();
    assert_eq!(result.column_names(), vec!["TeamName"]);
    assert_eq!(result.row_count, 3);

    let narration = llm.narration_requests();
    assert_eq!(narration.len(), 1);
    assert_eq!(
        results_section(narration[0].user_input()),
        "Columns: [TeamName]\n\
         Rows:\n\
         \x20 (Provo Wildcats)\n\
         \x20 (Salt Lake Stingers)\n\
         \x20 (Ogden Thunder)\n"
    );
}

#[tokio::test]
async fn test_nonexistent_team_has_no_results() {
    let llm = MockLlmClient::new().with_response("lakers", LAKERS_SQL);
    let pipeline = Pipeline::new(Arc::new(llm.clone()), Box::new(league_db()));

    let outcome = pipeline.ask("Tell me about the Lakers").await.unwrap();

    let result = outcome.result().unwrap();
    assert!(result.is_empty());
    assert_eq!(result.columns.len(), 4);

    let narration = llm.narration_requests();
    assert_eq!(narration.len(), 1);
    let prompt = narration[0].user_input();
    assert!(prompt.contains("No results found"));
    assert!(!prompt.contains("Columns:"));
}

#[tokio::test]
async fn test_invalid_sql_reports_syntax_error_without_narration() {
    let llm = MockLlmClient::new();
    let pipeline = Pipeline::new(Arc::new(llm.clone()), Box::new(league_db()));

    let outcome = pipeline.ask("What is the meaning of life?").await.unwrap();

    let PipelineOutcome::ExecutionFailed { sql, error } = outcome else {
        panic!("expected an execution failure, got {outcome:?}");
    };
    assert!(sql.starts_with("I don't understand"));
    assert!(error.contains("error in your SQL syntax"));
    assert!(llm.narration_requests().is_empty());
}

#[tokio::test]
async fn test_generation_failure_surfaces_as_llm_error() {
    let llm = MockLlmClient::new().with_generation_error("Request timed out. Try again.");
    let db = league_db();
    let pipeline = Pipeline::new(Arc::new(llm), Box::new(db.clone()));

    let err = pipeline.ask("What teams are there?").await.unwrap_err();

    assert!(matches!(err, BallerError::Llm(_)));
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn test_generated_sql_never_fenced() {
    let fenced = [
        "```sql\nSELECT TeamName FROM Team;\n```",
        "```\nSELECT COUNT(*) FROM Player;\n```",
        "  ```sql\nSELECT * FROM Game\n```\n",
        "SELECT 1",
    ];

    for (i, response) in fenced.iter().enumerate() {
        let llm = MockLlmClient::new().with_response(format!("question {i}"), *response);
        let generator = QueryGenerator::new(Arc::new(llm));

        let sql = generator.generate(&format!("question {i}")).await.unwrap();

        assert!(!sql.starts_with("```"), "{sql:?}");
        assert!(!sql.ends_with("```"), "{sql:?}");
        assert_eq!(sql, sql.trim());
    }
}

#[tokio::test]
async fn test_executor_round_trip_shape() {
    let width = 4;
    let rows: Vec<Vec<Value>> = (0..7)
        .map(|r| (0..width).map(|c| Value::Int(r * 10 + c)).collect())
        .collect();
    let db = MockDatabaseClient::new().with_rows(
        "SELECT a, b, c, d FROM t",
        &["a", "b", "c", "d"],
        rows,
    );

    let outcome = QueryExecutor::new(&db).execute("SELECT a, b, c, d FROM t").await;

    let ExecutionOutcome::Success(result) = outcome else {
        panic!("expected success");
    };
    assert_eq!(result.columns.len(), width as usize);
    assert_eq!(result.rows.len(), 7);
    assert!(result.rows.iter().all(|row| row.len() == width as usize));
}

#[tokio::test]
async fn test_execution_error_skips_narrator() {
    let referee_sql = "SELECT * FROM Referee";
    let db = league_db().with_error(
        referee_sql,
        "ERROR 1146 (42S02): Table 'ballersql.Referee' doesn't exist",
    );
    let llm = MockLlmClient::new().with_response("referee", referee_sql);
    let pipeline = Pipeline::new(Arc::new(llm.clone()), Box::new(db));

    let outcome = pipeline.ask("Who refereed the last game?").await.unwrap();

    let PipelineOutcome::ExecutionFailed { sql, error } = &outcome else {
        panic!("expected an execution failure, got {outcome:?}");
    };
    assert_eq!(sql, referee_sql);
    assert!(error.contains("doesn't exist"));
    assert!(outcome.result().is_none());
    assert_eq!(llm.generation_requests().len(), 1);
    assert!(llm.narration_requests().is_empty());
}

#[tokio::test]
async fn test_executor_idempotent_select() {
    let db = league_db();
    let executor = QueryExecutor::new(&db);

    let first = executor.execute(TEAMS_SQL).await;
    let second = executor.execute(TEAMS_SQL).await;

    let (Some(first), Some(second)) = (first.result(), second.result()) else {
        panic!("both executions should succeed");
    };
    assert!(first.same_data(second));
    assert_eq!(db.executed().len(), 2);
}

#[tokio::test]
async fn test_database_accessor_shares_client() {
    let db = league_db();
    let pipeline = Pipeline::new(Arc::new(MockLlmClient::new()), Box::new(db.clone()));

    pipeline
        .database()
        .execute_query(TEAMS_SQL)
        .await
        .unwrap();

    assert_eq!(db.executed(), vec![TEAMS_SQL.to_string()]);
}
