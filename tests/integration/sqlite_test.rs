//! Pipeline tests against a real, seeded SQLite league.

use std::sync::Arc;

use ballersql::db::{DatabaseClient, Value, MULTIPLE_STATEMENTS};
use ballersql::llm::MockLlmClient;
use ballersql::pipeline::{Pipeline, PipelineOutcome};
use ballersql::query::QueryExecutor;
use ballersql::safety::ReadOnlyGuard;
use pretty_assertions::assert_eq;

use super::seeded_sqlite;

#[tokio::test]
async fn test_sqlite_what_teams_are_there() {
    let (_dir, db) = seeded_sqlite().await;
    let pipeline = Pipeline::new(Arc::new(MockLlmClient::new()), db);

    let outcome = pipeline.ask("What teams are there?").await.unwrap();

    assert!(outcome.is_answered(), "{outcome:?}");
    let result = outcome.result().unwrap();
    assert_eq!(result.row_count, 3);
    assert_eq!(result.column_names(), vec!["TeamName", "City", "HomeArena"]);
    assert_eq!(result.rows[0][0], Value::from("Provo Wildcats"));
}

#[tokio::test]
async fn test_sqlite_nonexistent_team() {
    let (_dir, db) = seeded_sqlite().await;
    let llm = MockLlmClient::new().with_response(
        "lakers",
        "```sql\nSELECT * FROM Team WHERE TeamName LIKE '%Lakers%';\n```",
    );
    let pipeline = Pipeline::new(Arc::new(llm.clone()), db);

    let outcome = pipeline.ask("How did the Lakers do?").await.unwrap();

    assert_eq!(
        outcome.sql(),
        "SELECT * FROM Team WHERE TeamName LIKE '%Lakers%';"
    );
    let result = outcome.result().unwrap();
    assert!(result.is_empty());
    assert_eq!(
        result.column_names(),
        vec!["TeamID", "TeamName", "City", "HomeArena"]
    );

    let narration = llm.narration_requests();
    assert_eq!(narration.len(), 1);
    assert!(narration[0].user_input().contains("No results found"));
}

#[tokio::test]
async fn test_sqlite_non_sql_reply_fails_execution() {
    let (_dir, db) = seeded_sqlite().await;
    let llm = MockLlmClient::new();
    let pipeline = Pipeline::new(Arc::new(llm.clone()), db);

    let outcome = pipeline.ask("What is the meaning of life?").await.unwrap();

    let PipelineOutcome::ExecutionFailed { error, .. } = outcome else {
        panic!("expected an execution failure, got {outcome:?}");
    };
    assert!(error.contains("syntax error"), "{error}");
    assert!(llm.narration_requests().is_empty());
}

#[tokio::test]
async fn test_sqlite_tallest_player() {
    let (_dir, db) = seeded_sqlite().await;
    let pipeline = Pipeline::new(Arc::new(MockLlmClient::new()), db);

    let outcome = pipeline.ask("Who is the tallest player?").await.unwrap();

    let PipelineOutcome::Answered {
        result,
        explanation,
        ..
    } = outcome
    else {
        panic!("expected an answer, got {outcome:?}");
    };
    assert_eq!(
        result.rows,
        vec![vec![
            Value::from("Darius"),
            Value::from("Robinson"),
            Value::Int(205)
        ]]
    );
    assert!(explanation.contains("Darius, Robinson, 205"));
}

#[tokio::test]
async fn test_sqlite_coaches_join() {
    let (_dir, db) = seeded_sqlite().await;
    let pipeline = Pipeline::new(Arc::new(MockLlmClient::new()), db);

    let outcome = pipeline.ask("Who coaches each team?").await.unwrap();

    let result = outcome.result().unwrap();
    assert_eq!(result.row_count, 6);
    assert!(result.rows.iter().all(|row| row.len() == 4));
}

#[tokio::test]
async fn test_sqlite_select_is_idempotent() {
    let (_dir, db) = seeded_sqlite().await;
    let executor = QueryExecutor::new(db.as_ref());
    let sql = "SELECT h.TeamName, g.HomeScore, g.AwayScore FROM Game g \
               JOIN Team h ON g.HomeTeamID = h.TeamID ORDER BY g.GameID";

    let first = executor.execute(sql).await;
    let second = executor.execute(sql).await;

    let (Some(first), Some(second)) = (first.result(), second.result()) else {
        panic!("both executions should succeed");
    };
    assert_eq!(first.row_count, 9);
    assert!(first.same_data(second));
}

#[tokio::test]
async fn test_sqlite_mutation_runs_without_guard() {
    let (_dir, db) = seeded_sqlite().await;
    let llm = MockLlmClient::new()
        .with_response("rename", "UPDATE Team SET City = 'Orem' WHERE TeamID = 1");
    let pipeline = Pipeline::new(Arc::new(llm), db);

    let outcome = pipeline.ask("Rename Provo's city").await.unwrap();
    assert!(outcome.result().is_some(), "{outcome:?}");

    let check = pipeline
        .database()
        .execute_query("SELECT City FROM Team WHERE TeamID = 1")
        .await
        .unwrap();
    assert_eq!(check.rows[0][0], Value::from("Orem"));
}

#[tokio::test]
async fn test_sqlite_read_only_guard_blocks_mutation() {
    let (_dir, db) = seeded_sqlite().await;
    let llm = MockLlmClient::new().with_response("drop", "DROP TABLE Game");
    let pipeline =
        Pipeline::new(Arc::new(llm.clone()), db).with_guard(Box::new(ReadOnlyGuard::new()));

    let outcome = pipeline.ask("Drop all the games").await.unwrap();

    let PipelineOutcome::Rejected { sql, reason } = outcome else {
        panic!("expected a rejection, got {outcome:?}");
    };
    assert_eq!(sql, "DROP TABLE Game");
    assert!(reason.starts_with("Read-only mode"));
    assert!(llm.narration_requests().is_empty());

    let games = pipeline
        .database()
        .execute_query("SELECT COUNT(*) FROM Game")
        .await
        .unwrap();
    assert_eq!(games.rows[0][0], Value::Int(9));
}

#[tokio::test]
async fn test_sqlite_two_selects_fail_execution() {
    let (_dir, db) = seeded_sqlite().await;
    let llm = MockLlmClient::new().with_response(
        "both",
        "SELECT TeamName FROM Team; SELECT TeamID, TeamName, City FROM Team",
    );
    let pipeline = Pipeline::new(Arc::new(llm.clone()), db);

    let outcome = pipeline.ask("Show both team lists").await.unwrap();

    let PipelineOutcome::ExecutionFailed { error, .. } = outcome else {
        panic!("expected an execution failure, got {outcome:?}");
    };
    assert_eq!(error, MULTIPLE_STATEMENTS);
    assert!(llm.narration_requests().is_empty());
}

#[tokio::test]
async fn test_sqlite_trailing_delete_is_not_run() {
    let (_dir, db) = seeded_sqlite().await;
    let llm = MockLlmClient::new()
        .with_response("count", "SELECT COUNT(*) FROM Game; DELETE FROM Game");
    let pipeline = Pipeline::new(Arc::new(llm), db);

    let outcome = pipeline.ask("Count the games").await.unwrap();
    assert!(outcome.result().is_none(), "{outcome:?}");

    let games = pipeline
        .database()
        .execute_query("SELECT COUNT(*) FROM Game")
        .await
        .unwrap();
    assert_eq!(games.rows[0][0], Value::Int(9));
}
