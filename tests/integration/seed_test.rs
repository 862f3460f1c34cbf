//! Setup, sample data and roster tests against SQLite.

use ballersql::db::seed::{self, RosterEntry};
use ballersql::db::{DatabaseClient, Value};
use pretty_assertions::assert_eq;

use super::seeded_sqlite;

async fn count(db: &dyn DatabaseClient, table: &str) -> i64 {
    let result = db
        .execute_query(&format!("SELECT COUNT(*) FROM {table}"))
        .await
        .unwrap();
    result.rows[0][0].as_int().unwrap()
}

#[tokio::test]
async fn test_sample_data_row_counts() {
    let (_dir, db) = seeded_sqlite().await;

    let expected = [("Person", 21), ("Team", 3), ("Player", 15), ("Coach", 6), ("Game", 9)];
    for (table, rows) in expected {
        assert_eq!(count(db.as_ref(), table).await, rows, "{table}");
    }
}

#[tokio::test]
async fn test_every_team_has_five_players_and_two_coaches() {
    let (_dir, db) = seeded_sqlite().await;

    let result = db
        .execute_query(
            "SELECT t.TeamName, \
             (SELECT COUNT(*) FROM Player p WHERE p.TeamID = t.TeamID), \
             (SELECT COUNT(*) FROM Coach c WHERE c.TeamID = t.TeamID) \
             FROM Team t ORDER BY t.TeamID",
        )
        .await
        .unwrap();

    assert_eq!(result.row_count, 3);
    for row in &result.rows {
        assert_eq!(row[1], Value::Int(5), "{}", row[0]);
        assert_eq!(row[2], Value::Int(2), "{}", row[0]);
    }
}

#[tokio::test]
async fn test_rerunning_setup_is_idempotent() {
    let (_dir, db) = seeded_sqlite().await;

    seed::create_tables(db.as_ref()).await.unwrap();
    seed::insert_sample_data(db.as_ref()).await.unwrap();

    assert_eq!(count(db.as_ref(), "Team").await, 3);
    assert_eq!(count(db.as_ref(), "Person").await, 21);

    // Auto-increment counters restart, so foreign keys still line up
    let ids = db
        .execute_query("SELECT MIN(TeamID), MAX(TeamID), MAX(PersonID) FROM Team, Person")
        .await
        .unwrap();
    assert_eq!(
        ids.rows[0],
        vec![Value::Int(1), Value::Int(3), Value::Int(21)]
    );
}

#[tokio::test]
async fn test_failed_reseed_keeps_existing_league() {
    let (_dir, db) = seeded_sqlite().await;
    db.execute_query("DELETE FROM Game WHERE GameID > 1").await.unwrap();
    db.execute_query(
        "CREATE TRIGGER no_new_games BEFORE INSERT ON Game \
         BEGIN SELECT RAISE(ABORT, 'season is closed'); END",
    )
    .await
    .unwrap();

    let err = seed::insert_sample_data(db.as_ref()).await.unwrap_err();
    assert!(err.to_string().contains("season is closed"), "{err}");

    // The deletes were rolled back with the failed inserts
    assert_eq!(count(db.as_ref(), "Team").await, 3);
    assert_eq!(count(db.as_ref(), "Player").await, 15);
    assert_eq!(count(db.as_ref(), "Game").await, 1);
}

#[tokio::test]
async fn test_clear_tables_empties_league() {
    let (_dir, db) = seeded_sqlite().await;

    seed::clear_tables(db.as_ref()).await.unwrap();

    for table in seed::TABLES {
        assert_eq!(count(db.as_ref(), table).await, 0, "{table}");
    }

    // Counters restart, so the next team gets ID 1
    db.execute_query("INSERT INTO Team (TeamName) VALUES ('Orem Owls')")
        .await
        .unwrap();
    let team = db.execute_query("SELECT TeamID FROM Team").await.unwrap();
    assert_eq!(team.rows[0][0], Value::Int(1));
}

#[tokio::test]
async fn test_roster_ordered_by_team_then_position() {
    let (_dir, db) = seeded_sqlite().await;

    let roster = seed::list_players_with_teams(db.as_ref()).await.unwrap();

    assert_eq!(roster.len(), 15);
    assert_eq!(
        roster[0],
        RosterEntry {
            first_name: "Darius".to_string(),
            last_name: "Robinson".to_string(),
            team_name: "Ogden Thunder".to_string(),
            jersey_number: 55,
            position: Some("Center".to_string()),
        }
    );

    let keys: Vec<(&str, Option<&str>)> = roster
        .iter()
        .map(|e| (e.team_name.as_str(), e.position.as_deref()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn test_roster_formatting_groups_teams() {
    let (_dir, db) = seeded_sqlite().await;

    let roster = seed::list_players_with_teams(db.as_ref()).await.unwrap();
    let output = seed::format_roster(&roster);

    assert!(output.starts_with("--- All Players with Teams ---\n\nOgden Thunder:\n"));
    assert!(output.contains("  #55 Darius Robinson - Center\n"));
    assert!(output.contains("\nProvo Wildcats:\n  #34 DeShawn Carter - Center\n"));
    assert_eq!(output.matches(":\n").count(), 3);
    assert_eq!(output.lines().filter(|l| l.starts_with("  #")).count(), 15);
}

#[tokio::test]
async fn test_roster_without_tables_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.db");
    let db = ballersql::db::create_client(&ballersql::config::ConnectionConfig::sqlite(
        path.to_string_lossy(),
    ))
    .unwrap();

    let err = seed::list_players_with_teams(db.as_ref()).await.unwrap_err();
    assert!(err.to_string().contains("no such table"), "{err}");
}
