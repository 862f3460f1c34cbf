//! League schema setup, sample data and roster listing.
//!
//! The DDL here is the source of truth that the schema description embedded
//! in generation prompts must match.

use crate::db::{DatabaseBackend, DatabaseClient, Value};
use crate::error::{BallerError, Result};
use tracing::info;

/// Tables in dependency order (referenced tables first).
pub const TABLES: [&str; 5] = ["Person", "Team", "Player", "Coach", "Game"];

const MYSQL_DDL: [&str; 5] = [
    r#"CREATE TABLE IF NOT EXISTS Person (
    PersonID INT PRIMARY KEY AUTO_INCREMENT,
    FirstName VARCHAR(30) NOT NULL,
    LastName VARCHAR(30) NOT NULL,
    BirthDate DATE,
    HeightCM INT,
    WeightKG INT
)"#,
    r#"CREATE TABLE IF NOT EXISTS Team (
    TeamID INT PRIMARY KEY AUTO_INCREMENT,
    TeamName VARCHAR(50) NOT NULL,
    City VARCHAR(50),
    HomeArena VARCHAR(50)
)"#,
    r#"CREATE TABLE IF NOT EXISTS Player (
    PlayerID INT PRIMARY KEY,
    TeamID INT NOT NULL,
    JerseyNumber INT NOT NULL,
    Position VARCHAR(20),
    FOREIGN KEY (PlayerID) REFERENCES Person(PersonID),
    FOREIGN KEY (TeamID) REFERENCES Team(TeamID)
)"#,
    r#"CREATE TABLE IF NOT EXISTS Coach (
    CoachID INT PRIMARY KEY,
    TeamID INT NOT NULL,
    Role VARCHAR(30),
    FOREIGN KEY (CoachID) REFERENCES Person(PersonID),
    FOREIGN KEY (TeamID) REFERENCES Team(TeamID)
)"#,
    r#"CREATE TABLE IF NOT EXISTS Game (
    GameID INT PRIMARY KEY AUTO_INCREMENT,
    HomeTeamID INT NOT NULL,
    AwayTeamID INT NOT NULL,
    GameDate DATETIME NOT NULL,
    Location VARCHAR(50),
    HomeScore INT DEFAULT 0,
    AwayScore INT DEFAULT 0,
    FOREIGN KEY (HomeTeamID) REFERENCES Team(TeamID),
    FOREIGN KEY (AwayTeamID) REFERENCES Team(TeamID)
)"#,
];

const SQLITE_DDL: [&str; 5] = [
    r#"CREATE TABLE IF NOT EXISTS Person (
    PersonID INTEGER PRIMARY KEY AUTOINCREMENT,
    FirstName VARCHAR(30) NOT NULL,
    LastName VARCHAR(30) NOT NULL,
    BirthDate DATE,
    HeightCM INT,
    WeightKG INT
)"#,
    r#"CREATE TABLE IF NOT EXISTS Team (
    TeamID INTEGER PRIMARY KEY AUTOINCREMENT,
    TeamName VARCHAR(50) NOT NULL,
    City VARCHAR(50),
    HomeArena VARCHAR(50)
)"#,
    r#"CREATE TABLE IF NOT EXISTS Player (
    PlayerID INTEGER PRIMARY KEY,
    TeamID INT NOT NULL,
    JerseyNumber INT NOT NULL,
    Position VARCHAR(20),
    FOREIGN KEY (PlayerID) REFERENCES Person(PersonID),
    FOREIGN KEY (TeamID) REFERENCES Team(TeamID)
)"#,
    r#"CREATE TABLE IF NOT EXISTS Coach (
    CoachID INTEGER PRIMARY KEY,
    TeamID INT NOT NULL,
    Role VARCHAR(30),
    FOREIGN KEY (CoachID) REFERENCES Person(PersonID),
    FOREIGN KEY (TeamID) REFERENCES Team(TeamID)
)"#,
    r#"CREATE TABLE IF NOT EXISTS Game (
    GameID INTEGER PRIMARY KEY AUTOINCREMENT,
    HomeTeamID INT NOT NULL,
    AwayTeamID INT NOT NULL,
    GameDate DATETIME NOT NULL,
    Location VARCHAR(50),
    HomeScore INT DEFAULT 0,
    AwayScore INT DEFAULT 0,
    FOREIGN KEY (HomeTeamID) REFERENCES Team(TeamID),
    FOREIGN KEY (AwayTeamID) REFERENCES Team(TeamID)
)"#,
];

/// (TeamName, City, HomeArena)
const TEAMS: [(&str, &str, &str); 3] = [
    ("Provo Wildcats", "Provo", "Marriott Center"),
    ("Salt Lake Stingers", "Salt Lake City", "Delta Center"),
    ("Ogden Thunder", "Ogden", "Dee Events Center"),
];

/// (FirstName, LastName, BirthDate, HeightCM, WeightKG). IDs 1-15 are
/// players (five per team), 16-21 are coaches (two per team).
const PERSONS: [(&str, &str, &str, i32, i32); 21] = [
    ("Marcus", "Johnson", "1998-03-15", 196, 93),
    ("Tyler", "Williams", "2000-07-22", 188, 82),
    ("DeShawn", "Carter", "1999-11-08", 201, 98),
    ("Kyle", "Anderson", "2001-02-14", 193, 88),
    ("Jamal", "Thompson", "1997-09-30", 185, 79),
    ("Brandon", "Davis", "1999-05-11", 198, 95),
    ("Chris", "Martinez", "2000-01-25", 191, 86),
    ("Andre", "Wilson", "1998-08-19", 203, 102),
    ("Terrence", "Moore", "2001-04-07", 187, 81),
    ("Malik", "Taylor", "1997-12-03", 195, 91),
    ("Jordan", "Brown", "1999-06-28", 199, 97),
    ("Isaiah", "Garcia", "2000-10-14", 186, 80),
    ("Darius", "Robinson", "1998-02-20", 205, 105),
    ("Kevin", "Lee", "2001-07-16", 190, 84),
    ("Aaron", "Clark", "1997-11-09", 194, 89),
    ("Robert", "Stevens", "1970-04-12", 185, 88),
    ("Michael", "Foster", "1975-08-23", 180, 82),
    ("James", "Mitchell", "1968-01-30", 183, 90),
    ("David", "Campbell", "1972-06-17", 178, 79),
    ("William", "Rivera", "1965-09-05", 181, 85),
    ("Richard", "Phillips", "1973-03-28", 176, 77),
];

/// (PlayerID, TeamID, JerseyNumber, Position)
const PLAYERS: [(i32, i32, i32, &str); 15] = [
    (1, 1, 23, "Point Guard"),
    (2, 1, 11, "Shooting Guard"),
    (3, 1, 34, "Center"),
    (4, 1, 5, "Small Forward"),
    (5, 1, 22, "Power Forward"),
    (6, 2, 7, "Point Guard"),
    (7, 2, 14, "Shooting Guard"),
    (8, 2, 42, "Center"),
    (9, 2, 3, "Small Forward"),
    (10, 2, 21, "Power Forward"),
    (11, 3, 10, "Point Guard"),
    (12, 3, 24, "Shooting Guard"),
    (13, 3, 55, "Center"),
    (14, 3, 8, "Small Forward"),
    (15, 3, 33, "Power Forward"),
];

/// (CoachID, TeamID, Role)
const COACHES: [(i32, i32, &str); 6] = [
    (16, 1, "Head Coach"),
    (17, 1, "Assistant Coach"),
    (18, 2, "Head Coach"),
    (19, 2, "Assistant Coach"),
    (20, 3, "Head Coach"),
    (21, 3, "Assistant Coach"),
];

/// (HomeTeamID, AwayTeamID, GameDate, Location, HomeScore, AwayScore).
/// Each team plays six games, three at home.
const GAMES: [(i32, i32, &str, &str, i32, i32); 9] = [
    (1, 2, "2025-01-10 19:00:00", "Marriott Center", 88, 79),
    (2, 1, "2025-01-24 18:30:00", "Delta Center", 92, 95),
    (1, 2, "2025-02-14 19:00:00", "Marriott Center", 101, 98),
    (1, 3, "2025-01-17 20:00:00", "Marriott Center", 85, 82),
    (3, 1, "2025-02-01 17:00:00", "Dee Events Center", 78, 81),
    (3, 1, "2025-02-28 19:30:00", "Dee Events Center", 89, 87),
    (2, 3, "2025-01-31 18:00:00", "Delta Center", 94, 88),
    (3, 2, "2025-02-07 19:00:00", "Dee Events Center", 76, 83),
    (2, 3, "2025-02-21 20:00:00", "Delta Center", 99, 102),
];

const ROSTER_QUERY: &str = r#"SELECT
    p.FirstName,
    p.LastName,
    t.TeamName,
    pl.JerseyNumber,
    pl.Position
FROM Player pl
JOIN Person p ON pl.PlayerID = p.PersonID
JOIN Team t ON pl.TeamID = t.TeamID
ORDER BY t.TeamName, pl.Position"#;

/// One line of the team roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub first_name: String,
    pub last_name: String,
    pub team_name: String,
    pub jersey_number: i64,
    pub position: Option<String>,
}

/// Returns the `CREATE TABLE IF NOT EXISTS` statements for the backend.
pub fn create_table_statements(backend: DatabaseBackend) -> Vec<String> {
    let ddl = match backend {
        DatabaseBackend::MySql => MYSQL_DDL,
        DatabaseBackend::Sqlite => SQLITE_DDL,
    };
    ddl.iter().map(|s| s.to_string()).collect()
}

/// Returns statements that empty every table, children before parents.
pub fn delete_statements() -> Vec<String> {
    ["Game", "Coach", "Player", "Person", "Team"]
        .iter()
        .map(|table| format!("DELETE FROM {table}"))
        .collect()
}

/// Returns statements that restart the auto-increment counters at 1.
///
/// On MySQL these are DDL and commit implicitly, so they must never share a
/// transaction with data changes.
pub fn reset_counter_statements(backend: DatabaseBackend) -> Vec<String> {
    match backend {
        DatabaseBackend::MySql => ["Person", "Team", "Game"]
            .iter()
            .map(|table| format!("ALTER TABLE {table} AUTO_INCREMENT = 1"))
            .collect(),
        DatabaseBackend::Sqlite => {
            vec!["DELETE FROM sqlite_sequence WHERE name IN ('Person', 'Team', 'Game')".to_string()]
        }
    }
}

/// Returns the statements that replace all league data with the sample league.
///
/// Only DML, so the whole list can run in one transaction on either backend.
pub fn sample_data_script() -> Vec<String> {
    let mut statements = delete_statements();
    statements.extend(sample_data_statements());
    statements
}

/// Returns the INSERT statements for the sample league.
///
/// Every row carries its ID, so the result does not depend on counter state.
pub fn sample_data_statements() -> Vec<String> {
    let teams = TEAMS
        .iter()
        .zip(1..)
        .map(|((name, city, arena), id)| {
            format!("({id}, {}, {}, {})", quote(name), quote(city), quote(arena))
        })
        .collect::<Vec<_>>()
        .join(",\n    ");

    let persons = PERSONS
        .iter()
        .zip(1..)
        .map(|((first, last, birth, height, weight), id)| {
            format!(
                "({id}, {}, {}, {}, {height}, {weight})",
                quote(first),
                quote(last),
                quote(birth)
            )
        })
        .collect::<Vec<_>>()
        .join(",\n    ");

    let players = PLAYERS
        .iter()
        .map(|(id, team, jersey, position)| format!("({id}, {team}, {jersey}, {})", quote(position)))
        .collect::<Vec<_>>()
        .join(",\n    ");

    let coaches = COACHES
        .iter()
        .map(|(id, team, role)| format!("({id}, {team}, {})", quote(role)))
        .collect::<Vec<_>>()
        .join(",\n    ");

    let games = GAMES
        .iter()
        .zip(1..)
        .map(|((home, away, date, location, home_score, away_score), id)| {
            format!(
                "({id}, {home}, {away}, {}, {}, {home_score}, {away_score})",
                quote(date),
                quote(location)
            )
        })
        .collect::<Vec<_>>()
        .join(",\n    ");

    vec![
        format!("INSERT INTO Team (TeamID, TeamName, City, HomeArena) VALUES\n    {teams}"),
        format!(
            "INSERT INTO Person (PersonID, FirstName, LastName, BirthDate, HeightCM, WeightKG) VALUES\n    {persons}"
        ),
        format!("INSERT INTO Player (PlayerID, TeamID, JerseyNumber, Position) VALUES\n    {players}"),
        format!("INSERT INTO Coach (CoachID, TeamID, Role) VALUES\n    {coaches}"),
        format!(
            "INSERT INTO Game (GameID, HomeTeamID, AwayTeamID, GameDate, Location, HomeScore, AwayScore) VALUES\n    {games}"
        ),
    ]
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Creates the league tables if they don't exist.
pub async fn create_tables(db: &dyn DatabaseClient) -> Result<()> {
    db.execute_script(&create_table_statements(db.backend())).await?;
    info!("Created {} tables", TABLES.len());
    Ok(())
}

/// Deletes all league data, then resets auto-increment counters.
///
/// The deletes commit as one transaction before the counters are touched.
pub async fn clear_tables(db: &dyn DatabaseClient) -> Result<()> {
    db.execute_script(&delete_statements()).await?;
    db.execute_script(&reset_counter_statements(db.backend())).await?;
    info!("Cleared league tables");
    Ok(())
}

/// Replaces all league data with the sample league.
///
/// Clearing and inserting run in one transaction: if any insert fails, the
/// previous data is left as it was.
pub async fn insert_sample_data(db: &dyn DatabaseClient) -> Result<()> {
    db.execute_script(&sample_data_script()).await?;
    info!(
        teams = TEAMS.len(),
        persons = PERSONS.len(),
        players = PLAYERS.len(),
        coaches = COACHES.len(),
        games = GAMES.len(),
        "Inserted sample data"
    );
    Ok(())
}

/// Lists every player with their team, ordered by team name then position.
pub async fn list_players_with_teams(db: &dyn DatabaseClient) -> Result<Vec<RosterEntry>> {
    let result = db.execute_query(ROSTER_QUERY).await?;

    result
        .rows
        .iter()
        .map(|row| match row.as_slice() {
            [first, last, team, jersey, position] => Ok(RosterEntry {
                first_name: first.to_display_string(),
                last_name: last.to_display_string(),
                team_name: team.to_display_string(),
                jersey_number: jersey_number(jersey)?,
                position: (!position.is_null()).then(|| position.to_display_string()),
            }),
            _ => Err(BallerError::internal(format!(
                "Roster query returned {} columns, expected 5",
                row.len()
            ))),
        })
        .collect()
}

fn jersey_number(value: &Value) -> Result<i64> {
    value
        .as_int()
        .or_else(|| value.to_display_string().parse().ok())
        .ok_or_else(|| BallerError::internal(format!("Invalid jersey number: {value}")))
}

/// Renders the roster grouped by team.
pub fn format_roster(entries: &[RosterEntry]) -> String {
    let mut output = String::from("--- All Players with Teams ---\n");
    let mut current_team: Option<&str> = None;

    for entry in entries {
        if current_team != Some(entry.team_name.as_str()) {
            output.push_str(&format!("\n{}:\n", entry.team_name));
            current_team = Some(entry.team_name.as_str());
        }
        output.push_str(&format!(
            "  #{} {} {} - {}\n",
            entry.jersey_number,
            entry.first_name,
            entry.last_name,
            entry.position.as_deref().unwrap_or("Unknown")
        ));
    }

    output
}
