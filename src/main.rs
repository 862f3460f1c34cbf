//! BallerSQL - ask questions about a basketball league in plain English.

use std::sync::Arc;

use ballersql::cli::Cli;
use ballersql::config::{Config, ConnectionConfig};
use ballersql::db::{self, seed, DatabaseClient};
use ballersql::error::{BallerError, Result};
use ballersql::llm;
use ballersql::logging;
use ballersql::pipeline::Pipeline;
use ballersql::repl;
use ballersql::safety::ReadOnlyGuard;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    if cli.is_interactive() {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}: {}", e.category(), e.message());
            eprintln!("{}: {}", e.category(), e.message());
            std::process::exit(1);
        }
    }
}

/// Runs the selected mode. Returns false if a one-shot question failed.
async fn run(cli: Cli) -> Result<bool> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;

    let connection = resolve_connection(&cli, &config)?;
    info!("Connection: {}", connection.display_string());
    let db = db::create_client(&connection)?;
    db.ping().await?;

    if cli.setup {
        setup(db.as_ref()).await?;
    }
    if cli.roster {
        let roster = seed::list_players_with_teams(db.as_ref()).await?;
        print!("{}", seed::format_roster(&roster));
    }
    if !cli.is_interactive() && cli.question.is_none() {
        return Ok(true);
    }

    config.llm.apply_env();
    if let Some(provider) = &cli.llm {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    let llm: Arc<dyn llm::LlmClient> = Arc::from(llm::create_client(&config.llm)?);
    info!(provider = %config.llm.provider, model = %config.llm.model, "LLM client ready");

    let mut pipeline = Pipeline::from_config(llm, db, &config.llm);
    if cli.read_only || config.safety.read_only {
        info!("Read-only mode enabled");
        pipeline = pipeline.with_guard(Box::new(ReadOnlyGuard::new()));
    }

    match &cli.question {
        Some(question) => Ok(repl::answer(&pipeline, question).await),
        None => {
            repl::run_interactive(&pipeline).await?;
            Ok(true)
        }
    }
}

async fn setup(db: &dyn DatabaseClient) -> Result<()> {
    seed::create_tables(db).await?;
    seed::insert_sample_data(db).await?;
    println!("Tables created and sample data inserted.");
    Ok(())
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
///
/// Precedence: connection string, then individual CLI flags over the named
/// (or default) connection from the config file, then `MYSQL_*` variables
/// for anything still unset.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    let mut connection = match cli.connection_name() {
        Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
            BallerError::config(format!("Connection '{}' not found in config file", name))
        })?,
        None => config.get_connection(None).cloned().unwrap_or_default(),
    };

    if let Some(cli_connection) = cli.to_connection_config()? {
        if cli.has_connection_string() {
            connection = cli_connection;
        } else {
            connection.merge(&cli_connection);
        }
    }

    connection.apply_env_defaults();

    if connection.database.is_none() {
        return Err(BallerError::config(
            "No database configured. Pass a connection string, set DATABASE_URL or MYSQL_DATABASE, \
             or add [connections.default] to the config file.",
        ));
    }

    Ok(connection)
}
