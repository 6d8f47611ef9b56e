use std::sync::Arc;

use boardstate::commands::translator::{CommandTranslator, LlmTranslator};
use boardstate::commands::{CommandError, CommandOutcome, CommandRunner};
use boardstate::config::{AppConfig, ConfigError};
use boardstate::db;
use boardstate::error::ErrorCode;
use boardstate::llm::LlmClient;
use boardstate::session::BoardSession;
use boardstate::store::{MemoryStore, PgStore, RemoteStore, StoreError};
use boardstate::sync::{PgChangeFeed, SyncError, spawn_sync_task};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("stdin: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "boardstate", about = "Drive a collaborative board from natural-language commands")]
struct Cli {
    /// Board to open. A new board is created when omitted.
    #[arg(long, env = "BOARD_ID")]
    board: Option<Uuid>,

    /// Name for a newly created board.
    #[arg(long, default_value = "Untitled board")]
    name: String,

    /// Keep the board in memory instead of Postgres; no sync feed.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    if let Ok(path) = dotenvy::dotenv() {
        info!(path = %path.display(), "loaded .env");
    }

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let pool = if cli.offline {
        None
    } else {
        Some(db::init_pool(config.database_url()?, config.db_max_connections).await?)
    };
    let store: Arc<dyn RemoteStore> = match &pool {
        Some(pool) => Arc::new(PgStore::new(pool.clone())),
        None => Arc::new(MemoryStore::new()),
    };

    let board_id = match cli.board {
        Some(id) if !cli.offline => id,
        _ => store.create_board(&cli.name).await?.id,
    };

    let session = Arc::new(BoardSession::open(Arc::clone(&store), board_id, config.board).await?);
    let persistence = session.spawn_persistence_task(config.persist_poll);
    let sync = match &pool {
        Some(pool) => Some(spawn_sync_task(Arc::clone(&session), PgChangeFeed::connect(pool).await?)),
        None => None,
    };

    // Non-fatal: without an LLM only locally recognized commands work.
    let translator: Option<Arc<dyn CommandTranslator>> = match LlmClient::from_env() {
        Ok(client) => {
            info!(model = client.model(), "LLM client initialized");
            let max_tokens = client.max_tokens();
            Some(Arc::new(LlmTranslator::new(Arc::new(client), max_tokens)))
        }
        Err(e) => {
            warn!(error = %e, "LLM client not configured; AI commands disabled");
            None
        }
    };

    let runner = CommandRunner::new(session.board(), translator, config.command_error_display)?;
    info!(%board_id, offline = cli.offline, "boardstate ready; reading commands from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match runner.run(&line).await {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => eprintln!("error [{}]: {}", e.error_code(), e.user_message()),
        }
    }

    let flushed = session.flush().await?;
    info!(%board_id, flushed, "stdin closed; shutting down");
    persistence.abort();
    if let Some(sync) = sync {
        sync.abort();
    }
    Ok(())
}

fn print_outcome(outcome: &CommandOutcome) {
    if let Some(summary) = &outcome.summary {
        println!("{summary}");
    }
    println!(
        "{:?}: {} applied, {} created{}",
        outcome.source,
        outcome.applied,
        outcome.created.len(),
        if outcome.skipped.is_empty() {
            String::new()
        } else {
            format!(", skipped {}", outcome.skipped.join(", "))
        }
    );
}
