//! Main entry point for the AEGIS backend.
//!
//! This file parses the command line, loads configuration, initializes
//! logging and the database, and then either runs the Axum web server or one
//! of the maintenance commands (`migrate`, `seed`).

use std::sync::Arc;

use aegis_backend::config::Config;
use aegis_backend::database::{migrations, Database};
use aegis_backend::services::seeder;
use aegis_backend::{build_app, AppState};
use anyhow::Context;
use clap::{Parser, Subcommand};
use storage::{FileStore, LocalFileStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aegis", about = "AEGIS platform backend", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Overrides `AEGIS_BIND_ADDRESS`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Create or upgrade the database schema and exit.
    Migrate,
    /// Wipe the database and load demo accounts and sample data.
    Seed,
}

fn init_tracing(config: &Config) {
    let default_level = if config.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("invalid configuration")?;
    init_tracing(&config);

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Migrate => {
            let db = Database::open(&config.database_url).context("failed to open database")?;
            let version = db.call(|conn| migrations::read_version(conn)).await?;
            info!(database = %config.database_url, version, "database is up to date");
            Ok(())
        }
        Command::Seed => {
            let db = Database::open(&config.database_url).context("failed to open database")?;
            let auth = aegis_backend::auth::AuthService::new(&config);
            let summary = seeder::seed(&db, &auth).await?;
            println!("Seeded {:?}", summary);
            println!("Test accounts (password: {}):", seeder::SEED_PASSWORD);
            for (email, role) in seeder::seeded_accounts() {
                println!("  {:<10} {}", role, email);
            }
            Ok(())
        }
    }
}

async fn serve(config: Config, bind: Option<String>) -> anyhow::Result<()> {
    let db = Database::open(&config.database_url).context("failed to open database")?;
    let files = LocalFileStore::open(&config.upload_dir)
        .await
        .context("failed to prepare upload directory")?;
    let address = bind.unwrap_or_else(|| config.bind_address.clone());

    info!(app = %config.app_name, store = files.kind(), uploads = %files.root().display(), "starting");
    let app = build_app(AppState::new(config, db, Arc::new(files)));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("listening on {}", address);
    axum::serve(listener, app).await?;
    Ok(())
}
