use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::config::AppConfig;
use crate::database::{manager, DrinkStore, MemoryDrinkStore, PgDrinkStore};
use crate::routes;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "drinks-api")]
#[command(about = "Drinks catalog API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,
    },

    #[command(about = "Database maintenance")]
    Db {
        #[command(subcommand)]
        cmd: DbCommands,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the drinks table if it does not exist")]
    Init,

    #[command(about = "Drop and recreate the drinks table with a seed drink")]
    Reset,
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Commands::Db { cmd } => {
            let store = open_store(&config).await?;
            match cmd {
                DbCommands::Init => store.ensure_schema().await?,
                DbCommands::Reset => store.reset().await?,
            }
            Ok(())
        }
    }
}

/// PostgreSQL when `DATABASE_URL` is set, otherwise a process-local store.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DrinkStore>> {
    match config.database.url {
        Some(_) => {
            let pool = manager::connect(&config.database)
                .await
                .context("failed to connect to DATABASE_URL")?;
            Ok(Arc::new(PgDrinkStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory drink store");
            Ok(Arc::new(MemoryDrinkStore::new()))
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    let validator = TokenValidator::from_config(&config.auth).context("invalid auth configuration")?;
    let store = open_store(&config).await?;
    store.ensure_schema().await?;

    let bind_addr = config.bind_addr();
    tracing::info!("Starting drinks API in {:?} mode", config.environment);

    let state = AppState::new(config, store, Arc::new(validator));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
