use clap::Parser;
use tracing_subscriber::EnvFilter;

use drinks_api::cli::Cli;
use drinks_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH0_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("drinks_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    if let Err(e) = drinks_api::cli::run(cli, config).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
