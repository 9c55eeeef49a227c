use std::{env, process, sync::Arc};

use clap::Parser;
use sqlx::SqlitePool;
use tracing_subscriber::EnvFilter;

use crate::{
    app::{
        cli::{Cli, Command},
        config::{Config, DEFAULT_APP_ENV},
        envy::Envy,
    },
    rankings::cache::RankingsCache,
};

mod app;
mod ingest;
mod minting;
mod periods;
mod rankings;
mod receipts;
#[cfg(test)]
mod tests;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    /// Changes on every start; live reload pages watch it.
    pub boot_id: String,
    pub rankings: Arc<RankingsCache>,
}

#[tokio::main]
async fn main() {
    // tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("peppermint=info,tower_http=info")),
        )
        .init();

    // environment
    let app_env = env::var("APP_ENV").unwrap_or(DEFAULT_APP_ENV.to_string());
    let _ = dotenvy::from_filename(format!(".env.{}", app_env));
    let envy = match envy::from_env::<Envy>() {
        Ok(envy) => envy,
        Err(e) => {
            tracing::error!("invalid environment: {}", e);
            process::exit(1);
        }
    };

    let cli = Cli::parse();
    let config = cli.config(envy);

    let result = match cli.command {
        Command::Serve { .. } => app::server::serve(config).await,
        Command::Poll { once, .. } => ingest::service::run(config, once).await,
        Command::Fetch { node_id, force } => ingest::service::fetch(config, node_id, force).await,
        Command::Receipt { hash } => ingest::service::show_receipt(config, &hash).await,
        Command::Rank { top } => rankings::service::print_rankings(config, top).await,
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        process::exit(1);
    }
}
