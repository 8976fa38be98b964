//! `clicktrail` command-line tool.
//!
//! Manages links and collections, records visits and prints click analytics
//! straight from the SQLite database.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL
//! clicktrail link create https://github.com/rust-lang/rust --title "Rust" -t lang
//!
//! # Record a visit like a redirect would
//! clicktrail visit abc123 --referrer https://news.ycombinator.com
//!
//! # Per-link statistics and the dashboard
//! clicktrail stats abc123 --from 2024-01-01
//! clicktrail dashboard --limit 5 --tag lang --json
//!
//! # Backup and restore
//! clicktrail export -o links.json
//! clicktrail import links.json -y
//! ```
//!
//! # Environment Variables
//!
//! See [`clicktrail::config`]. `DATABASE_URL` defaults to
//! `sqlite://clicktrail.db`; a `.env` file is loaded when present.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use clicktrail::AppState;
use clicktrail::config::load_from_env;
use clicktrail::infrastructure::persistence::{PoolSettings, connect};
use clicktrail::telemetry::init_tracing;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = load_from_env().context("Invalid configuration")?;
    init_tracing(&config.log_level, &config.log_format)?;
    if matches!(cli.command, Commands::Db { .. }) {
        config.print_summary();
    }

    let pool = connect(&config.database_url, &PoolSettings::from(&config))
        .await
        .context("Failed to connect to database")?;

    let state = AppState::new(pool, &config);
    let result = cli::run(cli.command, &state, cli.json).await;

    state.db.close().await;

    result
}
