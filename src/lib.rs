pub mod cli;
pub mod core;
pub mod store;

use crate::core::Report;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

#[derive(Debug)]
pub enum AppCommand {
    Overview {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    Reports,
    Query(Report),
    Trend {
        coin: Option<String>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

/// Loads the configuration, opens the market database read-only for the
/// duration of the command, and runs it.
pub fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    database_path: Option<&str>,
) -> Result<()> {
    info!("Cross market analysis starting...");

    if let AppCommand::Reports = command {
        cli::query::list();
        return Ok(());
    }

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let database_path = database_path.unwrap_or(config.database_path.as_str());
    let store = store::MarketStore::open(database_path)
        .with_context(|| format!("Failed to open market database: {database_path}"))?;

    match command {
        AppCommand::Overview { start, end } => cli::overview::run(
            &store,
            start.unwrap_or(config.overview.start_date),
            end.unwrap_or(config.overview.end_date),
        ),
        AppCommand::Query(report) => cli::query::run(&store, report),
        AppCommand::Trend { coin, start, end } => cli::trend::run(
            &store,
            config.trend.top_coins,
            coin.as_deref(),
            start.unwrap_or(config.trend.start_date),
            end.unwrap_or(config.trend.end_date),
        ),
        AppCommand::Reports => Ok(()),
    }
}
