use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

const DEFAULT_DATABASE_PATH: &str = "mydb.db";
const DEFAULT_TOP_COINS: u32 = 3;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OverviewConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        OverviewConfig {
            start_date: ymd(2020, 1, 1),
            end_date: ymd(2026, 1, 26),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrendConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_top_coins")]
    pub top_coins: u32,
}

fn default_top_coins() -> u32 {
    DEFAULT_TOP_COINS
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig {
            start_date: ymd(2025, 2, 1),
            end_date: ymd(2026, 2, 4),
            top_coins: DEFAULT_TOP_COINS,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub overview: OverviewConfig,
    #[serde(default)]
    pub trend: TrendConfig,
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            overview: OverviewConfig::default(),
            trend: TrendConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no config file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "xmarket", "xmarket")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
