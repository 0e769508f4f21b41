//! Configuration for the lake level scraper.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// USGS water services endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsgsConfig {
    /// Instantaneous values (time-series) service
    #[serde(default = "default_timeseries_url")]
    pub timeseries_url: String,
    /// Site metadata service
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeseries_url() -> String {
    "http://waterservices.usgs.gov/nwis/iv/".to_string()
}

fn default_site_url() -> String {
    "https://waterservices.usgs.gov/nwis/site/".to_string()
}

fn default_user_agent() -> String {
    format!("lake-levels/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for UsgsConfig {
    fn default() -> Self {
        Self {
            timeseries_url: default_timeseries_url(),
            site_url: default_site_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/lake_levels.db")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub usgs: UsgsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from defaults, `lake-levels.toml` and the environment
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("lake-levels").required(false))
            // LAKE_LEVELS_STORAGE__DB_PATH, LAKE_LEVELS_USGS__SITE_URL, ...
            .add_source(
                config::Environment::with_prefix("LAKE_LEVELS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
