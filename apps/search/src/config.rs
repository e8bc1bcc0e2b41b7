//! Static configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. `config/default.toml` (optional)
//! 2. `config/local.toml` (optional)
//! 3. environment variables `SM_SEARCH__<SECTION>__<KEY>`, e.g.
//!    `SM_SEARCH__ELASTICSEARCH__URL`
//!
//! A `.env` file in the working directory is loaded into the environment
//! first.

use crate::error::{Error, Result};
use config::{Environment, File};
use serde::Deserialize;
use sm_query::MAX_PAGE_SIZE;
use std::path::PathBuf;

const ENV_PREFIX: &str = "SM_SEARCH";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub elasticsearch: ElasticsearchConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    pub url: String,
    pub index: String,
    pub timeout_secs: u64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: "sm".to_string(),
            timeout_secs: 30,
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Adducts excluded when a filter asks for `hasHiddenAdduct: false`.
    pub hidden_adducts: Vec<String>,
    /// Page size used when a caller gives no limit.
    pub default_limit: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hidden_adducts: vec!["[M]+".to_string(), "[M]-".to_string()],
            default_limit: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for this crate when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
    /// Also write logs here when set.
    pub file_dir: Option<PathBuf>,
    /// `daily`, `hourly`, `minutely` or `never`.
    pub file_rotation: String,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_dir: None,
            file_rotation: "daily".to_string(),
            file_prefix: "sm-search".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and the environment.
    pub fn load() -> Result<Self> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("search.hidden_adducts")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        let es = &self.elasticsearch;
        if es.url.trim().is_empty() {
            return Err(Error::Config("elasticsearch.url must not be empty".into()));
        }
        url::Url::parse(&es.url)
            .map_err(|e| Error::Config(format!("elasticsearch.url is invalid: {}", e)))?;
        if es.index.trim().is_empty() {
            return Err(Error::Config("elasticsearch.index must not be empty".into()));
        }
        if es.timeout_secs == 0 {
            return Err(Error::Config("elasticsearch.timeout_secs must be positive".into()));
        }
        if es.username.is_some() != es.password.is_some() {
            return Err(Error::Config(
                "elasticsearch.username and elasticsearch.password must be set together".into(),
            ));
        }

        if self.search.default_limit == 0 || self.search.default_limit > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "search.default_limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        match self.logging.file_rotation.as_str() {
            "daily" | "hourly" | "minutely" | "never" => Ok(()),
            other => Err(Error::Config(format!(
                "logging.file_rotation must be one of daily, hourly, minutely, never; got {}",
                other
            ))),
        }
    }
}
