use figment::{providers::{Env, Format, Toml}, Figment};
use lae_core::models::{DeletePolicies, DEFAULT_EVENT_LIMIT};
use serde::Deserialize;

pub const DEFAULT_DATABASE_PATH: &str = "lae.db";
pub const DEFAULT_LOG_FILTER: &str = "lae=warn,lae_core=warn";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// SQLite file, created on first use
    pub database_path: String,
    /// `tracing` filter directive; `RUST_LOG` wins when set
    pub log_filter: String,
    pub delete_policy: DeletePolicies,
    pub events: EventsConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EventsConfig {
    /// Page size for `event list` when `--limit` is not given
    pub default_limit: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            delete_policy: DeletePolicies::default(),
            events: EventsConfig::default(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

impl Config {
    /// `config.toml` in the working directory, then `LAE_*` variables.
    /// Nested keys use a double underscore: `LAE_DELETE_POLICY__DOMAIN=restrict`.
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config.toml"))
                .merge(Env::prefixed("LAE_").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }
}
