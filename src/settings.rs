//! Settings loaded from `broker-portal.toml` and `BROKER_PORTAL__*` variables.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::models::BrokerId;
use crate::store::EvictionPolicy;

const ENV_PREFIX: &str = "broker_portal";
const CONFIG_FILE: &str = "broker-portal";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Where favorites and filters are persisted
    pub state_dir: PathBuf,
    pub cache: EvictionPolicy,
    /// Broker whose portfolio the command-line client loads
    pub broker_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 30,
            state_dir: PathBuf::from(".broker-portal"),
            cache: EvictionPolicy::default(),
            broker_id: None,
        }
    }
}

impl Settings {
    /// Read the optional config file in the working directory, then the environment
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|err| match err {
                ConfigError::Frozen => anyhow!("configuration builder is frozen"),
                other => other.into(),
            })?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self> {
        config
            .try_deserialize()
            .map_err(|err| anyhow!("failed to deserialize configuration: {err}"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn broker(&self) -> Option<BrokerId> {
        self.broker_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(BrokerId::new)
    }
}
