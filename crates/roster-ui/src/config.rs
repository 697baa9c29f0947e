use std::time::Duration;

use roster_client::Environment;
use serde::Deserialize;

/// Console front end configuration, read from `ROSTER_*` variables.
#[derive(Clone, Debug, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    10
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("ROSTER_").from_env()
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
