use std::{path::PathBuf, time::Duration};

use reqwest::Url;
use roster_client::Environment;
use serde::Deserialize;
use thiserror::Error;

use crate::threshold::{Threshold, ThresholdError, default_thresholds, parse_thresholds};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment error: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid target URL '{0}'")]
    InvalidTarget(String),
    #[error("at least one virtual user is required")]
    NoVirtualUsers,
    #[error("run duration must be greater than zero")]
    ZeroDuration,
    #[error("invalid threshold: {0}")]
    Threshold(#[from] ThresholdError),
    #[error("could not encode payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// The workload profile of one run. Fixed once the run starts.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    /// Base URL the users collection lives under
    pub target_url: String,
    pub virtual_users: usize,
    pub duration: Duration,
    /// Sleep at the end of every iteration
    pub iteration_pause: Duration,
    /// Name sent in every `POST /users`
    pub payload_name: String,
    pub request_timeout: Duration,
    pub thresholds: Vec<Threshold>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            virtual_users: default_vus(),
            duration: Duration::from_secs(default_duration_secs()),
            iteration_pause: Duration::from_millis(default_pause_ms()),
            payload_name: default_payload_name(),
            request_timeout: Duration::from_secs(default_request_timeout_secs()),
            thresholds: default_thresholds(),
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.target_url)
            .map_err(|_| ConfigError::InvalidTarget(self.target_url.clone()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidTarget(self.target_url.clone()));
        }
        if self.virtual_users == 0 {
            return Err(ConfigError::NoVirtualUsers);
        }
        if self.duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }
}

/// Load generator settings, read from `LOADGEN_*` variables.
#[derive(Clone, Debug, Deserialize)]
pub struct LoadConfig {
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_target_url")]
    pub target_url: String,
    #[serde(default = "default_vus")]
    pub vus: usize,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    #[serde(default = "default_payload_name")]
    pub payload_name: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// `metric:expr[,expr];...`, replaces the default thresholds when set
    pub thresholds: Option<String>,
    /// Write the Prometheus text rendering of the run here
    pub prometheus_out: Option<PathBuf>,
}

fn default_target_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_vus() -> usize {
    5
}

const fn default_duration_secs() -> u64 {
    10
}

const fn default_pause_ms() -> u64 {
    1000
}

fn default_payload_name() -> String {
    "k6-test-user".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    60
}

impl LoadConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(envy::prefixed("LOADGEN_").from_env()?)
    }

    /// Build and validate the workload this configuration describes.
    pub fn workload(&self) -> Result<WorkloadConfig, ConfigError> {
        let thresholds = match &self.thresholds {
            Some(list) => parse_thresholds(list)?,
            None => default_thresholds(),
        };

        let workload = WorkloadConfig {
            target_url: self.target_url.clone(),
            virtual_users: self.vus,
            duration: Duration::from_secs(self.duration_secs),
            iteration_pause: Duration::from_millis(self.pause_ms),
            payload_name: self.payload_name.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            thresholds,
        };
        workload.validate()?;

        Ok(workload)
    }
}
