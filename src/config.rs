use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{env, fs, path::Path, time::Duration};

/// Everything the store context needs to talk to the remote spreadsheet.
///
/// Credentials come from the environment (loaded from `.env` by the caller);
/// tuning knobs have defaults and can be overridden from a TOML file.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Remote spreadsheet identifier.
    pub spreadsheet_id: String,
    /// OAuth bearer token for the spreadsheet API.
    pub api_token: String,
    pub tuning: TuningConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// How long a cached table read stays fresh.
    pub cache_ttl_secs: u64,
    /// Bounded rows fetched per table read.
    pub max_rows: u32,
    pub retry: RetryPolicy,
}

/// Backoff parameters for the retry executor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 5,
            max_rows: 1000,
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            max_jitter_ms: 250,
        }
    }
}

impl RetryPolicy {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(1 << attempt))
    }
}

impl TuningConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl StoreConfig {
    /// Builds the config from `SHEETS_SPREADSHEET_ID` / `SHEETS_API_TOKEN`.
    ///
    /// Missing credentials are a fatal `Error::Config`; there is no point
    /// retrying remote calls that can never authenticate.
    pub fn from_env() -> Result<Self> {
        let spreadsheet_id = env::var("SHEETS_SPREADSHEET_ID").map_err(|_| {
            Error::Config("SHEETS_SPREADSHEET_ID is not set; cannot locate the spreadsheet".into())
        })?;
        let api_token = env::var("SHEETS_API_TOKEN").map_err(|_| {
            Error::Config("SHEETS_API_TOKEN is not set; cannot authenticate".into())
        })?;
        Ok(Self {
            spreadsheet_id,
            api_token,
            tuning: TuningConfig::default(),
        })
    }

    pub fn with_tuning(mut self, tuning: TuningConfig) -> Self {
        self.tuning = tuning;
        self
    }
}

pub fn load_tuning<P: AsRef<Path>>(path: P) -> Result<TuningConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load tuning configuration from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref)
        .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path_ref, e)))?;
    let tuning: TuningConfig = toml::from_str(&contents).map_err(|e| {
        Error::Config(format!(
            "Failed to parse TOML from config file {:?}: {}",
            path_ref, e
        ))
    })?;
    Ok(tuning)
}
