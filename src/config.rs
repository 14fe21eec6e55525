use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

pub const ENV_DATA_DIR: &str = "INBOX_DATA_DIR";
pub const ENV_STORAGE: &str = "INBOX_STORAGE";
pub const ENV_POLL_INTERVAL_SECS: &str = "INBOX_POLL_INTERVAL_SECS";
pub const ENV_FETCH_DELAY_MS: &str = "INBOX_FETCH_DELAY_MS";
pub const ENV_POLL_BATCH: &str = "INBOX_POLL_BATCH";
pub const ENV_BULK_BATCH: &str = "INBOX_BULK_BATCH";
pub const ENV_LOG_JSON: &str = "INBOX_LOG_JSON";

/// Which `KeyValueStore` backend holds the message collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(AppError::Config(format!(
                "{ENV_STORAGE} must be 'sqlite' or 'memory', got '{other}'"
            ))),
        }
    }
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
    /// Period of the poll loop after the immediate first cycle.
    pub poll_interval: Duration,
    /// Simulated server latency awaited before each fetch.
    pub fetch_delay: Duration,
    /// Records synthesized per poll cycle after the seed set.
    pub poll_batch_size: usize,
    /// Records produced by `simulateAdminSendingMessages`.
    pub bulk_batch_size: usize,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("inbox-data"),
            storage: StorageBackend::Sqlite,
            poll_interval: Duration::from_secs(10),
            fetch_delay: Duration::from_millis(2000),
            poll_batch_size: 1,
            bulk_batch_size: 5,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Load from the process environment, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve every setting through `lookup`, falling back to defaults for
    /// unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup(ENV_DATA_DIR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let storage = match lookup(ENV_STORAGE) {
            Some(v) => v.parse()?,
            None => defaults.storage,
        };

        let poll_interval = match parse_number::<u64>(&lookup, ENV_POLL_INTERVAL_SECS)? {
            Some(0) => {
                return Err(AppError::Config(format!(
                    "{ENV_POLL_INTERVAL_SECS} must be greater than zero"
                )))
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.poll_interval,
        };

        let fetch_delay = parse_number::<u64>(&lookup, ENV_FETCH_DELAY_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.fetch_delay);

        let poll_batch_size =
            parse_number::<usize>(&lookup, ENV_POLL_BATCH)?.unwrap_or(defaults.poll_batch_size);
        let bulk_batch_size =
            parse_number::<usize>(&lookup, ENV_BULK_BATCH)?.unwrap_or(defaults.bulk_batch_size);

        let log_json = lookup(ENV_LOG_JSON)
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(defaults.log_json);

        Ok(Self {
            data_dir,
            storage,
            poll_interval,
            fetch_delay,
            poll_batch_size,
            bulk_batch_size,
            log_json,
        })
    }
}

fn parse_number<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{key} must be a non-negative integer, got '{raw}'"))),
        None => Ok(None),
    }
}
