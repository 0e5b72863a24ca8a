use crate::db::{MemoryStorage, SqliteStorage, Storage};
use crate::error::{ConfigError, StorageError};
use crate::tally::{IncrementMode, TallyStore};
use log::info;
use std::env;
use std::sync::Arc;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CAS_MAX_RETRIES: u32 = 3;

/// Host-side settings for the tally store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// SQLite URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub increment_mode: IncrementMode,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            increment_mode: IncrementMode::LastWriteWins,
        }
    }
}

impl WidgetConfig {
    /// Loads `.env` if present, then reads `DATABASE_URL`,
    /// `POLL_DB_MAX_CONNECTIONS`, `POLL_INCREMENT_MODE` and
    /// `POLL_CAS_MAX_RETRIES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let max_connections = match lookup("POLL_DB_MAX_CONNECTIONS") {
            Some(raw) => parse_count("POLL_DB_MAX_CONNECTIONS", &raw, 1)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let max_retries = match lookup("POLL_CAS_MAX_RETRIES") {
            Some(raw) => parse_count("POLL_CAS_MAX_RETRIES", &raw, 0)?,
            None => DEFAULT_CAS_MAX_RETRIES,
        };

        let increment_mode = match lookup("POLL_INCREMENT_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("lww") => IncrementMode::LastWriteWins,
            Some("cas") => IncrementMode::CompareAndSwap { max_retries },
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "POLL_INCREMENT_MODE",
                    value: other.to_string(),
                    reason: "expected 'lww' or 'cas'".to_string(),
                });
            }
        };

        Ok(Self {
            database_url,
            max_connections,
            increment_mode,
        })
    }
}

fn parse_count(key: &'static str, raw: &str, min: u32) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason,
    };
    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|e| invalid(e.to_string()))?;
    if value < min {
        return Err(invalid(format!("must be at least {}", min)));
    }
    Ok(value)
}

/// Opens the configured backend and wraps it in a tally store.
pub async fn build_store(config: &WidgetConfig) -> Result<TallyStore, StorageError> {
    let storage: Arc<dyn Storage> = match &config.database_url {
        Some(url) => {
            info!("Using SQLite tally storage at {}", url);
            Arc::new(SqliteStorage::connect(url, config.max_connections).await?)
        }
        None => {
            info!("No DATABASE_URL set, using in-memory tally storage");
            Arc::new(MemoryStorage::new())
        }
    };

    Ok(TallyStore::new(storage).with_mode(config.increment_mode))
}
