use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    /// Seconds between scheduled replay runs.
    pub sync_interval: u64,
    /// Re-queue `error` records automatically before each scheduled run.
    pub auto_retry_failed: bool,
    /// Minimum age of the last failure before an automatic re-queue.
    pub retry_backoff_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/offline.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 300, // 5 minutes
                auto_retry_failed: false,
                retry_backoff_secs: 60,
            },
            logging: LoggingConfig {
                filter: "offline_sync=debug,info".to_string(),
                json: false,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("OFFLINE_SYNC_DATABASE_URL") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.database.url = trimmed.to_string();
            }
        }
        if let Some(value) = lookup("OFFLINE_SYNC_MAX_CONNECTIONS").and_then(|v| parse_u32(&v)) {
            cfg.database.max_connections = value;
        }
        if let Some(value) = lookup("OFFLINE_SYNC_CONNECTION_TIMEOUT").and_then(|v| parse_u64(&v))
        {
            cfg.database.connection_timeout = value;
        }

        if let Some(v) = lookup("OFFLINE_SYNC_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Some(value) = lookup("OFFLINE_SYNC_INTERVAL_SECS").and_then(|v| parse_u64(&v)) {
            cfg.sync.sync_interval = value.max(1);
        }
        if let Some(v) = lookup("OFFLINE_SYNC_AUTO_RETRY") {
            cfg.sync.auto_retry_failed = parse_bool(&v, cfg.sync.auto_retry_failed);
        }
        if let Some(value) = lookup("OFFLINE_SYNC_RETRY_BACKOFF_SECS").and_then(|v| parse_u64(&v))
        {
            cfg.sync.retry_backoff_secs = value;
        }

        if let Some(v) = lookup("OFFLINE_SYNC_LOG") {
            if !v.trim().is_empty() {
                cfg.logging.filter = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("OFFLINE_SYNC_LOG_JSON") {
            cfg.logging.json = parse_bool(&v, cfg.logging.json);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.sync.auto_sync && self.sync.sync_interval == 0 {
            return Err("Sync sync_interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
