pub mod auth;
pub mod database;
pub mod email;
pub mod push;
pub mod reminder;
pub mod server;
pub mod storage;

use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub auth: auth::AuthConfig,
    pub email: email::EmailConfig,
    pub push: push::PushConfig,
    pub storage: storage::StorageConfig,
    pub reminder: reminder::ReminderConfig,

    /// Upper bound for every call to storage, push or email providers
    pub provider_timeout: Duration,

    // Logging
    pub log_level: String,
    pub version: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: server::ServerConfig::from_env(),
            database: database::DatabaseConfig::from_env(),
            auth: auth::AuthConfig::from_env(),
            email: email::EmailConfig::from_env(),
            push: push::PushConfig::from_env(),
            storage: storage::StorageConfig::from_env(),
            reminder: reminder::ReminderConfig::from_env(),

            provider_timeout: Duration::from_secs(
                env::var("CASEDESK_PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),

            log_level: env::var("CASEDESK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Read an optional, non-empty environment variable
pub(crate) fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read a boolean environment variable ("true"/"false", case-insensitive)
pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(default)
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
