//! Application configuration
//!
//! Sections mirror `config/default.toml`; every field has a default so a
//! partial override file is enough.

mod loader;

pub use loader::load_config;

use prodboard_store::StoreConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[database]` section
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file, created on first use
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_max_sequence_retries")]
    pub max_sequence_retries: u32,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/prodboard.db")
}

fn default_max_connections() -> u32 {
    StoreConfig::default().max_connections
}

fn default_busy_timeout_ms() -> u64 {
    StoreConfig::default().busy_timeout_ms
}

fn default_max_sequence_retries() -> u32 {
    StoreConfig::default().max_sequence_retries
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
            max_sequence_retries: default_max_sequence_retries(),
        }
    }
}

impl DatabaseConfig {
    /// Store tuning derived from this section.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_connections: self.max_connections,
            busy_timeout_ms: self.busy_timeout_ms,
            max_sequence_retries: self.max_sequence_retries,
        }
    }
}

/// `[auth]` section
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Server-wide secret mixed into credential hashes
    #[serde(default = "default_secret")]
    pub secret: String,
}

fn default_secret() -> String {
    "secret".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "prodboard=info,prodboard_store=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let config: AppConfig = ::config::Config::builder()
            .add_source(::config::File::from_str(
                loader::DEFAULT_CONFIG,
                ::config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.database.path, PathBuf::from("data/prodboard.db"));
        assert_eq!(config.database.max_sequence_retries, 5);
        assert_eq!(config.auth.secret, "secret");
        assert_eq!(config.logging.filter, "prodboard=info,prodboard_store=info");
    }

    #[test]
    fn test_store_config_carries_database_section() {
        let db = DatabaseConfig {
            max_connections: 2,
            busy_timeout_ms: 250,
            ..DatabaseConfig::default()
        };
        let store = db.store_config();
        assert_eq!(store.max_connections, 2);
        assert_eq!(store.busy_timeout_ms, 250);
        assert_eq!(store.max_sequence_retries, 5);
    }
}
