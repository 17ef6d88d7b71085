//! Store tuning knobs, deserializable from the `[database]` config section.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection and retry settings for [`WorkspaceStore`](crate::WorkspaceStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Pool size for file-backed databases
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// How long a writer waits for the SQLite write lock
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Attempts at assigning a fresh item ID before giving up
    #[serde(default = "default_max_sequence_retries")]
    pub max_sequence_retries: u32,
}

fn default_max_connections() -> u32 {
    5
}
fn default_busy_timeout_ms() -> u64 {
    5_000
}
fn default_max_sequence_retries() -> u32 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
            max_sequence_retries: default_max_sequence_retries(),
        }
    }
}

impl StoreConfig {
    /// Busy timeout as a [`Duration`].
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: StoreConfig = serde_json::from_str(r#"{"max_connections": 2}"#).unwrap();
        assert_eq!(cfg.max_connections, 2);
        assert_eq!(cfg.busy_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.max_sequence_retries, 5);
    }
}
