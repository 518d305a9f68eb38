//! Pool configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pool configuration
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use forgepool_core::PoolConfig;
///
/// let config = PoolConfig::default()
///     .with_cache_db_path("/var/lib/forgepool/cache.db")
///     .with_update_reconnect_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Where the cache-locality database lives. Consumed by the storage
    /// crate's open helper; the scheduler core never touches the filesystem
    /// itself.
    pub cache_db_path: PathBuf,

    /// How long an admin-initiated self-update waits for the worker to
    /// reconnect under the same name before giving up.
    #[serde(with = "millis")]
    pub update_reconnect_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            cache_db_path: PathBuf::from("forgepool.db"),
            update_reconnect_timeout: Duration::from_secs(600),
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache database path.
    pub fn with_cache_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_db_path = path.into();
        self
    }

    /// Set the self-update reconnect timeout.
    pub fn with_update_reconnect_timeout(mut self, timeout: Duration) -> Self {
        self.update_reconnect_timeout = timeout;
        self
    }
}

/// Duration fields travel as integer milliseconds.
mod millis {
    use std::time::Duration;

    use serde::de::Deserialize;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
