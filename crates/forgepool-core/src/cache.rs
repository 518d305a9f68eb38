//! Cache-locality store
//!
//! The only state that survives a scheduler restart: which workers have
//! accepted items with which cache hints. The trait is synchronous on
//! purpose: placement consults it from suspension-free critical sections
//! (`submit` must never block on a worker or a future), so implementations
//! are expected to answer without yielding. The SQLite implementation lives
//! in the `forgepool-storage` crate; [`MemoryCacheDao`] here backs tests and
//! single-process deployments that can afford to lose locality on restart.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// Error type for cache store operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The backing store failed.
    #[error("cache store error: {0}")]
    Store(String),
}

/// Persisted set of `(pool, cache_hint, worker)` rows.
///
/// `mark_cached` is insert-or-replace; `query_cache` answers "which workers
/// have ever been marked for this hint?" in worker-name order, which is the
/// tie-break order for preferred placement.
pub trait CacheDao: Send + Sync {
    /// Record that `worker` has relevant state for `hint`, refreshing the
    /// row's timestamp if it already exists.
    fn mark_cached(&self, pool: &str, hint: &str, worker: &str) -> Result<(), CacheError>;

    /// All workers ever marked for `hint` in this pool, name-ascending.
    fn query_cache(&self, pool: &str, hint: &str) -> Result<Vec<String>, CacheError>;
}

/// In-memory cache store.
///
/// Provides the same semantics as the SQLite implementation without the
/// persistence. Rows are keyed `(pool, hint) -> worker -> created`.
#[derive(Debug, Default)]
pub struct MemoryCacheDao {
    rows: RwLock<BTreeMap<(String, String), BTreeMap<String, DateTime<Utc>>>>,
}

impl MemoryCacheDao {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct `(pool, hint, worker)` rows.
    pub fn row_count(&self) -> usize {
        self.rows.read().values().map(BTreeMap::len).sum()
    }
}

impl CacheDao for MemoryCacheDao {
    fn mark_cached(&self, pool: &str, hint: &str, worker: &str) -> Result<(), CacheError> {
        self.rows
            .write()
            .entry((pool.to_string(), hint.to_string()))
            .or_default()
            .insert(worker.to_string(), Utc::now());
        Ok(())
    }

    fn query_cache(&self, pool: &str, hint: &str) -> Result<Vec<String>, CacheError> {
        Ok(self
            .rows
            .read()
            .get(&(pool.to_string(), hint.to_string()))
            .map(|workers| workers.keys().cloned().collect())
            .unwrap_or_default())
    }
}
