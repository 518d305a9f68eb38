//! Named pool collection
//!
//! The admin and submission facades address pools by name; [`Pools`] hands
//! them out, creating each pool lazily over the shared cache store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::CacheDao;
use crate::config::PoolConfig;
use crate::item::WorkItem;
use crate::pool::Pool;

/// Collection of named pools sharing one cache store and configuration.
pub struct Pools<I: WorkItem> {
    dao: Arc<dyn CacheDao>,
    config: PoolConfig,
    pools: Mutex<HashMap<String, Pool<I>>>,
}

impl<I: WorkItem> Pools<I> {
    pub fn new(dao: Arc<dyn CacheDao>, config: PoolConfig) -> Self {
        Self {
            dao,
            config,
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Names of all known pools, ascending.
    pub fn pools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up an existing pool.
    pub fn pool(&self, name: &str) -> Option<Pool<I>> {
        self.pools.lock().get(name).cloned()
    }

    /// Look up a pool, creating it on first use.
    pub fn get_or_create(&self, name: &str) -> Pool<I> {
        self.pools
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Pool::new(name, Arc::clone(&self.dao), self.config.clone()))
            .clone()
    }
}
