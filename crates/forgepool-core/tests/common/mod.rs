//! Shared fixtures for the scheduler integration tests.
#![allow(dead_code)]

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use forgepool_core::{CostEstimate, MemoryCacheDao, Pool, PoolConfig, Ticket, WorkItem, WorkerQueue};

/// A build job as the scheduler sees it. The job capability is the name of
/// the worker that accepted the item, which is what the assertions check.
#[derive(Debug)]
pub struct Build {
    pub name: &'static str,
    pub hint: String,
    pub cost: CostEstimate,
}

impl Build {
    /// A job with a locality hint and the default 1/10 cost split.
    pub fn hinted(name: &'static str, hint: &str) -> Self {
        Self {
            name,
            hint: hint.to_string(),
            cost: CostEstimate::new(1, 10),
        }
    }

    /// A job with no locality preference.
    pub fn plain(name: &'static str) -> Self {
        Self::hinted(name, "")
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl WorkItem for Build {
    type Job = String;

    fn cache_hint(&self) -> &str {
        &self.hint
    }

    fn cost_estimate(&self) -> CostEstimate {
        self.cost
    }
}

pub fn test_pool() -> Pool<Build> {
    pool_on(Arc::new(MemoryCacheDao::new()))
}

pub fn pool_on(dao: Arc<MemoryCacheDao>) -> Pool<Build> {
    Pool::new("default", dao, PoolConfig::default())
}

/// Register a worker and activate it.
pub fn active_worker(pool: &Pool<Build>, name: &str) -> WorkerQueue<Build> {
    let worker = pool.register(name).unwrap();
    worker.set_active(true).unwrap();
    worker
}

/// Pop with a guard against the scheduler wedging; the item must already be
/// available or become available without further test input.
pub async fn pop_now(worker: &WorkerQueue<Build>) -> Build {
    tokio::time::timeout(Duration::from_secs(5), worker.pop(worker.name().to_string()))
        .await
        .expect("pop should complete")
        .expect("worker should not be finished")
}

/// The worker that accepted the ticket's item.
pub async fn assigned_to(ticket: &Ticket<Build>) -> String {
    tokio::time::timeout(Duration::from_secs(5), ticket.await_job())
        .await
        .expect("ticket should be accepted")
        .expect("ticket should not be cancelled")
}

/// Let spawned pop tasks run up to their suspension points.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
