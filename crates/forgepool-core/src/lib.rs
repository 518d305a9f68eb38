//! # forgepool scheduler core
//!
//! The scheduling heart of a build cluster: accepts job submissions, spreads
//! them across a dynamic population of worker agents, and biases placement
//! toward workers that already hold relevant cached state.
//!
//! ## Features
//!
//! - **Two-priority backlog**: urgent work jumps the line; re-parked work
//!   keeps its place
//! - **Cache-aware placement**: workers that have seen a hint before are
//!   preferred, up to a workload cap that keeps cold workers useful
//! - **Lossless worker churn**: deactivating or releasing a worker re-parks
//!   its assigned items without dropping or duplicating any
//! - **Pool-wide pause gate**: one switch stops every worker's pop loop
//!   without touching the queues
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Pool                                 │
//! │  (placement policy, worker lifecycle, pause gate, metrics)  │
//! └─────────────────────────────────────────────────────────────┘
//!        │                    │                      │
//!        ▼                    ▼                      ▼
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │   Backlog    │   │  Worker queues   │   │    CacheDao      │
//! │ (high / low) │   │ (cost, ticket)…  │   │ (pool,hint,worker)│
//! └──────────────┘   └──────────────────┘   └──────────────────┘
//! ```
//!
//! Submitters call [`Pool::submit`] and hold a [`Ticket`]; workers call
//! [`Pool::register`] and loop on [`WorkerQueue::pop`]. Only the cache
//! store outlives a restart (see the `forgepool-storage` crate); in-flight
//! tickets and registrations are volatile.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use forgepool_core::{MemoryCacheDao, Pool, PoolConfig};
//!
//! let pool = Pool::new("default", Arc::new(MemoryCacheDao::new()), PoolConfig::default());
//!
//! let worker = pool.register("worker-1")?;
//! worker.set_active(true)?;
//!
//! let ticket = pool.submit(false, my_build);
//! let item = worker.pop(job_capability).await?;
//! ```

mod backlog;

pub mod cache;
pub mod config;
pub mod error;
pub mod gate;
pub mod item;
pub mod metrics;
pub mod pool;
pub mod registry;
pub mod ticket;
pub mod worker;

/// Prelude for common imports
pub mod prelude {
    pub use crate::cache::{CacheDao, CacheError, MemoryCacheDao};
    pub use crate::config::PoolConfig;
    pub use crate::error::{AdminError, CancelError, PopError, RegisterError};
    pub use crate::gate::ActiveGate;
    pub use crate::item::{CostEstimate, WorkItem};
    pub use crate::metrics::MetricsSnapshot;
    pub use crate::pool::{Pool, PoolStatus};
    pub use crate::registry::Pools;
    pub use crate::ticket::{Ticket, TicketId};
    pub use crate::worker::{WorkerQueue, WorkerStateKind, WorkerStatus};
}

// Re-export key types at crate root
pub use cache::{CacheDao, CacheError, MemoryCacheDao};
pub use config::PoolConfig;
pub use error::{AdminError, CancelError, PopError, RegisterError};
pub use gate::ActiveGate;
pub use item::{CostEstimate, WorkItem};
pub use metrics::{MetricsSnapshot, PoolMetrics};
pub use pool::{Pool, PoolStatus};
pub use registry::Pools;
pub use ticket::{Ticket, TicketId};
pub use worker::{WorkerQueue, WorkerStateKind, WorkerStatus};
