//! SQLite-backed cache-locality store for the forgepool scheduler
//!
//! The scheduler persists exactly one thing across restarts: which workers
//! have accepted items with which cache hints. This crate implements the
//! [`CacheDao`](forgepool_core::CacheDao) trait over a single SQLite table;
//! everything else in the scheduler is volatile by design.

mod sqlite;

pub use sqlite::SqliteCacheDao;
