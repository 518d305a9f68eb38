//! Pool counters and gauges
//!
//! Lock-free accounting for the scheduler. Exposition formatting is not this
//! crate's concern; [`PoolMetrics::snapshot`] hands a serializable view to
//! whatever layer formats it.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use serde::Serialize;

/// Counters and gauges for a single pool.
///
/// Gauges track population (connected, paused, parked-ready workers and the
/// two backlog depths); counters only ever grow. Uses atomic operations for
/// thread-safe access without locks.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    submitted: AtomicU64,
    accepted: AtomicU64,
    cancelled: AtomicU64,
    workers_connected: AtomicI64,
    workers_paused: AtomicI64,
    workers_ready: AtomicI64,
    backlog_high: AtomicI64,
    backlog_low: AtomicI64,
}

/// Point-in-time view of a pool's metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub submitted: u64,
    pub accepted: u64,
    pub cancelled: u64,
    pub workers_connected: i64,
    pub workers_paused: i64,
    pub workers_ready: i64,
    pub backlog_high: i64,
    pub backlog_low: i64,
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ticket_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ticket_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn worker_connected(&self) {
        self.workers_connected.fetch_add(1, Ordering::Relaxed);
    }

    /// A worker left the pool for good. It counted as paused until now.
    pub fn worker_released(&self) {
        self.workers_connected.fetch_sub(1, Ordering::Relaxed);
        self.workers_paused.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn worker_paused(&self) {
        self.workers_paused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn worker_resumed(&self) {
        self.workers_paused.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn worker_parked(&self) {
        self.workers_ready.fetch_add(1, Ordering::Relaxed);
    }

    pub fn worker_unparked(&self) {
        self.workers_ready.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn backlog_grew(&self, urgent: bool) {
        self.backlog_gauge(urgent).fetch_add(1, Ordering::Relaxed);
    }

    pub fn backlog_shrank(&self, urgent: bool) {
        self.backlog_gauge(urgent).fetch_sub(1, Ordering::Relaxed);
    }

    fn backlog_gauge(&self, urgent: bool) -> &AtomicI64 {
        if urgent {
            &self.backlog_high
        } else {
            &self.backlog_low
        }
    }

    /// Take a point-in-time snapshot of every counter and gauge.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            workers_connected: self.workers_connected.load(Ordering::Relaxed),
            workers_paused: self.workers_paused.load(Ordering::Relaxed),
            workers_ready: self.workers_ready.load(Ordering::Relaxed),
            backlog_high: self.backlog_high.load(Ordering::Relaxed),
            backlog_low: self.backlog_low.load(Ordering::Relaxed),
        }
    }
}
