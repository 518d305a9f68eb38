//! Error kinds returned by the scheduler core
//!
//! Internal misuse (releasing a worker twice, enqueueing onto a worker that
//! is not running) is a programmer error and panics; everything here is
//! returned to the caller and logged, with no automatic retries.

use std::time::Duration;

/// Errors from [`Pool::register`](crate::Pool::register).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    /// The worker name is already present in the pool's worker map.
    #[error("worker name already registered: {0}")]
    NameTaken(String),
}

/// Errors from [`WorkerQueue::pop`](crate::WorkerQueue::pop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PopError {
    /// The worker has been released; no further work will be delivered.
    #[error("worker has been released")]
    Finished,
}

/// Errors from [`Ticket::cancel`](crate::Ticket::cancel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CancelError {
    /// The ticket is not sitting in any queue: it was already accepted by a
    /// worker, or already cancelled.
    #[error("ticket is not queued")]
    NotQueued,
}

/// Errors from the admin-facing pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    /// The named worker is not in the pool.
    #[error("unknown worker: {0}")]
    UnknownWorker(String),

    /// A worker asked to self-update did not reconnect in time.
    #[error("worker did not reconnect within {0:?}")]
    UpdateTimeout(Duration),
}
