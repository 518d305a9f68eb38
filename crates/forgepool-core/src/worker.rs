//! Worker records and the worker-facing queue handle
//!
//! Each registered worker is a [`WorkerRecord`]: a run-state machine plus a
//! shutdown latch and the workload accounting for its assigned queue. The
//! state is a true sum type; there is no "running" flag with a
//! conditionally-valid queue pointer.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Notify;

use crate::error::{AdminError, PopError};
use crate::item::WorkItem;
use crate::pool::PoolShared;
use crate::ticket::TicketId;

/// Entries assigned to a worker: `(cost, ticket)`, newest at the front,
/// consumed from the rear.
pub(crate) type AssignedQueue = VecDeque<(u32, TicketId)>;

/// Run state of a registered worker.
pub(crate) enum WorkerState {
    /// Not pulling work. `ready` wakes the parked pop loop when the worker
    /// is reactivated or finalized.
    Inactive { ready: Arc<Notify> },
    /// Pulling work. `cond` wakes the pop loop when an assignment lands in
    /// `queue` or the state changes out from under it.
    Running {
        queue: AssignedQueue,
        cond: Arc<Notify>,
    },
    /// Terminal. Entered from `Inactive` via release; the record leaves the
    /// worker map in the same step.
    Finished,
}

impl WorkerState {
    pub(crate) fn inactive() -> Self {
        Self::Inactive {
            ready: Arc::new(Notify::new()),
        }
    }

    pub(crate) fn running() -> Self {
        Self::Running {
            queue: VecDeque::new(),
            cond: Arc::new(Notify::new()),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    fn kind(&self) -> WorkerStateKind {
        match self {
            Self::Inactive { .. } => WorkerStateKind::Inactive,
            Self::Running { .. } => WorkerStateKind::Running,
            Self::Finished => WorkerStateKind::Finished,
        }
    }
}

/// A worker as tracked by its pool.
pub(crate) struct WorkerRecord {
    pub(crate) state: WorkerState,
    /// Once set, the worker may never return to `Running`.
    pub(crate) shutdown: bool,
    /// Sum of the cost fields of every entry currently assigned.
    pub(crate) workload: u64,
    pub(crate) registered_at: DateTime<Utc>,
}

impl WorkerRecord {
    pub(crate) fn new() -> Self {
        Self {
            state: WorkerState::inactive(),
            shutdown: false,
            workload: 0,
            registered_at: Utc::now(),
        }
    }

    pub(crate) fn status(&self, name: &str) -> WorkerStatus {
        let queued = match &self.state {
            WorkerState::Running { queue, .. } => queue.len(),
            _ => 0,
        };
        WorkerStatus {
            name: name.to_string(),
            state: self.state.kind(),
            shutdown: self.shutdown,
            workload: self.workload,
            queued,
            registered_at: self.registered_at,
        }
    }
}

/// Serializable worker state for admin views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStateKind {
    Inactive,
    Running,
    Finished,
}

/// Point-in-time view of a single worker.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub name: String,
    pub state: WorkerStateKind,
    pub shutdown: bool,
    pub workload: u64,
    pub queued: usize,
    pub registered_at: DateTime<Utc>,
}

/// Worker-side handle returned by [`Pool::register`](crate::Pool::register).
///
/// The handle is cheap to clone; the usual shape is one task looping on
/// [`WorkerQueue::pop`] while the connection layer holds a clone for
/// lifecycle calls.
pub struct WorkerQueue<I: WorkItem> {
    pub(crate) shared: Arc<PoolShared<I>>,
    pub(crate) name: String,
}

impl<I: WorkItem> WorkerQueue<I> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pull the next item for this worker.
    ///
    /// Drains the worker's own queue first, then the pool backlog. Suspends
    /// while the pool is paused, the worker is inactive, or no work exists.
    /// `job` is the external job capability handed to the submitter when
    /// this worker accepts an item.
    pub async fn pop(&self, job: I::Job) -> Result<I, PopError> {
        self.shared.pop_worker(&self.name, job).await
    }

    /// Activate or deactivate this worker. Deactivation re-parks any
    /// assigned items; activation on a shut-down worker is ignored.
    pub fn set_active(&self, active: bool) -> Result<(), AdminError> {
        self.shared.set_worker_active(&self.name, active)
    }

    /// Latch the shutdown flag and deactivate. The worker can never be
    /// activated again.
    pub fn shutdown(&self) -> Result<(), AdminError> {
        self.shared.shutdown_worker(&self.name)
    }

    /// Finalize the worker: re-park anything still assigned, drop it from
    /// the pool, and fail its parked pop with [`PopError::Finished`].
    ///
    /// # Panics
    ///
    /// Releasing a worker twice is a programmer error and panics.
    pub fn release(&self) {
        self.shared.release_worker(&self.name);
    }
}

impl<I: WorkItem> Clone for WorkerQueue<I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            name: self.name.clone(),
        }
    }
}

impl<I: WorkItem> fmt::Debug for WorkerQueue<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerQueue")
            .field("name", &self.name)
            .finish()
    }
}
