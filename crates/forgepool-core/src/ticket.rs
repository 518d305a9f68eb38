//! Submission handles
//!
//! [`Pool::submit`](crate::Pool::submit) returns a [`Ticket`]: the
//! submitter's view of a queued item. The ticket can cancel the item as long
//! as it still sits in a queue, and resolves into the worker-installed job
//! capability once a worker accepts it.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::CancelError;
use crate::item::WorkItem;
use crate::pool::PoolShared;

/// Identity of a submission within its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId(u64);

impl TicketId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ticket-{}", self.0)
    }
}

/// Handle to a queued submission.
///
/// A live ticket sits in exactly one queue (the pool backlog or a single
/// worker's queue) and can be detached from wherever it currently lives via
/// [`Ticket::cancel`]. Once a worker accepts the item, the ticket is out of
/// the scheduler's hands and `cancel` reports [`CancelError::NotQueued`].
pub struct Ticket<I: WorkItem> {
    pub(crate) shared: Arc<PoolShared<I>>,
    pub(crate) id: TicketId,
    pub(crate) urgent: bool,
    pub(crate) job_rx: watch::Receiver<Option<I::Job>>,
}

impl<I: WorkItem> Ticket<I> {
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// Whether the item was submitted as urgent. Fixed at submission.
    pub fn urgent(&self) -> bool {
        self.urgent
    }

    /// Detach the item from whichever queue currently holds it.
    ///
    /// Succeeds exactly once; a ticket that was already accepted or already
    /// cancelled reports [`CancelError::NotQueued`].
    pub fn cancel(&self) -> Result<(), CancelError> {
        self.shared.cancel_ticket(self.id)
    }

    /// Wait for the item to be accepted by a worker and return the job
    /// capability that worker installed. Returns `None` if the ticket was
    /// cancelled first.
    pub async fn await_job(&self) -> Option<I::Job> {
        let mut rx = self.job_rx.clone();
        let result = rx.wait_for(|job| job.is_some()).await;
        match result {
            Ok(job) => job.clone(),
            // Sender dropped without a job: the ticket was cancelled.
            Err(_) => None,
        }
    }
}

impl<I: WorkItem> Clone for Ticket<I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            id: self.id,
            urgent: self.urgent,
            job_rx: self.job_rx.clone(),
        }
    }
}

impl<I: WorkItem> fmt::Debug for Ticket<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("id", &self.id)
            .field("urgent", &self.urgent)
            .finish()
    }
}
