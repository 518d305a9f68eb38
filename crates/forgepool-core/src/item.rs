//! Work item contract
//!
//! The scheduler is generic over the payload it schedules. Submitters supply
//! any type implementing [`WorkItem`]; the scheduler only ever consults the
//! cache hint and the cost estimate, and hands the payload back untouched to
//! the accepting worker.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Expected duration of a build in the two cache regimes.
///
/// Costs are abstract non-negative weights (seconds in practice). The
/// `non_cached` figure doubles as the locality cap: a cache-warm worker whose
/// queued workload already exceeds it is no better than a cold worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Expected duration on a worker that already holds the hinted state.
    pub cached: u32,
    /// Expected duration on a cold worker.
    pub non_cached: u32,
}

impl CostEstimate {
    /// Create a cost estimate from the two regime durations.
    pub fn new(cached: u32, non_cached: u32) -> Self {
        Self { cached, non_cached }
    }

    /// A cost estimate with no cache advantage.
    pub fn uniform(cost: u32) -> Self {
        Self {
            cached: cost,
            non_cached: cost,
        }
    }
}

/// A schedulable payload.
///
/// Implementors carry whatever the worker needs to run the build; the
/// scheduler only reads the two derived attributes below. The `Display`
/// form is used in logs.
pub trait WorkItem: fmt::Display + Send + 'static {
    /// External job capability installed by the accepting worker and handed
    /// to the submitter through [`Ticket::await_job`](crate::Ticket::await_job).
    type Job: Clone + Send + Sync + 'static;

    /// Opaque locality hint. Workers that previously accepted items with the
    /// same hint are assumed to hold relevant cached state. Empty means no
    /// preference.
    fn cache_hint(&self) -> &str;

    /// Expected durations in the cached and non-cached regimes.
    fn cost_estimate(&self) -> CostEstimate;
}
