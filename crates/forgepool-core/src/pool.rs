//! The pool scheduler
//!
//! A [`Pool`] owns the backlog, the worker map and the pause gate, and
//! implements the placement policy: submitted items go straight to a waiting
//! worker when one exists, preferring cache-warm workers up to a workload
//! cap, and land in the two-priority backlog otherwise. Workers pull through
//! [`WorkerQueue::pop`], which drains the worker's own queue first and then
//! the backlog, possibly steering a backlog item onto a different,
//! cache-warm worker and continuing to look.
//!
//! Every mutation happens inside a single suspension-free critical section
//! under one lock; `pop` suspends only at the pause gate, on its inactive
//! signal, or parked on its wake cond. That is what keeps the placement
//! invariants (workload accounting, single-queue ticket membership, "parked
//! workers and backlog are never both non-empty") intact without finer
//! locking.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

use crate::backlog::Backlog;
use crate::cache::CacheDao;
use crate::config::PoolConfig;
use crate::error::{AdminError, CancelError, PopError, RegisterError};
use crate::gate::ActiveGate;
use crate::item::{CostEstimate, WorkItem};
use crate::metrics::{MetricsSnapshot, PoolMetrics};
use crate::ticket::{Ticket, TicketId};
use crate::worker::{WorkerQueue, WorkerRecord, WorkerState, WorkerStatus};

/// Removes a ticket from whichever queue currently holds it and settles the
/// affected gauges. Present on a ticket exactly while it sits in a queue.
type DetachHook<I> = Box<dyn FnOnce(&mut PoolInner<I>, &PoolMetrics) + Send>;

/// Scheduler-side state of a submitted item.
struct TicketEntry<I: WorkItem> {
    item: I,
    urgent: bool,
    hint: String,
    cost: CostEstimate,
    job_tx: watch::Sender<Option<<I as WorkItem>::Job>>,
    detach: Option<DetachHook<I>>,
}

/// Where unassigned work meets idle workers. At most one side is non-empty.
enum Placement {
    /// No worker is waiting; items queue here.
    Backlog(Backlog),
    /// The backlog is empty; workers that found nothing park here, longest
    /// waiting at the front.
    Ready(VecDeque<String>),
}

struct PoolInner<I: WorkItem> {
    main: Placement,
    workers: HashMap<String, WorkerRecord>,
    tickets: HashMap<TicketId, TicketEntry<I>>,
    next_ticket: u64,
    /// Self-update waits, keyed by worker name, fired on re-registration.
    reconnects: HashMap<String, watch::Sender<bool>>,
}

pub(crate) struct PoolShared<I: WorkItem> {
    name: String,
    config: PoolConfig,
    dao: Arc<dyn CacheDao>,
    gate: ActiveGate,
    metrics: PoolMetrics,
    inner: Mutex<PoolInner<I>>,
}

/// Outcome of one locked pop iteration.
enum PopStep<I: WorkItem> {
    Deliver(I),
    Finished,
    Retry,
    WaitReady(Arc<Notify>),
    Park(Arc<Notify>),
}

impl<I: WorkItem> PoolShared<I> {
    // ------------------------------------------------------------------
    // Submission and placement
    // ------------------------------------------------------------------

    fn submit(shared: &Arc<Self>, urgent: bool, item: I) -> Ticket<I> {
        let (job_tx, job_rx) = watch::channel(None);
        let mut inner = shared.inner.lock();
        let id = TicketId::from_raw(inner.next_ticket);
        inner.next_ticket += 1;
        let entry = TicketEntry {
            hint: item.cache_hint().to_string(),
            cost: item.cost_estimate(),
            urgent,
            job_tx,
            detach: None,
            item,
        };
        debug!(pool = %shared.name, ticket = %id, urgent, item = %entry.item, "item submitted");
        inner.tickets.insert(id, entry);
        shared.metrics.ticket_submitted();
        shared.add(&mut inner, id);
        drop(inner);
        Ticket {
            shared: Arc::clone(shared),
            id,
            urgent,
            job_rx,
        }
    }

    /// Place a ticket: hand it to a waiting worker if one exists and policy
    /// allows, park it in the backlog otherwise.
    fn add(&self, inner: &mut PoolInner<I>, id: TicketId) {
        loop {
            match &mut inner.main {
                Placement::Backlog(_) => {
                    self.park_in_backlog(inner, id, false);
                    return;
                }
                Placement::Ready(ready) if ready.is_empty() => {
                    inner.main = Placement::Backlog(Backlog::new());
                }
                Placement::Ready(_) => {
                    if self.assign_preferred(inner, id) {
                        return;
                    }
                    let worker = {
                        let Placement::Ready(ready) = &mut inner.main else {
                            unreachable!("placement checked above")
                        };
                        ready.pop_front()
                    };
                    let Some(worker) = worker else { continue };
                    // The ready list may hold entries for workers that have
                    // since been deactivated or released; those are dropped
                    // here and the parked-ready gauge is settled by the
                    // worker's own pop loop when it wakes.
                    let running = inner
                        .workers
                        .get(&worker)
                        .is_some_and(|rec| rec.state.is_running());
                    if !running {
                        debug!(pool = %self.name, worker = %worker, "dropping stale ready entry");
                        continue;
                    }
                    let (cost, hint) = {
                        let entry = inner.tickets.get(&id).expect("placed ticket is tracked");
                        (entry.cost, entry.hint.clone())
                    };
                    let cond = self.enqueue_assigned(inner, &worker, cost.non_cached, id);
                    self.mark_cached(&hint, &worker);
                    cond.notify_one();
                    return;
                }
            }
        }
    }

    /// Try to steer a ticket onto a cache-warm worker.
    ///
    /// Queries the cache store for workers that have seen this hint and
    /// picks the most loaded running one whose workload does not exceed the
    /// ticket's non-cached cost: packing work onto already-warm workers up
    /// to the point where a cold worker would finish sooner. Does not mark
    /// the hint again; the target is already known to hold it.
    fn assign_preferred(&self, inner: &mut PoolInner<I>, id: TicketId) -> bool {
        let (hint, cost) = {
            let entry = inner.tickets.get(&id).expect("placed ticket is tracked");
            (entry.hint.clone(), entry.cost)
        };
        if hint.is_empty() {
            return false;
        }
        let candidates = match self.dao.query_cache(&self.name, &hint) {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(
                    pool = %self.name,
                    hint = %hint,
                    error = %err,
                    "cache query failed; placing without locality"
                );
                return false;
            }
        };
        match best_worker(inner, &candidates, u64::from(cost.non_cached)) {
            Some(worker) => {
                debug!(
                    pool = %self.name,
                    worker = %worker,
                    ticket = %id,
                    hint = %hint,
                    "steering onto cache-warm worker"
                );
                let cond = self.enqueue_assigned(inner, &worker, cost.cached, id);
                cond.notify_one();
                true
            }
            None => false,
        }
    }

    /// Append an entry to a running worker's queue, bump its workload and
    /// install the detach hook. Returns the worker's cond for the caller to
    /// wake.
    ///
    /// # Panics
    ///
    /// The target must be registered and running.
    fn enqueue_assigned(
        &self,
        inner: &mut PoolInner<I>,
        worker: &str,
        cost: u32,
        id: TicketId,
    ) -> Arc<Notify> {
        let cond = {
            let rec = inner
                .workers
                .get_mut(worker)
                .expect("assignment target is registered");
            let WorkerState::Running { queue, cond } = &mut rec.state else {
                panic!("assignment target must be running");
            };
            queue.push_front((cost, id));
            rec.workload += u64::from(cost);
            cond.clone()
        };
        let owner = worker.to_string();
        let entry = inner.tickets.get_mut(&id).expect("queued ticket is tracked");
        entry.detach = Some(Box::new(move |inner, metrics| {
            if let Some(rec) = inner.workers.get_mut(&owner) {
                if let WorkerState::Running { queue, .. } = &mut rec.state {
                    if let Some(pos) = queue.iter().position(|&(_, t)| t == id) {
                        let (cost, _) = queue.remove(pos).expect("position just located");
                        rec.workload -= u64::from(cost);
                    }
                }
            }
            metrics.ticket_cancelled();
        }));
        cond
    }

    /// Park a ticket in the backlog (at the front for fresh submissions, at
    /// the rear when re-parking from a vanishing worker) and install the
    /// detach hook.
    fn park_in_backlog(&self, inner: &mut PoolInner<I>, id: TicketId, at_rear: bool) {
        let urgent = inner.tickets.get(&id).expect("placed ticket is tracked").urgent;
        {
            let Placement::Backlog(backlog) = &mut inner.main else {
                panic!("backlog placement requires backlog mode");
            };
            if at_rear {
                backlog.push_back(id, urgent);
            } else {
                backlog.enqueue(id, urgent);
            }
        }
        self.metrics.backlog_grew(urgent);
        let entry = inner.tickets.get_mut(&id).expect("queued ticket is tracked");
        entry.detach = Some(Box::new(move |inner, metrics| {
            if let Placement::Backlog(backlog) = &mut inner.main {
                if backlog.remove(id, urgent) {
                    metrics.backlog_shrank(urgent);
                }
            }
            metrics.ticket_cancelled();
        }));
    }

    fn mark_cached(&self, hint: &str, worker: &str) {
        if hint.is_empty() {
            return;
        }
        if let Err(err) = self.dao.mark_cached(&self.name, hint, worker) {
            warn!(
                pool = %self.name,
                worker,
                hint,
                error = %err,
                "failed to record cache locality"
            );
        }
    }

    // ------------------------------------------------------------------
    // Worker pop loop
    // ------------------------------------------------------------------

    pub(crate) async fn pop_worker(&self, name: &str, job: I::Job) -> Result<I, PopError> {
        loop {
            // Suspension point: the pool-wide pause gate.
            self.gate.wait_active().await;

            let step = {
                let mut inner = self.inner.lock();
                self.pop_step(&mut inner, name, &job)
            };

            match step {
                PopStep::Deliver(item) => return Ok(item),
                PopStep::Finished => return Err(PopError::Finished),
                PopStep::Retry => {}
                PopStep::WaitReady(ready) => {
                    // Suspension point: worker is inactive.
                    ready.notified().await;
                }
                PopStep::Park(cond) => {
                    // Suspension point: parked among the ready workers.
                    cond.notified().await;
                    let mut inner = self.inner.lock();
                    if let Placement::Ready(ready) = &mut inner.main {
                        if let Some(pos) = ready.iter().position(|w| w == name) {
                            ready.remove(pos);
                        }
                    }
                    self.metrics.worker_unparked();
                }
            }
        }
    }

    /// One non-suspending pop iteration.
    fn pop_step(&self, inner: &mut PoolInner<I>, name: &str, job: &I::Job) -> PopStep<I> {
        enum Local {
            Finished,
            WaitReady(Arc<Notify>),
            Assigned(TicketId),
            Empty(Arc<Notify>),
        }

        let local = match inner.workers.get_mut(name) {
            // Released workers leave the map together with their terminal
            // state transition.
            None => Local::Finished,
            Some(rec) => match &mut rec.state {
                WorkerState::Finished => Local::Finished,
                WorkerState::Inactive { ready } => Local::WaitReady(ready.clone()),
                WorkerState::Running { queue, cond } => match queue.pop_back() {
                    Some((cost, id)) => {
                        rec.workload -= u64::from(cost);
                        Local::Assigned(id)
                    }
                    None => Local::Empty(cond.clone()),
                },
            },
        };

        match local {
            Local::Finished => PopStep::Finished,
            Local::WaitReady(ready) => PopStep::WaitReady(ready),
            Local::Assigned(id) => PopStep::Deliver(self.accept(inner, id, name, job.clone())),
            Local::Empty(cond) => match &mut inner.main {
                Placement::Ready(ready) => {
                    ready.push_back(name.to_string());
                    self.metrics.worker_parked();
                    PopStep::Park(cond)
                }
                Placement::Backlog(backlog) => match backlog.dequeue() {
                    None => {
                        inner.main = Placement::Ready(VecDeque::new());
                        PopStep::Retry
                    }
                    Some((id, urgent)) => {
                        self.metrics.backlog_shrank(urgent);
                        if let Some(entry) = inner.tickets.get_mut(&id) {
                            entry.detach = None;
                        }
                        if self.assign_preferred(inner, id) {
                            // Handed to a cache-warm worker; keep looking.
                            PopStep::Retry
                        } else {
                            PopStep::Deliver(self.accept(inner, id, name, job.clone()))
                        }
                    }
                },
            },
        }
    }

    /// Hand a ticket's item to the accepting worker: record locality, count
    /// the accept, and resolve the submitter's job slot.
    fn accept(&self, inner: &mut PoolInner<I>, id: TicketId, worker: &str, job: I::Job) -> I {
        let entry = inner.tickets.remove(&id).expect("accepted ticket is tracked");
        self.mark_cached(&entry.hint, worker);
        self.metrics.ticket_accepted();
        debug!(pool = %self.name, worker, ticket = %id, item = %entry.item, "item accepted");
        let _ = entry.job_tx.send(Some(job));
        entry.item
    }

    // ------------------------------------------------------------------
    // Worker lifecycle
    // ------------------------------------------------------------------

    fn register(shared: &Arc<Self>, name: &str) -> Result<WorkerQueue<I>, RegisterError> {
        let mut inner = shared.inner.lock();
        if inner.workers.contains_key(name) {
            return Err(RegisterError::NameTaken(name.to_string()));
        }
        inner.workers.insert(name.to_string(), WorkerRecord::new());
        shared.metrics.worker_connected();
        shared.metrics.worker_paused();
        if let Some(reconnect) = inner.reconnects.remove(name) {
            reconnect.send_replace(true);
        }
        info!(pool = %shared.name, worker = name, "worker registered");
        Ok(WorkerQueue {
            shared: Arc::clone(shared),
            name: name.to_string(),
        })
    }

    pub(crate) fn set_worker_active(&self, name: &str, active: bool) -> Result<(), AdminError> {
        let mut inner = self.inner.lock();
        if !inner.workers.contains_key(name) {
            return Err(AdminError::UnknownWorker(name.to_string()));
        }
        if active {
            self.activate(&mut inner, name);
        } else {
            self.deactivate(&mut inner, name);
        }
        Ok(())
    }

    fn activate(&self, inner: &mut PoolInner<I>, name: &str) {
        let rec = inner.workers.get_mut(name).expect("caller checked presence");
        if rec.shutdown {
            info!(pool = %self.name, worker = name, "ignoring activation of shut-down worker");
            return;
        }
        match &rec.state {
            WorkerState::Running { .. } => {}
            WorkerState::Inactive { ready } => {
                let ready = ready.clone();
                rec.state = WorkerState::running();
                self.metrics.worker_resumed();
                info!(pool = %self.name, worker = name, "worker active");
                ready.notify_one();
            }
            WorkerState::Finished => unreachable!("finished workers leave the map"),
        }
    }

    /// Flip a running worker to inactive and re-park everything it held.
    fn deactivate(&self, inner: &mut PoolInner<I>, name: &str) {
        let (queue, cond) = {
            let rec = inner.workers.get_mut(name).expect("caller checked presence");
            match rec.state {
                WorkerState::Inactive { .. } => return,
                WorkerState::Finished => unreachable!("finished workers leave the map"),
                WorkerState::Running { .. } => {}
            }
            let WorkerState::Running { queue, cond } =
                std::mem::replace(&mut rec.state, WorkerState::inactive())
            else {
                unreachable!("matched running above")
            };
            rec.workload = 0;
            (queue, cond)
        };
        self.metrics.worker_paused();
        info!(pool = %self.name, worker = name, requeued = queue.len(), "worker inactive");

        if !queue.is_empty() {
            let backlog_mode = matches!(inner.main, Placement::Backlog(_));
            if backlog_mode {
                // Newest first onto the rear keeps the original relative
                // order on dequeue.
                for (_cost, id) in queue {
                    self.park_in_backlog(inner, id, true);
                }
            } else {
                // Workers are waiting; route oldest first through normal
                // placement.
                for (_cost, id) in queue.into_iter().rev() {
                    self.add(inner, id);
                }
            }
        }

        // Wake any pop parked on the old cond so it observes the change.
        cond.notify_one();
    }

    pub(crate) fn shutdown_worker(&self, name: &str) -> Result<(), AdminError> {
        let mut inner = self.inner.lock();
        {
            let Some(rec) = inner.workers.get_mut(name) else {
                return Err(AdminError::UnknownWorker(name.to_string()));
            };
            rec.shutdown = true;
        }
        info!(pool = %self.name, worker = name, "worker shutting down");
        self.deactivate(&mut inner, name);
        Ok(())
    }

    pub(crate) fn release_worker(&self, name: &str) {
        let mut inner = self.inner.lock();
        assert!(
            inner.workers.contains_key(name),
            "release of unregistered worker {name}"
        );
        self.deactivate(&mut inner, name);
        let mut rec = inner.workers.remove(name).expect("presence asserted above");
        let ready = match std::mem::replace(&mut rec.state, WorkerState::Finished) {
            WorkerState::Inactive { ready } => ready,
            _ => unreachable!("worker is inactive after deactivation"),
        };
        self.metrics.worker_released();
        info!(pool = %self.name, worker = name, "worker released");
        // The parked pop wakes, finds the worker gone, and fails with
        // Finished.
        ready.notify_one();
    }

    pub(crate) async fn self_update(&self, name: &str) -> Result<(), AdminError> {
        let timeout = self.config.update_reconnect_timeout;
        let mut rx = {
            let mut inner = self.inner.lock();
            if !inner.workers.contains_key(name) {
                return Err(AdminError::UnknownWorker(name.to_string()));
            }
            inner
                .reconnects
                .entry(name.to_string())
                .or_insert_with(|| watch::channel(false).0)
                .subscribe()
        };
        info!(pool = %self.name, worker = name, "waiting for worker to reconnect after self-update");
        let result = tokio::time::timeout(timeout, rx.wait_for(|reconnected| *reconnected)).await;
        match result {
            Ok(Ok(_)) => {
                info!(pool = %self.name, worker = name, "worker reconnected");
                Ok(())
            }
            Ok(Err(_)) | Err(_) => {
                warn!(pool = %self.name, worker = name, "worker did not reconnect in time");
                Err(AdminError::UpdateTimeout(timeout))
            }
        }
    }

    // ------------------------------------------------------------------
    // Cancellation and introspection
    // ------------------------------------------------------------------

    pub(crate) fn cancel_ticket(&self, id: TicketId) -> Result<(), CancelError> {
        let mut inner = self.inner.lock();
        let hook = match inner.tickets.get_mut(&id) {
            Some(entry) => entry.detach.take().ok_or(CancelError::NotQueued)?,
            None => return Err(CancelError::NotQueued),
        };
        let entry = inner.tickets.remove(&id).expect("entry observed above");
        hook(&mut *inner, &self.metrics);
        debug!(pool = %self.name, ticket = %id, item = %entry.item, "ticket cancelled");
        Ok(())
    }

    fn status(&self) -> PoolStatus {
        let inner = self.inner.lock();
        let (backlog_high, backlog_low) = match &inner.main {
            Placement::Backlog(backlog) => (backlog.len(true), backlog.len(false)),
            Placement::Ready(_) => (0, 0),
        };
        let mut workers: Vec<WorkerStatus> = inner
            .workers
            .iter()
            .map(|(name, rec)| rec.status(name))
            .collect();
        workers.sort_by(|a, b| a.name.cmp(&b.name));
        PoolStatus {
            name: self.name.clone(),
            active: self.gate.is_active(),
            backlog_high,
            backlog_low,
            workers,
            metrics: self.metrics.snapshot(),
        }
    }
}

/// Among `candidates` (in tie-break order), the running pool member with the
/// highest workload that does not exceed `max_workload`.
fn best_worker<I: WorkItem>(
    inner: &PoolInner<I>,
    candidates: &[String],
    max_workload: u64,
) -> Option<String> {
    let mut best: Option<(&str, u64)> = None;
    for name in candidates {
        let Some(rec) = inner.workers.get(name) else {
            continue;
        };
        if !rec.state.is_running() || rec.workload > max_workload {
            continue;
        }
        // Strict comparison keeps the earliest candidate on ties.
        if best.is_none_or(|(_, load)| rec.workload > load) {
            best = Some((name, rec.workload));
        }
    }
    best.map(|(name, _)| name.to_string())
}

/// A named collection of workers and their queues, plus the cache store
/// scoped to that name.
///
/// Cheap to clone; all clones share the same scheduler state.
pub struct Pool<I: WorkItem> {
    shared: Arc<PoolShared<I>>,
}

impl<I: WorkItem> Pool<I> {
    /// Create a pool over the given cache store.
    pub fn new(name: impl Into<String>, dao: Arc<dyn CacheDao>, config: PoolConfig) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                name: name.into(),
                config,
                dao,
                gate: ActiveGate::default(),
                metrics: PoolMetrics::new(),
                inner: Mutex::new(PoolInner {
                    main: Placement::Backlog(Backlog::new()),
                    workers: HashMap::new(),
                    tickets: HashMap::new(),
                    next_ticket: 0,
                    reconnects: HashMap::new(),
                }),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Queue an item. Never blocks on worker availability: the item is
    /// either handed to a waiting worker's queue or parked in the backlog.
    pub fn submit(&self, urgent: bool, item: I) -> Ticket<I> {
        PoolShared::submit(&self.shared, urgent, item)
    }

    /// Add a worker under a unique name. The worker starts inactive.
    pub fn register(&self, name: &str) -> Result<WorkerQueue<I>, RegisterError> {
        PoolShared::register(&self.shared, name)
    }

    /// Admin: activate or deactivate a worker by name.
    pub fn set_worker_active(&self, name: &str, active: bool) -> Result<(), AdminError> {
        self.shared.set_worker_active(name, active)
    }

    /// Admin: wait for a worker to reconnect under the same name after a
    /// self-update, bounded by the configured timeout.
    pub async fn self_update(&self, name: &str) -> Result<(), AdminError> {
        self.shared.self_update(name).await
    }

    /// Flip the pool-wide pause gate. While paused, every pop blocks before
    /// consuming any queue; submission is unaffected.
    pub fn set_active(&self, active: bool) {
        if self.shared.gate.is_active() != active {
            info!(pool = %self.shared.name, active, "pool gate flipped");
        }
        self.shared.gate.set(active);
    }

    pub fn is_active(&self) -> bool {
        self.shared.gate.is_active()
    }

    /// Point-in-time view of the pool for admin consumption.
    pub fn show(&self) -> PoolStatus {
        self.shared.status()
    }

    /// Per-worker snapshots, name-ascending.
    pub fn workers(&self) -> Vec<WorkerStatus> {
        self.shared.status().workers
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }
}

impl<I: WorkItem> Clone for Pool<I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<I: WorkItem> fmt::Debug for Pool<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool").field("name", &self.shared.name).finish()
    }
}

/// Serializable pool summary for admin views.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    pub name: String,
    pub active: bool,
    pub backlog_high: usize,
    pub backlog_low: usize,
    pub workers: Vec<WorkerStatus>,
    pub metrics: MetricsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheDao;

    struct TestItem {
        hint: &'static str,
        cost: CostEstimate,
    }

    impl fmt::Display for TestItem {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test-item({})", self.hint)
        }
    }

    impl WorkItem for TestItem {
        type Job = &'static str;

        fn cache_hint(&self) -> &str {
            self.hint
        }

        fn cost_estimate(&self) -> CostEstimate {
            self.cost
        }
    }

    fn pool() -> Pool<TestItem> {
        Pool::new(
            "default",
            Arc::new(MemoryCacheDao::new()),
            PoolConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_names() {
        let pool = pool();
        let _w = pool.register("worker-1").unwrap();
        assert_eq!(
            pool.register("worker-1").unwrap_err(),
            RegisterError::NameTaken("worker-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_submit_with_no_workers_lands_in_backlog() {
        let pool = pool();
        let _t1 = pool.submit(false, TestItem { hint: "", cost: CostEstimate::uniform(1) });
        let _t2 = pool.submit(true, TestItem { hint: "", cost: CostEstimate::uniform(1) });

        let status = pool.show();
        assert_eq!(status.backlog_high, 1);
        assert_eq!(status.backlog_low, 1);
        assert_eq!(status.metrics.submitted, 2);
    }

    #[tokio::test]
    async fn test_admin_set_active_unknown_worker() {
        let pool = pool();
        assert_eq!(
            pool.set_worker_active("ghost", true),
            Err(AdminError::UnknownWorker("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_show_reports_worker_states() {
        let pool = pool();
        let w1 = pool.register("worker-1").unwrap();
        let _w2 = pool.register("worker-2").unwrap();
        w1.set_active(true).unwrap();

        let workers = pool.workers();
        assert_eq!(workers.len(), 2);
        assert_eq!(workers[0].name, "worker-1");
        assert_eq!(workers[0].state, crate::worker::WorkerStateKind::Running);
        assert_eq!(workers[1].state, crate::worker::WorkerStateKind::Inactive);
    }

    #[tokio::test]
    #[should_panic(expected = "release of unregistered worker")]
    async fn test_double_release_panics() {
        let pool = pool();
        let w = pool.register("worker-1").unwrap();
        w.release();
        w.release();
    }
}
