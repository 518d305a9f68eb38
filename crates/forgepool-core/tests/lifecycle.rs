//! Lifecycle laws: pause/resume round-trips, gauge conservation,
//! cancellation semantics, shutdown latching and admin self-update.

mod common;

use std::sync::Arc;
use std::time::Duration;

use forgepool_core::{
    AdminError, CancelError, MemoryCacheDao, Pool, PoolConfig, PopError, WorkerQueue,
    WorkerStateKind,
};

use common::{active_worker, pop_now, settle, test_pool, Build};

/// Queue two hint-a items on w1 while w2 takes the unrelated one.
async fn warm_w1_with_two(pool: &Pool<Build>) -> (WorkerQueue<Build>, WorkerQueue<Build>) {
    let w1 = active_worker(pool, "w1");
    let w2 = active_worker(pool, "w2");

    pool.submit(false, Build::hinted("J1", "a"));
    pool.submit(false, Build::hinted("J2", "b"));
    assert_eq!(pop_now(&w1).await.name, "J1");
    assert_eq!(pop_now(&w2).await.name, "J2");

    pool.submit(false, Build::hinted("J3", "a"));
    pool.submit(false, Build::hinted("J4", "a"));
    pool.submit(false, Build::hinted("J5", "c"));
    assert_eq!(pop_now(&w2).await.name, "J5");

    (w1, w2)
}

#[tokio::test]
async fn test_deactivate_reactivate_round_trip() {
    let pool = test_pool();
    let (w1, _w2) = warm_w1_with_two(&pool).await;

    // Deactivation re-parks w1's queue onto the backlog in order.
    w1.set_active(false).unwrap();
    let status = pool.show();
    assert_eq!(status.backlog_low, 2);
    let w1_status = status.workers.iter().find(|w| w.name == "w1").unwrap();
    assert_eq!(w1_status.state, WorkerStateKind::Inactive);
    assert_eq!(w1_status.workload, 0);
    assert_eq!(w1_status.queued, 0);

    // Reactivation restores service; the re-parked items come back in
    // their original relative order (steered back via the cache hint).
    w1.set_active(true).unwrap();
    assert_eq!(pop_now(&w1).await.name, "J3");
    assert_eq!(pop_now(&w1).await.name, "J4");
}

#[tokio::test]
async fn test_deactivate_is_idempotent() {
    let pool = test_pool();
    let w1 = active_worker(&pool, "w1");

    w1.set_active(false).unwrap();
    let paused = pool.metrics().workers_paused;
    w1.set_active(false).unwrap();
    assert_eq!(pool.metrics().workers_paused, paused);
}

#[tokio::test]
async fn test_register_release_restores_gauges() {
    let pool = test_pool();
    let before = pool.metrics();

    let w = pool.register("w1").unwrap();
    let during = pool.metrics();
    assert_eq!(during.workers_connected, before.workers_connected + 1);
    assert_eq!(during.workers_paused, before.workers_paused + 1);

    w.release();
    let after = pool.metrics();
    assert_eq!(after.workers_connected, before.workers_connected);
    assert_eq!(after.workers_paused, before.workers_paused);
    assert!(pool.workers().is_empty());
}

#[tokio::test]
async fn test_release_fails_parked_pop() {
    let pool = test_pool();
    let w = pool.register("w1").unwrap();

    // The worker is inactive; its pop parks on the ready signal.
    let parked = tokio::spawn({
        let w = w.clone();
        async move { w.pop("w1".to_string()).await }
    });
    settle().await;

    w.release();
    assert!(matches!(parked.await.unwrap(), Err(PopError::Finished)));
}

#[tokio::test]
async fn test_cancel_detaches_from_backlog() {
    let pool = test_pool();
    let t1 = pool.submit(false, Build::plain("J1"));
    let t2 = pool.submit(false, Build::plain("J2"));

    assert_eq!(t1.cancel(), Ok(()));
    assert_eq!(t1.cancel(), Err(CancelError::NotQueued));
    assert_eq!(pool.show().backlog_low, 1);

    let w = active_worker(&pool, "w1");
    assert_eq!(pop_now(&w).await.name, "J2");
    assert_eq!(t2.cancel(), Err(CancelError::NotQueued));

    // A cancelled ticket never resolves into a job.
    assert_eq!(t1.await_job().await, None);
}

#[tokio::test]
async fn test_cancel_detaches_from_worker_queue() {
    let pool = test_pool();
    let w1 = active_worker(&pool, "w1");

    pool.submit(false, Build::hinted("J1", "a"));
    assert_eq!(pop_now(&w1).await.name, "J1");

    // Steered onto w1's queue at cached cost.
    let t2 = pool.submit(false, Build::hinted("J2", "a"));
    let w2 = active_worker(&pool, "w2");
    pool.submit(false, Build::plain("J3"));
    assert_eq!(pop_now(&w2).await.name, "J3");

    let w1_status = pool.workers().into_iter().find(|w| w.name == "w1").unwrap();
    assert_eq!(w1_status.queued, 1);
    assert_eq!(w1_status.workload, 1);

    t2.cancel().unwrap();
    let w1_status = pool.workers().into_iter().find(|w| w.name == "w1").unwrap();
    assert_eq!(w1_status.queued, 0);
    assert_eq!(w1_status.workload, 0);
    assert_eq!(pool.metrics().cancelled, 1);
}

#[tokio::test]
async fn test_nothing_lost_through_churn() {
    let pool = test_pool();

    let tickets = vec![
        pool.submit(false, Build::hinted("J1", "a")),
        pool.submit(true, Build::hinted("J2", "a")),
        pool.submit(false, Build::plain("J3")),
        pool.submit(true, Build::hinted("J4", "b")),
        pool.submit(false, Build::plain("J5")),
    ];
    tickets[2].cancel().unwrap();

    let w = active_worker(&pool, "w1");
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(pop_now(&w).await.name);
    }
    seen.sort_unstable();
    assert_eq!(seen, vec!["J1", "J2", "J4", "J5"]);

    let metrics = pool.metrics();
    assert_eq!(metrics.submitted, 5);
    assert_eq!(metrics.accepted + metrics.cancelled, metrics.submitted);
    assert_eq!(metrics.backlog_high, 0);
    assert_eq!(metrics.backlog_low, 0);
}

#[tokio::test]
async fn test_shutdown_latches() {
    let pool = test_pool();
    let w1 = active_worker(&pool, "w1");

    pool.submit(false, Build::hinted("J1", "a"));
    assert_eq!(pop_now(&w1).await.name, "J1");

    // Steer J2 onto w1's queue, then shut w1 down while it holds the item.
    pool.submit(false, Build::hinted("J2", "a"));
    let w2 = active_worker(&pool, "w2");
    pool.submit(false, Build::plain("J3"));
    assert_eq!(pop_now(&w2).await.name, "J3");

    w1.shutdown().unwrap();
    assert_eq!(pool.show().backlog_low, 1);

    // Reactivation after shutdown is refused.
    w1.set_active(true).unwrap();
    let status = pool.workers().into_iter().find(|w| w.name == "w1").unwrap();
    assert_eq!(status.state, WorkerStateKind::Inactive);
    assert!(status.shutdown);

    // The re-parked item is not lost.
    assert_eq!(pop_now(&w2).await.name, "J2");
}

#[tokio::test]
async fn test_admin_set_active_by_name() {
    let pool = test_pool();
    pool.register("w1").unwrap();

    pool.set_worker_active("w1", true).unwrap();
    let status = pool.workers().into_iter().find(|w| w.name == "w1").unwrap();
    assert_eq!(status.state, WorkerStateKind::Running);

    assert_eq!(
        pool.set_worker_active("ghost", false),
        Err(AdminError::UnknownWorker("ghost".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_self_update_times_out() {
    let config = PoolConfig::new().with_update_reconnect_timeout(Duration::from_millis(100));
    let pool: Pool<Build> = Pool::new("default", Arc::new(MemoryCacheDao::new()), config);
    pool.register("w1").unwrap();

    assert!(matches!(
        pool.self_update("w1").await,
        Err(AdminError::UpdateTimeout(_))
    ));
    assert!(matches!(
        pool.self_update("ghost").await,
        Err(AdminError::UnknownWorker(_))
    ));
}

#[tokio::test]
async fn test_self_update_resolves_on_reregistration() {
    let pool = test_pool();
    let w1 = pool.register("w1").unwrap();

    let update = tokio::spawn({
        let pool = pool.clone();
        async move { pool.self_update("w1").await }
    });
    settle().await;

    // The worker restarts: drops its registration and comes back under the
    // same name.
    w1.release();
    pool.register("w1").unwrap();

    update.await.unwrap().unwrap();
}
