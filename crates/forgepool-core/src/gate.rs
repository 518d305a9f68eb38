//! Pool-wide pause switch
//!
//! When the gate is paused, every worker's pop loop blocks before consuming
//! any queue. Submission is unaffected. Wakes coalesce: flipping the gate
//! several times while a worker is between checks costs at most one wakeup.

use tokio::sync::watch;

/// Process-wide pause switch for a pool.
#[derive(Debug)]
pub struct ActiveGate {
    active: watch::Sender<bool>,
}

impl ActiveGate {
    /// Create a gate in the given initial state.
    pub fn new(active: bool) -> Self {
        let (tx, _rx) = watch::channel(active);
        Self { active: tx }
    }

    /// Flip the gate. Activating a paused gate wakes every pop loop parked
    /// on [`ActiveGate::wait_active`]; pausing an active gate makes the next
    /// wait block.
    pub fn set(&self, active: bool) {
        self.active.send_replace(active);
    }

    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    /// Return immediately when active, otherwise wait until the gate flips.
    pub async fn wait_active(&self) {
        let mut rx = self.active.subscribe();
        // The sender lives as long as the gate, so this cannot fail.
        let _ = rx.wait_for(|active| *active).await;
    }
}

impl Default for ActiveGate {
    fn default() -> Self {
        Self::new(true)
    }
}
