use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::engine::subscription::{self, PollSubscription, ReactiveSubscription};
use crate::engine::InboxEngine;

/// Runtime state for the background loops, shared across tasks.
pub struct SchedulerState {
    running: AtomicBool,
    pub(crate) cycles_run: AtomicU64,
    pub(crate) cycles_failed: AtomicU64,
    pub(crate) commands_dispatched: AtomicU64,
    pub(crate) commands_dropped: AtomicU64,
    pub(crate) commands_failed: AtomicU64,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerState {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            cycles_run: AtomicU64::new(0),
            cycles_failed: AtomicU64::new(0),
            commands_dispatched: AtomicU64::new(0),
            commands_dropped: AtomicU64::new(0),
            commands_failed: AtomicU64::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            running: self.running.load(Ordering::Relaxed),
            cycles_run: self.cycles_run.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            commands_dispatched: self.commands_dispatched.load(Ordering::Relaxed),
            commands_dropped: self.commands_dropped.load(Ordering::Relaxed),
            commands_failed: self.commands_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub running: bool,
    pub cycles_run: u64,
    pub cycles_failed: u64,
    pub commands_dispatched: u64,
    pub commands_dropped: u64,
    pub commands_failed: u64,
}

/// Install/startup hook. Starts the poll loop the first time it is called in
/// this process and returns `true`; later calls do nothing and return `false`.
///
/// The loop has no stop handle and runs for the lifetime of the process.
pub fn on_installed(engine: &Arc<InboxEngine>) -> bool {
    if engine
        .scheduler
        .running
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        tracing::debug!("Poll loop already running, ignoring lifecycle trigger");
        return false;
    }

    let poll = PollSubscription {
        engine: engine.clone(),
    };
    tracing::info!(
        interval_secs = poll.interval().as_secs_f64(),
        "Poll loop starting"
    );
    let subscriptions: Vec<Box<dyn ReactiveSubscription>> = vec![Box::new(poll)];
    subscription::spawn_subscriptions(subscriptions);
    true
}
