//! Reactive subscription model for background loops.
//!
//! A loop polls a source on a fixed interval and applies the result. The
//! [`ReactiveSubscription`] trait captures one such loop; [`spawn_subscriptions`]
//! gives each one its own task. The first tick fires immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::InboxEngine;

/// A reactive subscription polled by its own background task.
#[async_trait::async_trait]
pub trait ReactiveSubscription: Send + Sync + 'static {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// How often this subscription should be polled.
    fn interval(&self) -> Duration;

    /// Execute one poll cycle.
    ///
    /// Errors are logged internally; the loop continues regardless.
    async fn tick(&self);
}

/// Fetch-and-merge cycle for new messages.
pub struct PollSubscription {
    pub engine: Arc<InboxEngine>,
}

#[async_trait::async_trait]
impl ReactiveSubscription for PollSubscription {
    fn name(&self) -> &'static str {
        "message_poll"
    }

    fn interval(&self) -> Duration {
        self.engine.settings.poll_interval
    }

    async fn tick(&self) {
        self.engine.run_poll_cycle().await;
    }
}

async fn run_single(sub: Box<dyn ReactiveSubscription>) {
    tracing::debug!(subscription = sub.name(), "Starting subscription");
    let mut interval = tokio::time::interval(sub.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        sub.tick().await;
    }
}

/// Spawn every subscription as an independent tokio task.
pub fn spawn_subscriptions(subscriptions: Vec<Box<dyn ReactiveSubscription>>) -> Vec<JoinHandle<()>> {
    subscriptions
        .into_iter()
        .map(|sub| tokio::spawn(run_single(sub)))
        .collect()
}
