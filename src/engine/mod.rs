pub mod background;
pub mod controller;
pub mod dispatch;
pub mod polling;
pub mod source;
pub mod storage;
pub mod subscription;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;

use self::background::SchedulerState;
use self::controller::MessageStore;
use self::source::MessageSource;

/// Batch sizes and timing the engine needs at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub poll_interval: Duration,
    pub poll_batch_size: usize,
    pub bulk_batch_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for EngineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            poll_batch_size: config.poll_batch_size,
            bulk_batch_size: config.bulk_batch_size,
        }
    }
}

/// Ties the store controller to its message source and the runtime counters.
///
/// Both the command dispatcher and the poll loop drive the same controller, so
/// invariant checks and commit notifications happen in one place.
pub struct InboxEngine {
    pub store: Arc<MessageStore>,
    pub(crate) source: Arc<dyn MessageSource>,
    pub scheduler: Arc<SchedulerState>,
    pub settings: EngineSettings,
}

impl InboxEngine {
    pub fn new(
        store: Arc<MessageStore>,
        source: Arc<dyn MessageSource>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            source,
            scheduler: Arc::new(SchedulerState::new()),
            settings,
        }
    }
}
