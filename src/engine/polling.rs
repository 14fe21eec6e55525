use std::sync::atomic::Ordering;

use crate::engine::InboxEngine;
use crate::error::AppError;

impl InboxEngine {
    /// Run one fetch-and-merge cycle: pull a batch from the message source and
    /// append it through the merge path. Returns the number of new records.
    pub async fn poll_cycle(&self) -> Result<usize, AppError> {
        let batch = self.source.fetch_new(self.settings.poll_batch_size).await?;
        let fetched = batch.len();
        self.store.merge_new_messages(batch).await?;
        Ok(fetched)
    }

    /// Poll-loop tick: runs [`poll_cycle`](Self::poll_cycle) and logs failures
    /// so the schedule keeps going.
    pub async fn run_poll_cycle(&self) {
        self.scheduler.cycles_run.fetch_add(1, Ordering::Relaxed);
        match self.poll_cycle().await {
            Ok(fetched) => {
                tracing::info!(fetched, "Poll cycle merged new messages");
            }
            Err(e) => {
                self.scheduler.cycles_failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(kind = e.kind(), "Failed to fetch new messages: {}", e);
            }
        }
    }
}
