use tokio::sync::broadcast;

use crate::engine::types::NotificationPayload;
use crate::error::AppError;

/// Capacity of the in-process notification channel.
pub const BROADCAST_CAPACITY: usize = 64;

/// Fan-out channel to UI listeners (popup, options page, stdout bridge).
#[async_trait::async_trait]
pub trait Broadcaster: Send + Sync {
    async fn send(&self, payload: NotificationPayload) -> Result<(), AppError>;
}

/// Broadcaster over a `tokio::sync::broadcast` channel.
///
/// No listener being attached is normal (the UI is closed most of the time),
/// so a send with zero receivers succeeds.
#[derive(Clone)]
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<NotificationPayload>,
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(BROADCAST_CAPACITY)
    }
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationPayload> {
        self.tx.subscribe()
    }
}

#[async_trait::async_trait]
impl Broadcaster for ChannelBroadcaster {
    async fn send(&self, payload: NotificationPayload) -> Result<(), AppError> {
        match self.tx.send(payload) {
            Ok(listeners) => {
                tracing::debug!(listeners, "Notification broadcast");
            }
            Err(broadcast::error::SendError(payload)) => {
                tracing::debug!(?payload, "No listeners attached, notification dropped");
            }
        }
        Ok(())
    }
}
