use std::sync::Mutex;

use crate::error::AppError;

/// Unread-count indicator shown next to the app icon.
#[async_trait::async_trait]
pub trait BadgeSink: Send + Sync {
    /// Replace the badge text. An empty string clears the badge.
    async fn set_text(&self, text: &str) -> Result<(), AppError>;
}

/// Badge that keeps the latest text in memory and logs every change.
#[derive(Default)]
pub struct LogBadge {
    text: Mutex<String>,
}

impl LogBadge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.text.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl BadgeSink for LogBadge {
    async fn set_text(&self, text: &str) -> Result<(), AppError> {
        let mut current = self.text.lock().unwrap_or_else(|e| e.into_inner());
        if *current != text {
            tracing::info!(badge = %text, "Badge updated");
        }
        *current = text.to_string();
        Ok(())
    }
}
