use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Normal, Priority::High];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub priority: Priority,
    /// ISO-8601 creation time.
    pub timestamp: String,
    pub read: bool,
}

/// The persisted collection. Insertion order is display order only.
pub type MessageCollection = Vec<Message>;

/// Number of records whose `read` flag is still false.
pub fn unread_count(messages: &[Message]) -> usize {
    messages.iter().filter(|m| !m.read).count()
}

/// Badge rendering of the unread count: empty when nothing is unread.
pub fn badge_text(messages: &[Message]) -> String {
    match unread_count(messages) {
        0 => String::new(),
        n => n.to_string(),
    }
}
