//! Message source: where new records come from.
//!
//! There is no real network fetching. [`MockMessageSource`] returns a fixed
//! demonstration set on its first fetch and synthesized records afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::SecondsFormat;
use rand::seq::SliceRandom;

use crate::db::models::{Message, Priority};
use crate::error::AppError;

#[async_trait::async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch the next batch for the poll loop. May be stateful.
    async fn fetch_new(&self, count: usize) -> Result<Vec<Message>, AppError>;

    /// Produce `count` fresh records with unique ids. Stateless.
    fn synthesize(&self, count: usize) -> Vec<Message>;
}

/// Source that serves [`seed_messages`] once, then synthetic records.
///
/// The first-fetch flag belongs to the instance and resets only when a new
/// source is constructed (process restart).
pub struct MockMessageSource {
    first_fetch: AtomicBool,
    delay: Duration,
}

impl MockMessageSource {
    /// `delay` is awaited before each fetch to mimic server response time.
    pub fn new(delay: Duration) -> Self {
        Self {
            first_fetch: AtomicBool::new(true),
            delay,
        }
    }
}

#[async_trait::async_trait]
impl MessageSource for MockMessageSource {
    async fn fetch_new(&self, count: usize) -> Result<Vec<Message>, AppError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.first_fetch.swap(false, Ordering::SeqCst) {
            tracing::debug!("First fetch: serving seed messages");
            Ok(seed_messages())
        } else {
            Ok(generate_dummy_messages(count))
        }
    }

    fn synthesize(&self, count: usize) -> Vec<Message> {
        generate_dummy_messages(count)
    }
}

/// The fixed demonstration set served on the first fetch.
pub fn seed_messages() -> Vec<Message> {
    vec![
        Message {
            id: "mock-1".into(),
            content: "Team meeting at 3 PM today 🙂".into(),
            priority: Priority::High,
            timestamp: "2024-09-30T15:00:00Z".into(),
            read: false,
        },
        Message {
            id: "mock-2".into(),
            content: "Hello mate, how are you? 🥂".into(),
            priority: Priority::Low,
            timestamp: "2024-10-15T15:00:00Z".into(),
            read: false,
        },
        Message {
            id: "mock-3".into(),
            content: "Don't forget to submit the report by EOD!".into(),
            priority: Priority::Normal,
            timestamp: "2024-10-30T15:00:00Z".into(),
            read: false,
        },
    ]
}

/// `count` unread placeholder records with UUID v4 ids, stamped now.
pub fn generate_dummy_messages(count: usize) -> Vec<Message> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let id = uuid::Uuid::new_v4().to_string();
            Message {
                content: format!("This is a dummy message with ID: {}", id),
                id,
                priority: *Priority::ALL.choose(&mut rng).unwrap_or(&Priority::Normal),
                timestamp: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                read: false,
            }
        })
        .collect()
}
