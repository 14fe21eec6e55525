//! Recording fakes for the store, badge and broadcast ports.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::badge::BadgeSink;
use crate::db::models::Message;
use crate::db::storage_keys::MESSAGES_KEY;
use crate::engine::controller::MessageStore;
use crate::engine::storage::KeyValueStore;
use crate::engine::types::NotificationPayload;
use crate::error::AppError;
use crate::notifications::Broadcaster;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Persist,
    Badge(String),
    Broadcast(NotificationPayload),
}

type EventLog = Arc<Mutex<Vec<SinkEvent>>>;

#[derive(Default)]
pub struct RecordingStore {
    value: Mutex<Option<Value>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    fail_gets: AtomicBool,
    fail_sets: AtomicBool,
    yield_on_get: AtomicBool,
    log: EventLog,
}

impl RecordingStore {
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    /// Total store traffic in either direction.
    pub fn accesses(&self) -> usize {
        self.gets() + self.sets()
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    /// Suspend after reading so concurrent operations interleave.
    pub fn set_yield_on_get(&self, enabled: bool) {
        self.yield_on_get.store(enabled, Ordering::SeqCst);
    }

    fn peek(&self) -> Option<Value> {
        self.value.lock().unwrap().clone()
    }

    fn put(&self, value: Value) {
        *self.value.lock().unwrap() = Some(value);
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        assert_eq!(key, MESSAGES_KEY);
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("get rejected".into()));
        }
        let snapshot = self.peek();
        if self.yield_on_get.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        Ok(snapshot)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), AppError> {
        assert_eq!(key, MESSAGES_KEY);
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("set rejected".into()));
        }
        self.put(value);
        self.log.lock().unwrap().push(SinkEvent::Persist);
        Ok(())
    }
}

pub struct RecordingBadge {
    log: EventLog,
    fail: AtomicBool,
}

#[async_trait::async_trait]
impl BadgeSink for RecordingBadge {
    async fn set_text(&self, text: &str) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Io(std::io::Error::other("badge rejected")));
        }
        self.log
            .lock()
            .unwrap()
            .push(SinkEvent::Badge(text.to_string()));
        Ok(())
    }
}

pub struct RecordingBroadcaster {
    log: EventLog,
    fail: AtomicBool,
}

#[async_trait::async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn send(&self, payload: NotificationPayload) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Io(std::io::Error::other("no receiving end")));
        }
        self.log.lock().unwrap().push(SinkEvent::Broadcast(payload));
        Ok(())
    }
}

/// A controller wired to recording fakes that share one ordered event log.
pub struct Harness {
    pub store: Arc<RecordingStore>,
    pub controller: Arc<MessageStore>,
    badge: Arc<RecordingBadge>,
    broadcaster: Arc<RecordingBroadcaster>,
    log: EventLog,
}

impl Harness {
    pub fn new() -> Self {
        let log: EventLog = Arc::default();
        let store = Arc::new(RecordingStore {
            log: log.clone(),
            ..Default::default()
        });
        let badge = Arc::new(RecordingBadge {
            log: log.clone(),
            fail: AtomicBool::new(false),
        });
        let broadcaster = Arc::new(RecordingBroadcaster {
            log: log.clone(),
            fail: AtomicBool::new(false),
        });
        let controller = Arc::new(MessageStore::new(
            store.clone(),
            badge.clone(),
            broadcaster.clone(),
        ));
        Self {
            store,
            controller,
            badge,
            broadcaster,
            log,
        }
    }

    pub fn fail_badge(&self, fail: bool) {
        self.badge.fail.store(fail, Ordering::SeqCst);
    }

    pub fn fail_broadcast(&self, fail: bool) {
        self.broadcaster.fail.store(fail, Ordering::SeqCst);
    }

    /// Harness whose store already holds `messages`, without recording the write.
    pub async fn seeded(messages: Vec<Message>) -> Self {
        let h = Self::new();
        h.store.put(serde_json::to_value(messages).unwrap());
        h
    }

    /// Persisted collection, read without counting as store access.
    pub async fn stored(&self) -> Vec<Message> {
        self.store
            .peek()
            .map(|v| serde_json::from_value(v).unwrap())
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.log.lock().unwrap().clone()
    }

    pub fn badge_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Badge(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn broadcasts(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Broadcast(_)))
            .count()
    }
}
