//! Message store controller: every read-modify-write of the persisted
//! collection goes through here.
//!
//! Each mutation loads the full collection, edits a local copy and commits it.
//! A commit is always: persist → badge → broadcast, in that order, and only
//! after the mutation validated. There is no lock across the load/commit pair,
//! so two interleaved operations resolve as last-write-wins.

use std::sync::Arc;

use crate::badge::BadgeSink;
use crate::db::models::{badge_text, unread_count, Message, MessageCollection};
use crate::db::storage_keys::MESSAGES_KEY;
use crate::engine::storage::KeyValueStore;
use crate::engine::types::NotificationPayload;
use crate::error::AppError;
use crate::notifications::Broadcaster;
use crate::validation;

pub struct MessageStore {
    store: Arc<dyn KeyValueStore>,
    badge: Arc<dyn BadgeSink>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl MessageStore {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        badge: Arc<dyn BadgeSink>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            store,
            badge,
            broadcaster,
        }
    }

    /// Current collection. An absent key reads as empty.
    pub async fn load(&self) -> Result<MessageCollection, AppError> {
        match self.store.get(MESSAGES_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn unread_count(&self) -> Result<usize, AppError> {
        Ok(unread_count(&self.load().await?))
    }

    /// Append `message`, rejecting an id already present in the collection.
    pub async fn add_message(&self, message: Message) -> Result<(), AppError> {
        validation::require_valid_id("id", &message.id)?;

        let mut messages = self.load().await?;
        if messages.iter().any(|m| m.id == message.id) {
            return Err(AppError::DuplicateId(message.id));
        }

        tracing::debug!(message_id = %message.id, "Adding message");
        messages.push(message);
        self.commit(messages).await
    }

    /// Remove the record with `id`. A missing id still commits the unchanged
    /// collection.
    pub async fn delete_message(&self, id: &str) -> Result<(), AppError> {
        let messages = self.load().await?;
        let before = messages.len();
        let remaining: MessageCollection = messages.into_iter().filter(|m| m.id != id).collect();

        if remaining.len() == before {
            tracing::debug!(message_id = %id, "Delete matched no message");
        }
        self.commit(remaining).await
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<(), AppError> {
        let mut messages = self.load().await?;
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        message.read = true;
        self.commit(messages).await
    }

    pub async fn mark_all_as_read(&self) -> Result<(), AppError> {
        let mut messages = self.load().await?;
        for m in messages.iter_mut() {
            m.read = true;
        }
        self.commit(messages).await
    }

    pub async fn delete_all_messages(&self) -> Result<(), AppError> {
        self.commit(Vec::new()).await
    }

    /// Append a batch from the poll loop. The batch is trusted to carry fresh
    /// ids and is not checked against the existing collection.
    pub async fn merge_new_messages(&self, new_messages: Vec<Message>) -> Result<(), AppError> {
        let mut messages = self.load().await?;
        tracing::debug!(
            existing = messages.len(),
            incoming = new_messages.len(),
            "Merging new messages"
        );
        messages.extend(new_messages);
        self.commit(messages).await
    }

    async fn commit(&self, messages: MessageCollection) -> Result<(), AppError> {
        self.store
            .set(MESSAGES_KEY, serde_json::to_value(&messages)?)
            .await?;
        self.badge
            .set_text(&badge_text(&messages))
            .await
            .map_err(notify_error)?;
        self.broadcaster
            .send(NotificationPayload::RefreshMessages)
            .await
            .map_err(notify_error)?;
        Ok(())
    }
}

fn notify_error(e: AppError) -> AppError {
    match e {
        AppError::Notify(_) => e,
        other => AppError::Notify(other.to_string()),
    }
}
