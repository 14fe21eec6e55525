//! Command dispatcher: routes inbound UI commands to the store controller.
//!
//! Dispatch is fire-and-forget. Each accepted command runs as its own task and
//! its outcome is only logged; the issuer never receives a result. Commands
//! missing a required field are dropped before any store access.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::engine::types::{Command, CommandRequest};
use crate::engine::InboxEngine;
use crate::error::AppError;

impl InboxEngine {
    /// Validate `request` and spawn its handler.
    ///
    /// Returns the task handle for accepted commands so callers that care
    /// (tests, shutdown) can await completion. The handle yields no result.
    pub fn dispatch(self: &Arc<Self>, request: CommandRequest) -> Option<JoinHandle<()>> {
        let command = match Command::parse(request) {
            Ok(Some(command)) => command,
            Ok(None) => {
                self.scheduler.commands_dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Command missing required field, dropped");
                return None;
            }
            Err(e) => {
                self.scheduler.commands_failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(kind = e.kind(), "{}", e);
                return None;
            }
        };

        self.scheduler
            .commands_dispatched
            .fetch_add(1, Ordering::Relaxed);
        let engine = self.clone();
        Some(tokio::spawn(async move {
            let name = command.name();
            if let Err(e) = engine.handle(command).await {
                engine.scheduler.commands_failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(action = name, kind = e.kind(), "{}: {}", failure_context(name), e);
            }
        }))
    }

    /// Run a validated command to completion.
    pub async fn handle(&self, command: Command) -> Result<(), AppError> {
        match command {
            Command::SimulateAdminSendingMessages => {
                self.simulate_admin_sending_messages().await;
                Ok(())
            }
            Command::MarkAsRead { message_id } => self.store.mark_as_read(&message_id).await,
            Command::DeleteMessage { message_id } => self.store.delete_message(&message_id).await,
            Command::AddMessage { new_message } => self.store.add_message(new_message).await,
            Command::CheckMessages => self.poll_cycle().await.map(|_| ()),
            Command::MarkAllAsRead => self.store.mark_all_as_read().await,
            Command::DeleteAllMessages => self.store.delete_all_messages().await,
        }
    }

    /// Add a synthesized batch one record at a time. A failed add is logged
    /// and the rest of the batch still goes through.
    async fn simulate_admin_sending_messages(&self) {
        let batch = self.source.synthesize(self.settings.bulk_batch_size);
        for message in batch {
            let id = message.id.clone();
            if let Err(e) = self.store.add_message(message).await {
                tracing::error!(message_id = %id, kind = e.kind(), "Error adding message: {}", e);
            }
        }
    }
}

fn failure_context(action: &str) -> &'static str {
    match action {
        "simulateAdminSendingMessages" => "Failed to simulate admin sending messages",
        "markAsRead" => "Failed to mark message as read",
        "deleteMessage" => "Failed to delete message",
        "addMessage" => "Failed to add message",
        "checkMessages" => "Failed to check for messages",
        "markAllAsRead" => "Failed to mark all messages as read",
        "deleteAllMessages" => "Failed to delete all messages",
        _ => "Command failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Message, Priority};
    use crate::engine::source::{MessageSource, MockMessageSource};
    use crate::engine::testing::Harness;
    use crate::engine::types::NotificationPayload;
    use crate::engine::EngineSettings;
    use std::time::Duration;

    fn msg(id: &str) -> Message {
        Message {
            id: id.into(),
            content: format!("content {id}"),
            priority: Priority::Low,
            timestamp: "2024-10-30T15:00:00Z".into(),
            read: false,
        }
    }

    /// Source whose synthesized batch is fixed up front.
    struct FixedSource {
        batch: Vec<Message>,
    }

    #[async_trait::async_trait]
    impl MessageSource for FixedSource {
        async fn fetch_new(&self, _count: usize) -> Result<Vec<Message>, AppError> {
            Ok(self.batch.clone())
        }

        fn synthesize(&self, _count: usize) -> Vec<Message> {
            self.batch.clone()
        }
    }

    fn engine_with(h: &Harness, source: Arc<dyn MessageSource>) -> Arc<InboxEngine> {
        Arc::new(InboxEngine::new(
            h.controller.clone(),
            source,
            EngineSettings::default(),
        ))
    }

    fn engine(h: &Harness) -> Arc<InboxEngine> {
        engine_with(h, Arc::new(MockMessageSource::new(Duration::ZERO)))
    }

    async fn run(engine: &Arc<InboxEngine>, request: CommandRequest) {
        engine
            .dispatch(request)
            .expect("command should be accepted")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_message_command() {
        let h = Harness::new();
        let engine = engine(&h);
        run(&engine, CommandRequest::action("addMessage").with_new_message(msg("m1"))).await;

        assert_eq!(h.stored().await, vec![msg("m1")]);
        assert_eq!(h.broadcasts(), 1);
        assert_eq!(engine.scheduler.stats().commands_dispatched, 1);
    }

    #[tokio::test]
    async fn test_add_colliding_id_leaves_store_unchanged() {
        let h = Harness::seeded(vec![msg("m1")]).await;
        let engine = engine(&h);
        let mut dup = msg("m1");
        dup.priority = Priority::High;

        run(&engine, CommandRequest::action("addMessage").with_new_message(dup)).await;

        assert_eq!(h.stored().await, vec![msg("m1")]);
        assert_eq!(h.broadcasts(), 0);
        assert_eq!(engine.scheduler.stats().commands_failed, 1);
    }

    #[tokio::test]
    async fn test_missing_message_id_never_touches_store() {
        let h = Harness::seeded(vec![msg("m1")]).await;
        let engine = engine(&h);

        assert!(engine.dispatch(CommandRequest::action("deleteMessage")).is_none());
        assert!(engine.dispatch(CommandRequest::action("markAsRead")).is_none());
        assert!(engine.dispatch(CommandRequest::action("addMessage")).is_none());
        tokio::task::yield_now().await;

        assert_eq!(h.store.accesses(), 0);
        assert!(h.events().is_empty());
        assert_eq!(engine.scheduler.stats().commands_dropped, 3);
    }

    #[tokio::test]
    async fn test_unknown_action_is_logged_and_ignored() {
        let h = Harness::new();
        let engine = engine(&h);

        assert!(engine.dispatch(CommandRequest::action("launchRockets")).is_none());
        assert_eq!(h.store.accesses(), 0);
        assert_eq!(engine.scheduler.stats().commands_failed, 1);
    }

    #[tokio::test]
    async fn test_mark_and_delete_commands() {
        let h = Harness::seeded(vec![msg("a"), msg("b")]).await;
        let engine = engine(&h);

        run(&engine, CommandRequest::action("markAsRead").with_message_id("a")).await;
        run(&engine, CommandRequest::action("deleteMessage").with_message_id("b")).await;

        let stored = h.stored().await;
        assert_eq!(stored.len(), 1);
        assert!(stored[0].read);
        assert_eq!(h.badge_texts(), vec!["1", ""]);
    }

    #[tokio::test]
    async fn test_mark_as_read_unknown_id_has_no_effect() {
        let h = Harness::seeded(vec![msg("a")]).await;
        let engine = engine(&h);

        run(&engine, CommandRequest::action("markAsRead").with_message_id("zzz")).await;
        assert!(h.events().is_empty());
        assert_eq!(engine.scheduler.stats().commands_failed, 1);
    }

    #[tokio::test]
    async fn test_bulk_commands() {
        let h = Harness::seeded(vec![msg("a"), msg("b")]).await;
        let engine = engine(&h);

        run(&engine, CommandRequest::action("markAllAsRead")).await;
        assert!(h.stored().await.iter().all(|m| m.read));

        run(&engine, CommandRequest::action("deleteAllMessages")).await;
        assert!(h.stored().await.is_empty());
        assert_eq!(
            h.events().last(),
            Some(&crate::engine::testing::SinkEvent::Broadcast(
                NotificationPayload::RefreshMessages
            ))
        );
    }

    #[tokio::test]
    async fn test_check_messages_runs_a_poll_cycle() {
        let h = Harness::new();
        let engine = engine(&h);

        run(&engine, CommandRequest::action("checkMessages")).await;
        assert_eq!(h.stored().await.len(), 3);
        run(&engine, CommandRequest::action("checkMessages")).await;
        assert_eq!(h.stored().await.len(), 4);
    }

    #[tokio::test]
    async fn test_simulate_adds_five_records_one_by_one() {
        let h = Harness::new();
        let engine = engine(&h);

        run(&engine, CommandRequest::action("simulateAdminSendingMessages")).await;
        assert_eq!(h.stored().await.len(), 5);
        // One commit per record, not a single merge.
        assert_eq!(h.broadcasts(), 5);
        assert_eq!(h.badge_texts(), vec!["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn test_simulate_continues_past_duplicate() {
        let h = Harness::seeded(vec![msg("dup")]).await;
        let source = Arc::new(FixedSource {
            batch: vec![msg("x"), msg("dup"), msg("y")],
        });
        let engine = engine_with(&h, source);

        run(&engine, CommandRequest::action("simulateAdminSendingMessages")).await;

        let ids: Vec<_> = h.stored().await.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["dup", "x", "y"]);
        assert_eq!(h.broadcasts(), 2);
        // Per-record failures stay inside the bulk operation.
        assert_eq!(engine.scheduler.stats().commands_failed, 0);
    }

    #[tokio::test]
    async fn test_badge_failure_counts_as_failed_command() {
        let h = Harness::new();
        h.fail_badge(true);
        let engine = engine(&h);

        run(&engine, CommandRequest::action("addMessage").with_new_message(msg("a"))).await;

        assert_eq!(h.stored().await.len(), 1);
        assert_eq!(h.broadcasts(), 0);
        let stats = engine.scheduler.stats();
        assert_eq!(stats.commands_failed, 1);
        assert_eq!(stats.commands_dispatched, 1);
    }

    #[tokio::test]
    async fn test_handle_returns_typed_errors() {
        let h = Harness::seeded(vec![msg("a")]).await;
        let engine = engine(&h);

        let err = engine
            .handle(Command::AddMessage { new_message: msg("a") })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateId(_)));

        let err = engine
            .handle(Command::MarkAsRead { message_id: "nope".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(engine
            .handle(Command::DeleteMessage { message_id: "nope".into() })
            .await
            .is_ok());
    }

    #[test]
    fn test_failure_context_covers_every_action() {
        for action in [
            "simulateAdminSendingMessages",
            "markAsRead",
            "deleteMessage",
            "addMessage",
            "checkMessages",
            "markAllAsRead",
            "deleteAllMessages",
        ] {
            assert_ne!(failure_context(action), "Command failed");
        }
    }
}
