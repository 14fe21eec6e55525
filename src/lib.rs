pub mod badge;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod notifications;
mod validation;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use badge::LogBadge;
use config::{AppConfig, StorageBackend};
use engine::controller::MessageStore;
use engine::source::MockMessageSource;
use engine::storage::{KeyValueStore, MemoryStore, SqliteStore};
use engine::types::CommandRequest;
use engine::{EngineSettings, InboxEngine};
use error::AppError;
use notifications::ChannelBroadcaster;

/// Shared application state: the engine plus handles to its concrete sinks.
pub struct AppState {
    pub engine: Arc<InboxEngine>,
    pub badge: Arc<LogBadge>,
    pub broadcaster: ChannelBroadcaster,
    pub config: AppConfig,
}

impl AppState {
    /// Wire the storage backend, sinks and message source from `config`.
    pub fn build(config: AppConfig) -> Result<Self, AppError> {
        let store: Arc<dyn KeyValueStore> = match config.storage {
            StorageBackend::Sqlite => {
                let pool = db::init_db(&config.data_dir)?;
                tracing::info!("Database pool ready (max_size=4)");
                Arc::new(SqliteStore::new(pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; messages are lost on exit");
                Arc::new(MemoryStore::new())
            }
        };

        let badge = Arc::new(LogBadge::new());
        let broadcaster = ChannelBroadcaster::default();
        let controller = Arc::new(MessageStore::new(
            store,
            badge.clone(),
            Arc::new(broadcaster.clone()),
        ));
        let source = Arc::new(MockMessageSource::new(config.fetch_delay));
        let engine = Arc::new(InboxEngine::new(
            controller,
            source,
            EngineSettings::from(&config),
        ));

        Ok(Self {
            engine,
            badge,
            broadcaster,
            config,
        })
    }
}

/// Run the background worker until stdin closes or Ctrl-C.
///
/// Newline-delimited JSON commands on stdin are dispatched; every broadcast
/// notification is written to stdout as one JSON line.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting inbox background v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::build(config)?;

    tokio::spawn(forward_notifications(state.broadcaster.subscribe()));
    engine::background::on_installed(&state.engine);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => handle_input_line(&state.engine, &line),
                None => {
                    tracing::info!("Command input closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received");
                break;
            }
        }
    }

    let stats = state.engine.scheduler.stats();
    tracing::info!(
        cycles_run = stats.cycles_run,
        cycles_failed = stats.cycles_failed,
        commands_dispatched = stats.commands_dispatched,
        commands_dropped = stats.commands_dropped,
        commands_failed = stats.commands_failed,
        badge = %state.badge.text(),
        "Shutting down"
    );
    Ok(())
}

fn handle_input_line(engine: &Arc<InboxEngine>, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match serde_json::from_str::<CommandRequest>(line) {
        Ok(request) => {
            engine.dispatch(request);
        }
        Err(e) => tracing::error!("Malformed command: {}", e),
    }
}

async fn forward_notifications(
    mut rx: tokio::sync::broadcast::Receiver<engine::types::NotificationPayload>,
) {
    use tokio::sync::broadcast::error::RecvError;

    let mut stdout = tokio::io::stdout();
    loop {
        match rx.recv().await {
            Ok(payload) => {
                let Ok(mut line) = serde_json::to_string(&payload) else {
                    continue;
                };
                line.push('\n');
                if let Err(e) = stdout.write_all(line.as_bytes()).await {
                    tracing::warn!("Failed to write notification: {}", e);
                }
                let _ = stdout.flush().await;
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Notification listener lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
