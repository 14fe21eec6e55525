use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::db::models::Message;
use crate::error::AppError;
use crate::validation;

/// Inbound command as it arrives from the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommandRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub new_message: Option<Message>,
}

impl CommandRequest {
    pub fn action(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Default::default()
        }
    }

    pub fn with_message_id(mut self, id: &str) -> Self {
        self.message_id = Some(id.to_string());
        self
    }

    pub fn with_new_message(mut self, message: Message) -> Self {
        self.new_message = Some(message);
        self
    }
}

/// Validated command routed by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SimulateAdminSendingMessages,
    MarkAsRead { message_id: String },
    DeleteMessage { message_id: String },
    AddMessage { new_message: Message },
    CheckMessages,
    MarkAllAsRead,
    DeleteAllMessages,
}

impl Command {
    /// Validate a request.
    ///
    /// Returns `Ok(None)` when a required field is missing: such commands are
    /// dropped without touching the store. Unknown actions are
    /// [`AppError::UnrecognizedCommand`].
    pub fn parse(request: CommandRequest) -> Result<Option<Command>, AppError> {
        let CommandRequest {
            action,
            message_id,
            new_message,
        } = request;
        let message_id = validation::present(message_id);

        let command = match action.as_str() {
            "simulateAdminSendingMessages" => Some(Command::SimulateAdminSendingMessages),
            "markAsRead" => message_id.map(|message_id| Command::MarkAsRead { message_id }),
            "deleteMessage" => message_id.map(|message_id| Command::DeleteMessage { message_id }),
            "addMessage" => new_message.map(|new_message| Command::AddMessage { new_message }),
            "checkMessages" => Some(Command::CheckMessages),
            "markAllAsRead" => Some(Command::MarkAllAsRead),
            "deleteAllMessages" => Some(Command::DeleteAllMessages),
            _ => return Err(AppError::UnrecognizedCommand(action)),
        };
        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SimulateAdminSendingMessages => "simulateAdminSendingMessages",
            Command::MarkAsRead { .. } => "markAsRead",
            Command::DeleteMessage { .. } => "deleteMessage",
            Command::AddMessage { .. } => "addMessage",
            Command::CheckMessages => "checkMessages",
            Command::MarkAllAsRead => "markAllAsRead",
            Command::DeleteAllMessages => "deleteAllMessages",
        }
    }
}

/// Notification shapes sent to UI listeners over the broadcast channel.
/// The store only ever emits `RefreshMessages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "camelCase")]
#[ts(export)]
pub enum NotificationPayload {
    RefreshMessages,
    DeleteMessage {
        #[serde(rename = "messageId")]
        message_id: String,
    },
    MarkAsRead {
        #[serde(rename = "messageId")]
        message_id: String,
    },
    MarkAllAsRead,
    DeleteAllMessages,
}
