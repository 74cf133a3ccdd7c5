//! Results reported back by location agents

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::command::{Command, CommandKind};

/// Outcome of one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub kind: CommandKind,
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
    pub success: bool,
    /// Delete failed with provider-side resources left behind
    #[serde(default)]
    pub cleanup_pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(command: &Command) -> Self {
        CommandResult {
            kind: command.kind(),
            id: command.resource().id,
            revision: command.revision(),
            success: true,
            cleanup_pending: false,
            node_port: None,
            message: None,
        }
    }

    pub fn failure(command: &Command, message: impl Into<String>) -> Self {
        CommandResult {
            success: false,
            message: Some(message.into()),
            ..CommandResult::success(command)
        }
    }

    pub fn with_node_port(mut self, port: u16) -> Self {
        self.node_port = Some(port);
        self
    }

    pub fn with_cleanup_pending(mut self) -> Self {
        self.cleanup_pending = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetResultsRequest {
    pub location: String,
    pub results: Vec<CommandResult>,
}
