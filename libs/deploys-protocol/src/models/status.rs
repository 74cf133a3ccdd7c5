//! Resource status and action

use std::fmt;

use serde::{Deserialize, Serialize};

/// Last known outcome of a resource's most recent action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    /// An action is installed and waiting for an agent result
    #[default]
    Pending,

    /// The agent applied the action
    Success,

    /// The agent failed to apply the action
    Error,

    /// The action was superseded before a result arrived
    Cancelled,

    /// A delete failed and provider-side resources may still exist.
    /// Retried only by issuing a new delete.
    ErrorPendingCleanupResource,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Success => "success",
            Status::Error => "error",
            Status::Cancelled => "cancelled",
            Status::ErrorPendingCleanupResource => "errorPendingCleanupResource",
        }
    }

    /// Human readable text, used by table output
    pub fn text(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Success => "Success",
            Status::Error | Status::ErrorPendingCleanupResource => "Error",
            Status::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Pending)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation installed on a resource.
///
/// For resources other than deployments `Deploy` means create/apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Deploy,
    Delete,
    Pause,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Deploy => "deploy",
            Action::Delete => "delete",
            Action::Pause => "pause",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
