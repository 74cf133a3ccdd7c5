//! Commands pulled by location agents

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::spec::{DeploymentSpec, SidecarConfig};

/// Identity of the resource a command acts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandTarget {
    pub id: Uuid,
    pub project_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullSecretCommand {
    #[serde(flatten)]
    pub resource: CommandTarget,
    /// Base64 encoded docker config JSON
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadIdentityCommand {
    #[serde(flatten)]
    pub resource: CommandTarget,
    pub gsa: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskCommand {
    #[serde(flatten)]
    pub resource: CommandTarget,
    /// Size in GiB
    pub size: u32,
}

/// Deploy a revision, carrying everything the agent needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentCommand {
    #[serde(flatten)]
    pub resource: CommandTarget,
    pub revision: u64,
    pub spec: DeploymentSpec,
    #[serde(default)]
    pub sidecars: Vec<SidecarConfig>,
}

/// Pause, delete or cleanup of a deployment revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRef {
    #[serde(flatten)]
    pub resource: CommandTarget,
    pub revision: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteBasicAuth {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteForwardAuth {
    pub target: String,
    pub auth_request_headers: Vec<String>,
    pub auth_response_headers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteConfig {
    pub basic_auth: Option<RouteBasicAuth>,
    pub forward_auth: Option<RouteForwardAuth>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCommand {
    #[serde(flatten)]
    pub resource: CommandTarget,
    pub domain: String,
    pub path: String,
    pub target: String,
    #[serde(default)]
    pub config: RouteConfig,
}

/// A unit of work for a location agent.
///
/// Encoded as an object with exactly one key naming the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    PullSecretCreate(PullSecretCommand),
    PullSecretDelete(CommandTarget),
    WorkloadIdentityCreate(WorkloadIdentityCommand),
    WorkloadIdentityDelete(CommandTarget),
    DiskCreate(DiskCommand),
    DiskDelete(CommandTarget),
    DeploymentDeploy(DeploymentCommand),
    DeploymentDelete(DeploymentRef),
    DeploymentPause(DeploymentRef),
    DeploymentCleanup(DeploymentRef),
    RouteCreate(RouteCommand),
    RouteDelete(CommandTarget),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::PullSecretCreate(_) => CommandKind::PullSecretCreate,
            Command::PullSecretDelete(_) => CommandKind::PullSecretDelete,
            Command::WorkloadIdentityCreate(_) => CommandKind::WorkloadIdentityCreate,
            Command::WorkloadIdentityDelete(_) => CommandKind::WorkloadIdentityDelete,
            Command::DiskCreate(_) => CommandKind::DiskCreate,
            Command::DiskDelete(_) => CommandKind::DiskDelete,
            Command::DeploymentDeploy(_) => CommandKind::DeploymentDeploy,
            Command::DeploymentDelete(_) => CommandKind::DeploymentDelete,
            Command::DeploymentPause(_) => CommandKind::DeploymentPause,
            Command::DeploymentCleanup(_) => CommandKind::DeploymentCleanup,
            Command::RouteCreate(_) => CommandKind::RouteCreate,
            Command::RouteDelete(_) => CommandKind::RouteDelete,
        }
    }

    pub fn resource(&self) -> &CommandTarget {
        match self {
            Command::PullSecretCreate(c) => &c.resource,
            Command::WorkloadIdentityCreate(c) => &c.resource,
            Command::DiskCreate(c) => &c.resource,
            Command::DeploymentDeploy(c) => &c.resource,
            Command::DeploymentDelete(c)
            | Command::DeploymentPause(c)
            | Command::DeploymentCleanup(c) => &c.resource,
            Command::RouteCreate(c) => &c.resource,
            Command::PullSecretDelete(t)
            | Command::WorkloadIdentityDelete(t)
            | Command::DiskDelete(t)
            | Command::RouteDelete(t) => t,
        }
    }

    /// Deployment revision the command was issued for
    pub fn revision(&self) -> Option<u64> {
        match self {
            Command::DeploymentDeploy(c) => Some(c.revision),
            Command::DeploymentDelete(c)
            | Command::DeploymentPause(c)
            | Command::DeploymentCleanup(c) => Some(c.revision),
            _ => None,
        }
    }
}

/// Discriminant of [`Command`], used to correlate results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandKind {
    PullSecretCreate,
    PullSecretDelete,
    WorkloadIdentityCreate,
    WorkloadIdentityDelete,
    DiskCreate,
    DiskDelete,
    DeploymentDeploy,
    DeploymentDelete,
    DeploymentPause,
    DeploymentCleanup,
    RouteCreate,
    RouteDelete,
}

impl CommandKind {
    pub const ALL: [CommandKind; 12] = [
        CommandKind::PullSecretCreate,
        CommandKind::PullSecretDelete,
        CommandKind::WorkloadIdentityCreate,
        CommandKind::WorkloadIdentityDelete,
        CommandKind::DiskCreate,
        CommandKind::DiskDelete,
        CommandKind::DeploymentDeploy,
        CommandKind::DeploymentDelete,
        CommandKind::DeploymentPause,
        CommandKind::DeploymentCleanup,
        CommandKind::RouteCreate,
        CommandKind::RouteDelete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::PullSecretCreate => "pullSecretCreate",
            CommandKind::PullSecretDelete => "pullSecretDelete",
            CommandKind::WorkloadIdentityCreate => "workloadIdentityCreate",
            CommandKind::WorkloadIdentityDelete => "workloadIdentityDelete",
            CommandKind::DiskCreate => "diskCreate",
            CommandKind::DiskDelete => "diskDelete",
            CommandKind::DeploymentDeploy => "deploymentDeploy",
            CommandKind::DeploymentDelete => "deploymentDelete",
            CommandKind::DeploymentPause => "deploymentPause",
            CommandKind::DeploymentCleanup => "deploymentCleanup",
            CommandKind::RouteCreate => "routeCreate",
            CommandKind::RouteDelete => "routeDelete",
        }
    }

    /// Deployment commands are correlated by revision as well
    pub fn is_deployment(&self) -> bool {
        matches!(
            self,
            CommandKind::DeploymentDeploy
                | CommandKind::DeploymentDelete
                | CommandKind::DeploymentPause
                | CommandKind::DeploymentCleanup
        )
    }

    /// Whether a successful result removes the resource
    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            CommandKind::PullSecretDelete
                | CommandKind::WorkloadIdentityDelete
                | CommandKind::DiskDelete
                | CommandKind::DeploymentDelete
                | CommandKind::DeploymentCleanup
                | CommandKind::RouteDelete
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown command kind: {}", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCommandsRequest {
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCommandsResult {
    pub commands: Vec<Command>,
}
