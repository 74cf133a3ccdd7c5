//! Deploys protocol models
//!
//! Wire types shared by the control plane, the API client and location agents.

pub mod models;

pub use models::command::{
    Command, CommandKind, CommandTarget, DeploymentCommand, DeploymentRef, DiskCommand,
    GetCommandsRequest, GetCommandsResult, PullSecretCommand, RouteBasicAuth, RouteCommand,
    RouteConfig, RouteForwardAuth, WorkloadIdentityCommand,
};
pub use models::envelope::{ApiError, Empty, Envelope, ValidationItem};
pub use models::error_code::ErrorCode;
pub use models::result::{CommandResult, SetResultsRequest};
pub use models::spec::{
    CloudSqlProxySidecar, DeploymentDisk, DeploymentProtocol, DeploymentResources,
    DeploymentSpec, DeploymentType, ResourceItem, Sidecar, SidecarConfig,
};
pub use models::status::{Action, Status};
