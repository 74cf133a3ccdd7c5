//! Resource subcommands and their request mapping

use std::collections::BTreeMap;

use clap::{Args, Subcommand};
use deploys_protocol::{
    DeploymentDisk, DeploymentProtocol, DeploymentType, RouteBasicAuth, RouteConfig,
    RouteForwardAuth,
};

use super::{ScopeArgs, TargetArgs};
use crate::models::deployment::{DeploymentDeploy, DeploymentGet, DeploymentRollback};
use crate::models::disk::DiskCreate;
use crate::models::pullsecret::{PullSecretCreate, PullSecretSpec};
use crate::models::route::{RouteCreate, RouteRef};
use crate::models::workload_identity::WorkloadIdentityCreate;

/// Parse a `KEY=VALUE` pair
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    Some(values).filter(|v| !v.is_empty())
}

fn to_map(pairs: Vec<(String, String)>) -> BTreeMap<String, String> {
    pairs.into_iter().collect()
}

// ================================ DEPLOYMENT =================================== //

#[derive(Debug, Subcommand)]
pub enum DeploymentCommand {
    /// List deployments
    List(ScopeArgs),
    /// Show one deployment revision
    Get(DeploymentGetArgs),
    /// Create a deployment or a new revision
    Deploy(Box<DeployArgs>),
    /// Deploy a new image, keeping the rest of the spec
    SetImage(SetImageArgs),
    /// List revisions, newest first
    Revisions(TargetArgs),
    /// Resume a paused deployment
    Resume(TargetArgs),
    /// Pause a deployment
    Pause(TargetArgs),
    /// Redeploy the spec of an earlier revision
    Rollback(RollbackArgs),
    /// Delete a deployment
    Delete(TargetArgs),
}

#[derive(Debug, Args)]
pub struct DeploymentGetArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Revision, latest when 0
    #[arg(long, default_value_t = 0)]
    pub revision: i64,
}

impl From<DeploymentGetArgs> for DeploymentGet {
    fn from(args: DeploymentGetArgs) -> Self {
        DeploymentGet {
            project: args.target.project,
            location: args.target.location,
            name: args.target.name,
            revision: args.revision,
        }
    }
}

#[derive(Debug, Args)]
pub struct RollbackArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Revision to roll back to
    #[arg(long)]
    pub revision: i64,
}

impl From<RollbackArgs> for DeploymentRollback {
    fn from(args: RollbackArgs) -> Self {
        DeploymentRollback {
            project: args.target.project,
            location: args.target.location,
            name: args.target.name,
            revision: args.revision,
        }
    }
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Container image
    #[arg(long, default_value_t)]
    pub image: String,

    /// WebService, Worker, CronJob, TCPService or InternalTCPService
    #[arg(long = "type")]
    pub deployment_type: Option<DeploymentType>,

    #[arg(long)]
    pub port: Option<u32>,

    /// http, https or h2c
    #[arg(long)]
    pub protocol: Option<DeploymentProtocol>,

    #[arg(long)]
    pub min_replicas: Option<i64>,

    #[arg(long)]
    pub max_replicas: Option<i64>,

    /// Replace the whole env, repeatable KEY=VALUE
    #[arg(long, value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// Add or overwrite one variable, repeatable KEY=VALUE
    #[arg(long, value_parser = parse_key_value)]
    pub add_env: Vec<(String, String)>,

    /// Remove one variable, repeatable
    #[arg(long)]
    pub remove_env: Vec<String>,

    /// Entrypoint override, repeatable
    #[arg(long)]
    pub command: Vec<String>,

    /// Argument override, repeatable
    #[arg(long = "arg")]
    pub args: Vec<String>,

    /// Workload identity name, empty to detach
    #[arg(long)]
    pub workload_identity: Option<String>,

    /// Pull secret name, empty to detach
    #[arg(long)]
    pub pull_secret: Option<String>,

    /// Cron schedule
    #[arg(long)]
    pub schedule: Option<String>,

    #[arg(long)]
    pub disk_name: Option<String>,

    #[arg(long, default_value_t)]
    pub disk_mount_path: String,

    #[arg(long, default_value_t)]
    pub disk_sub_path: String,

    /// Repeatable KEY=VALUE
    #[arg(long, value_parser = parse_key_value)]
    pub annotation: Vec<(String, String)>,
}

impl From<DeployArgs> for DeploymentDeploy {
    fn from(args: DeployArgs) -> Self {
        let disk = args.disk_name.map(|name| DeploymentDisk {
            name,
            mount_path: args.disk_mount_path,
            sub_path: args.disk_sub_path,
        });

        DeploymentDeploy {
            project: args.target.project,
            location: args.target.location,
            name: args.target.name,
            image: args.image,
            deployment_type: args.deployment_type,
            min_replicas: args.min_replicas,
            max_replicas: args.max_replicas,
            port: args.port,
            protocol: args.protocol,
            env: non_empty(args.env).map(to_map),
            add_env: to_map(args.add_env),
            remove_env: args.remove_env,
            command: non_empty(args.command),
            args: non_empty(args.args),
            workload_identity: args.workload_identity,
            pull_secret: args.pull_secret,
            disk,
            schedule: args.schedule,
            annotations: non_empty(args.annotation).map(to_map),
            ..Default::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct SetImageArgs {
    /// Deployment name
    pub name: String,

    #[arg(long, default_value_t)]
    pub project: String,

    #[arg(long, default_value_t)]
    pub location: String,

    #[arg(long, default_value_t)]
    pub image: String,
}

impl From<SetImageArgs> for DeploymentDeploy {
    fn from(args: SetImageArgs) -> Self {
        DeploymentDeploy {
            project: args.project,
            location: args.location,
            name: args.name,
            image: args.image,
            ..Default::default()
        }
    }
}

// =================================== DISK ====================================== //

#[derive(Debug, Subcommand)]
pub enum DiskCommand {
    /// Create a disk
    Create(DiskCreateArgs),
    /// Show one disk
    Get(TargetArgs),
    /// List disks
    List(ScopeArgs),
    /// Grow a disk
    Update(DiskUpdateArgs),
    /// Delete an unused disk
    Delete(TargetArgs),
}

#[derive(Debug, Args)]
pub struct DiskCreateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Size in GiB
    #[arg(long, default_value_t = 1)]
    pub size: i64,
}

#[derive(Debug, Args)]
pub struct DiskUpdateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// New size in GiB
    #[arg(long, default_value_t = 0)]
    pub size: i64,
}

fn disk_request(target: TargetArgs, size: i64) -> DiskCreate {
    DiskCreate {
        project: target.project,
        location: target.location,
        name: target.name,
        size,
    }
}

impl From<DiskCreateArgs> for DiskCreate {
    fn from(args: DiskCreateArgs) -> Self {
        disk_request(args.target, args.size)
    }
}

impl From<DiskUpdateArgs> for DiskCreate {
    fn from(args: DiskUpdateArgs) -> Self {
        disk_request(args.target, args.size)
    }
}

// ================================ PULL SECRET ================================== //

#[derive(Debug, Subcommand)]
pub enum PullSecretCommand {
    /// Create a pull secret
    Create(PullSecretCreateArgs),
    /// Show one pull secret
    Get(TargetArgs),
    /// List pull secrets
    List(ScopeArgs),
    /// Delete an unused pull secret
    Delete(TargetArgs),
}

#[derive(Debug, Args)]
pub struct PullSecretCreateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Registry URL
    #[arg(long, default_value_t)]
    pub server: String,

    #[arg(long, default_value_t)]
    pub username: String,

    #[arg(long, default_value_t)]
    pub password: String,

    /// Prebuilt base64 docker config, replaces the registry flags
    #[arg(long, default_value_t)]
    pub value: String,
}

impl From<PullSecretCreateArgs> for PullSecretCreate {
    fn from(args: PullSecretCreateArgs) -> Self {
        PullSecretCreate {
            project: args.target.project,
            location: args.target.location,
            name: args.target.name,
            spec: PullSecretSpec {
                server: args.server,
                username: args.username,
                password: args.password,
            },
            value: args.value,
        }
    }
}

// ============================= WORKLOAD IDENTITY =============================== //

#[derive(Debug, Subcommand)]
pub enum WorkloadIdentityCommand {
    /// Create a workload identity
    Create(WorkloadIdentityCreateArgs),
    /// Show one workload identity
    Get(TargetArgs),
    /// List workload identities
    List(ScopeArgs),
    /// Delete an unused workload identity
    Delete(TargetArgs),
}

#[derive(Debug, Args)]
pub struct WorkloadIdentityCreateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Google service account email
    #[arg(long, default_value_t)]
    pub gsa: String,
}

impl From<WorkloadIdentityCreateArgs> for WorkloadIdentityCreate {
    fn from(args: WorkloadIdentityCreateArgs) -> Self {
        WorkloadIdentityCreate {
            project: args.target.project,
            location: args.target.location,
            name: args.target.name,
            gsa: args.gsa,
        }
    }
}

// ================================== ROUTE ====================================== //

#[derive(Debug, Subcommand)]
pub enum RouteCommand {
    /// List routes
    List(ScopeArgs),
    /// Show one route
    Get(RouteArgs),
    /// Create a route
    Create(RouteCreateArgs),
    /// Delete a route
    Delete(RouteArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RouteArgs {
    #[arg(long, default_value_t)]
    pub project: String,

    #[arg(long, default_value_t)]
    pub location: String,

    #[arg(long, default_value_t)]
    pub domain: String,

    /// Path prefix, `/` when omitted
    #[arg(long, default_value_t)]
    pub path: String,
}

impl From<RouteArgs> for RouteRef {
    fn from(args: RouteArgs) -> Self {
        RouteRef {
            project: args.project,
            location: args.location,
            domain: args.domain,
            path: args.path,
        }
    }
}

#[derive(Debug, Args)]
pub struct RouteCreateArgs {
    #[command(flatten)]
    pub route: RouteArgs,

    /// e.g. deployment://api or redirect://example.com
    #[arg(long, default_value_t)]
    pub target: String,

    /// Shorthand for --target deployment://NAME
    #[arg(long, default_value_t)]
    pub deployment: String,

    #[arg(long)]
    pub basic_auth_user: Option<String>,

    #[arg(long, default_value_t)]
    pub basic_auth_password: String,

    /// Forward auth endpoint
    #[arg(long)]
    pub forward_auth: Option<String>,
}

impl From<RouteCreateArgs> for RouteCreate {
    fn from(args: RouteCreateArgs) -> Self {
        let config = RouteConfig {
            basic_auth: args.basic_auth_user.map(|user| RouteBasicAuth {
                user,
                password: args.basic_auth_password,
            }),
            forward_auth: args.forward_auth.map(|target| RouteForwardAuth {
                target,
                ..Default::default()
            }),
        };

        RouteCreate {
            project: args.route.project,
            location: args.route.location,
            domain: args.route.domain,
            path: args.route.path,
            target: args.target,
            deployment: args.deployment,
            config,
        }
    }
}

// ================================= LOCATION ==================================== //

#[derive(Debug, Subcommand)]
pub enum LocationCommand {
    /// List locations
    List,
    /// Show one location
    Get {
        /// Location id
        #[arg(long, default_value_t)]
        id: String,
    },
}
