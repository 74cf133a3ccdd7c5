//! Command-line interface
//!
//! Every resource command calls a control plane over HTTP. `serve` runs one.
//!
//! The endpoint and credentials come from flags or the environment:
//!
//! - `DEPLOYS_ENDPOINT` - API endpoint
//! - `DEPLOYS_TOKEN` - bearer token
//! - `DEPLOYS_AUTH_USER` / `DEPLOYS_AUTH_PASS` - basic auth, preferred over the token

pub mod commands;
pub mod output;
pub mod runner;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;

use crate::http::client::Credentials;
use crate::models::{ListScope, ResourceTarget};
use commands::{
    DeploymentCommand, DiskCommand, LocationCommand, PullSecretCommand, RouteCommand,
    WorkloadIdentityCommand,
};
use output::OutputFormat;

/// deploys.app control plane and CLI
#[derive(Debug, Parser)]
#[command(name = "deploys", version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// API endpoint
    #[arg(
        long,
        global = true,
        env = "DEPLOYS_ENDPOINT",
        default_value = "http://127.0.0.1:8080"
    )]
    pub endpoint: String,

    /// Bearer token
    #[arg(long, global = true, env = "DEPLOYS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Basic auth user
    #[arg(long, global = true, env = "DEPLOYS_AUTH_USER")]
    pub auth_user: Option<String>,

    /// Basic auth password
    #[arg(long, global = true, env = "DEPLOYS_AUTH_PASS", hide_env_values = true)]
    pub auth_pass: Option<String>,

    /// Log requests to stdout
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Basic auth when both user and password are set, else the bearer token
    pub fn credentials(&self) -> Option<Credentials> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

        if let (Some(user), Some(pass)) = (non_empty(&self.auth_user), non_empty(&self.auth_pass)) {
            return Some(Credentials::Basic {
                user,
                pass: SecretString::from(pass),
            });
        }
        non_empty(&self.token).map(|token| Credentials::Bearer(SecretString::from(token)))
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage deployments
    #[command(subcommand, visible_aliases = ["deploy", "d"])]
    Deployment(DeploymentCommand),

    /// Manage disks
    #[command(subcommand)]
    Disk(DiskCommand),

    /// Manage registry pull secrets
    #[command(subcommand, name = "pullsecret", visible_alias = "ps")]
    PullSecret(PullSecretCommand),

    /// Manage workload identities
    #[command(subcommand, name = "workloadidentity", visible_alias = "wi")]
    WorkloadIdentity(WorkloadIdentityCommand),

    /// Manage routes
    #[command(subcommand)]
    Route(RouteCommand),

    /// Inspect locations
    #[command(subcommand)]
    Location(LocationCommand),

    /// Run the control plane
    Serve(ServeArgs),

    /// Print build information
    Version,
}

/// One named resource
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Project id
    #[arg(long, default_value_t)]
    pub project: String,

    /// Location id
    #[arg(long, default_value_t)]
    pub location: String,

    /// Resource name
    #[arg(long, default_value_t)]
    pub name: String,
}

impl From<TargetArgs> for ResourceTarget {
    fn from(args: TargetArgs) -> Self {
        ResourceTarget {
            project: args.project,
            location: args.location,
            name: args.name,
        }
    }
}

/// A project, optionally narrowed to one location
#[derive(Debug, Clone, Args)]
pub struct ScopeArgs {
    /// Project id
    #[arg(long, default_value_t)]
    pub project: String,

    /// Location id, every location when omitted
    #[arg(long, default_value_t)]
    pub location: String,
}

impl From<ScopeArgs> for ListScope {
    fn from(args: ScopeArgs) -> Self {
        ListScope {
            project: args.project,
            location: args.location,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Storage directory holding settings.json, snapshots and logs
    #[arg(long, env = "DEPLOYS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the configured listen host
    #[arg(long)]
    pub host: Option<String>,

    /// Override the configured listen port
    #[arg(long)]
    pub port: Option<u16>,
}
