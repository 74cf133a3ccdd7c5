//! Executes resource commands against an [`Api`]

use std::sync::Arc;

use deploys_protocol::Empty;
use serde::Serialize;

use super::commands::{
    DeploymentCommand, DiskCommand, LocationCommand, PullSecretCommand, RouteCommand,
    WorkloadIdentityCommand,
};
use super::output::{render, OutputFormat};
use super::{Cli, Commands};
use crate::errors::ControlError;
use crate::http::api::Api;
use crate::http::client::HttpClient;
use crate::models::Table;

/// Run a resource command over HTTP and return the rendered output
pub async fn execute(cli: Cli) -> Result<String, ControlError> {
    let client = HttpClient::new(&cli.endpoint, cli.credentials())?;
    let api = Api::new(Arc::new(client));
    execute_with(&api, cli.command, cli.output).await
}

/// Run a resource command against any transport
pub async fn execute_with(
    api: &Api,
    command: Commands,
    output: OutputFormat,
) -> Result<String, ControlError> {
    match command {
        Commands::Deployment(cmd) => deployment(api, cmd, output).await,
        Commands::Disk(cmd) => disk(api, cmd, output).await,
        Commands::PullSecret(cmd) => pull_secret(api, cmd, output).await,
        Commands::WorkloadIdentity(cmd) => workload_identity(api, cmd, output).await,
        Commands::Route(cmd) => route(api, cmd, output).await,
        Commands::Location(cmd) => location(api, cmd, output).await,
        Commands::Serve(_) | Commands::Version => Err(ControlError::InvalidRequest(
            "not a resource command".to_string(),
        )),
    }
}

fn done(output: OutputFormat) -> Result<String, ControlError> {
    render(&Empty {}, output)
}

fn show<T: Serialize + Table>(value: T, output: OutputFormat) -> Result<String, ControlError> {
    render(&value, output)
}

async fn deployment(
    api: &Api,
    cmd: DeploymentCommand,
    output: OutputFormat,
) -> Result<String, ControlError> {
    match cmd {
        DeploymentCommand::List(args) => show(api.deployment_list(&args.into()).await?, output),
        DeploymentCommand::Get(args) => show(api.deployment_get(&args.into()).await?, output),
        DeploymentCommand::Deploy(args) => {
            api.deployment_deploy(&(*args).into()).await?;
            done(output)
        }
        DeploymentCommand::SetImage(args) => {
            api.deployment_deploy(&args.into()).await?;
            done(output)
        }
        DeploymentCommand::Revisions(args) => {
            show(api.deployment_revisions(&args.into()).await?, output)
        }
        DeploymentCommand::Resume(args) => {
            api.deployment_resume(&args.into()).await?;
            done(output)
        }
        DeploymentCommand::Pause(args) => {
            api.deployment_pause(&args.into()).await?;
            done(output)
        }
        DeploymentCommand::Rollback(args) => {
            api.deployment_rollback(&args.into()).await?;
            done(output)
        }
        DeploymentCommand::Delete(args) => {
            api.deployment_delete(&args.into()).await?;
            done(output)
        }
    }
}

async fn disk(api: &Api, cmd: DiskCommand, output: OutputFormat) -> Result<String, ControlError> {
    match cmd {
        DiskCommand::Create(args) => {
            api.disk_create(&args.into()).await?;
            done(output)
        }
        DiskCommand::Get(args) => show(api.disk_get(&args.into()).await?, output),
        DiskCommand::List(args) => show(api.disk_list(&args.into()).await?, output),
        DiskCommand::Update(args) => {
            api.disk_update(&args.into()).await?;
            done(output)
        }
        DiskCommand::Delete(args) => {
            api.disk_delete(&args.into()).await?;
            done(output)
        }
    }
}

async fn pull_secret(
    api: &Api,
    cmd: PullSecretCommand,
    output: OutputFormat,
) -> Result<String, ControlError> {
    match cmd {
        PullSecretCommand::Create(args) => {
            api.pullsecret_create(&args.into()).await?;
            done(output)
        }
        PullSecretCommand::Get(args) => show(api.pullsecret_get(&args.into()).await?, output),
        PullSecretCommand::List(args) => show(api.pullsecret_list(&args.into()).await?, output),
        PullSecretCommand::Delete(args) => {
            api.pullsecret_delete(&args.into()).await?;
            done(output)
        }
    }
}

async fn workload_identity(
    api: &Api,
    cmd: WorkloadIdentityCommand,
    output: OutputFormat,
) -> Result<String, ControlError> {
    match cmd {
        WorkloadIdentityCommand::Create(args) => {
            api.workload_identity_create(&args.into()).await?;
            done(output)
        }
        WorkloadIdentityCommand::Get(args) => {
            show(api.workload_identity_get(&args.into()).await?, output)
        }
        WorkloadIdentityCommand::List(args) => {
            show(api.workload_identity_list(&args.into()).await?, output)
        }
        WorkloadIdentityCommand::Delete(args) => {
            api.workload_identity_delete(&args.into()).await?;
            done(output)
        }
    }
}

async fn route(api: &Api, cmd: RouteCommand, output: OutputFormat) -> Result<String, ControlError> {
    match cmd {
        RouteCommand::List(args) => show(api.route_list(&args.into()).await?, output),
        RouteCommand::Get(args) => show(api.route_get(&args.into()).await?, output),
        RouteCommand::Create(args) => {
            api.route_create(&args.into()).await?;
            done(output)
        }
        RouteCommand::Delete(args) => {
            api.route_delete(&args.into()).await?;
            done(output)
        }
    }
}

async fn location(
    api: &Api,
    cmd: LocationCommand,
    output: OutputFormat,
) -> Result<String, ControlError> {
    match cmd {
        LocationCommand::List => show(api.location_list().await?, output),
        LocationCommand::Get { id } => show(api.location_get(&id).await?, output),
    }
}
