//! Deploys - Entry Point
//!
//! `deploys serve` runs the control plane; every other command is a client call.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing::{error, info};

use deploys::app::options::AppOptions;
use deploys::app::run::run;
use deploys::cli::runner::execute;
use deploys::cli::{Cli, Commands, ServeArgs};
use deploys::logs::{init_logging, LogLevel, LogOptions};
use deploys::storage::layout::StorageLayout;
use deploys::storage::settings::Settings;
use deploys::utils::version_info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Version => {
            let version = version_info();
            match serde_json::to_string_pretty(&version) {
                Ok(out) => println!("{}", out),
                Err(_) => println!("{}", version.version),
            }
            ExitCode::SUCCESS
        }
        Commands::Serve(args) => match serve(args.clone()).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{} {:#}", "error:".red().bold(), e);
                ExitCode::FAILURE
            }
        },
        _ => {
            if cli.verbose {
                let log_options = LogOptions {
                    log_level: LogLevel::Debug,
                    ..Default::default()
                };
                if let Err(e) = init_logging(log_options) {
                    eprintln!("Failed to initialize logging: {e}");
                }
            }

            match execute(cli).await {
                Ok(out) => {
                    print!("{}", out);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{} {}", "error:".red().bold(), e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let layout = args
        .data_dir
        .map(StorageLayout::new)
        .unwrap_or_default();

    // Retrieve the settings file, every field is optional
    let settings_file = layout.settings_file();
    let mut settings = settings_file
        .read_json_or_default::<Settings>()
        .await
        .with_context(|| format!("unable to read {}", settings_file.path().display()))?;
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    let options = AppOptions::from_settings(&settings, layout);

    // Initialize logging, the guard flushes the file writer on exit
    let _log_guard = match init_logging(options.logs.clone()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    info!("Running deploys {} with options: {:?}", version_info().version, options);
    run(options, settings, await_shutdown_signal())
        .await
        .inspect_err(|e| error!("Control plane stopped: {e}"))
        .context("control plane failed")
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Unable to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}
