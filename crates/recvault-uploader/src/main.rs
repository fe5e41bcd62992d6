//! Recorded video upload binary.

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use recvault_storage::{BucketSession, UploadResult};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use recvault_uploader::{
    Args, DirectoryReport, Orchestrator, OrchestratorError, OrchestratorResult, R2Settings,
};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Colored output for interactive use, JSON when `LOG_FORMAT=json`.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("recvault=info".parse().expect("static directive"))
        .add_directive("aws_config=warn".parse().expect("static directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    if args.path.is_none() && !args.check {
        Args::command().print_help()?;
        bail!("No path given");
    }

    let (session, delete_after, format_filter) = if args.config {
        info!(path = %args.config_file.display(), "Loading configuration from config file");
        let settings =
            R2Settings::from_file(&args.config_file).context("Failed to load configuration")?;
        let session = settings
            .session()
            .context("Failed to create R2 uploader")?;
        let format_filter = args
            .format_filter
            .clone()
            .or_else(|| settings.upload_format_filter.clone());
        (session, settings.delete_after_upload || args.delete, format_filter)
    } else {
        let config = args.manual_config()?;
        let session = BucketSession::new(config).context("Failed to create R2 uploader")?;
        (session, args.delete, args.format_filter.clone())
    };

    if args.check {
        session
            .check_connectivity()
            .await
            .context("R2 connectivity check failed")?;
        info!(bucket = %session.bucket(), "R2 connectivity check passed");
        return Ok(());
    }

    let Some(path) = args.path.as_deref() else {
        bail!("No path given");
    };

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupt received, finishing current file (press Ctrl-C again to abort)");
        shutdown_tx.send(true).ok();

        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Upload interrupted by user");
            std::process::exit(130);
        }
    });

    let orchestrator = Orchestrator::new(session)
        .with_marker(args.marker.clone())
        .with_shutdown(shutdown_rx.clone());

    if args.dir {
        let outcome = orchestrator
            .upload_directory(path, delete_after, format_filter.as_deref())
            .await;
        let Some(report) = directory_report(outcome)? else {
            return Ok(());
        };

        for result in &report.results {
            print_result(result, args.json)?;
        }
        if report.skipped > 0 {
            warn!("{} files skipped after interrupt", report.skipped);
        }
    } else {
        tokio::select! {
            result = orchestrator.upload_one(path, &args.platform, &args.anchor, delete_after) => {
                print_result(&result, args.json)?;
            }
            Ok(()) = shutdown_rx.changed() => {
                warn!("Upload interrupted by user");
            }
        }
    }

    Ok(())
}

/// A missing directory is reported and ends the run normally; other
/// failures stay fatal.
fn directory_report(
    outcome: OrchestratorResult<DirectoryReport>,
) -> anyhow::Result<Option<DirectoryReport>> {
    match outcome {
        Ok(report) => Ok(Some(report)),
        Err(OrchestratorError::NotFound(msg)) => {
            error!("{}", msg);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_result(result: &UploadResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
    }
    Ok(())
}
