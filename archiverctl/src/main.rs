//! `archiverctl`: moves Medusa episodes from the downloaded status to the
//! archived status.

use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use archiver_config::{
    Config, ConfigLoader, ConfigOverrides, EnumerationPolicy, Protocol,
};
use archiver_core::{ArchiverError, MigrationRunner};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "archiverctl",
    version,
    about = "Archive downloaded Medusa episodes"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    target: TargetArgs,
}

#[derive(Args, Debug, Clone)]
struct TargetArgs {
    /// Env file read for variables missing from the process environment
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    /// Base URL of the Medusa instance
    #[arg(long, global = true, alias = "medusaUrl")]
    medusa_url: Option<String>,

    /// Medusa API key
    #[arg(long, global = true)]
    token: Option<String>,

    /// Status code episodes are moved from (4 = downloaded)
    #[arg(
        long,
        global = true,
        alias = "current",
        allow_negative_numbers = true
    )]
    source_status: Option<i32>,

    /// Status code episodes are moved to (6 = archived)
    #[arg(
        long,
        global = true,
        alias = "target",
        allow_negative_numbers = true
    )]
    target_status: Option<i32>,

    /// API generation to use: internal, v2 or legacy
    #[arg(long, global = true)]
    protocol: Option<Protocol>,

    /// How show.seasons trees are walked: contiguous or all-keys
    #[arg(long, global = true)]
    enumeration: Option<EnumerationPolicy>,

    /// Per-request timeout, e.g. 10s or 1m
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Move episodes at the source status to the target status
    Run {
        /// Discover and report without sending any status update
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the status directory of the Medusa instance
    Statuses,
}

impl TargetArgs {
    fn overrides(&self, dry_run: bool) -> ConfigOverrides {
        ConfigOverrides {
            medusa_url: self.medusa_url.clone(),
            api_key: self.token.clone(),
            source_status: self.source_status,
            target_status: self.target_status,
            protocol: self.protocol,
            enumeration: self.enumeration,
            timeout: self.timeout,
            accept_invalid_certs: self.insecure.then_some(true),
            dry_run: dry_run.then_some(true),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.target.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{err:#}");
            error!(error = %message, "archiver failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,archiver_core=debug,archiver_config=debug,archiverctl=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let dry_run = matches!(cli.command, Command::Run { dry_run: true });
    let config = load_config(&cli.target, dry_run)?;
    let runner = MigrationRunner::from_config(&config)
        .context("failed to build the Medusa client")?;

    match cli.command {
        Command::Run { .. } => {
            let report = runner.run().await.map_err(describe_failures)?;
            info!(
                shows = report.shows,
                episodes = report.episodes,
                requests = report.requests,
                dry_run = report.dry_run,
                "run finished"
            );
        }
        Command::Statuses => {
            let statuses = runner
                .statuses()
                .await
                .context("failed to read the status directory")?;
            for (code, name) in statuses.iter() {
                println!("|{code}|{name}|");
            }
        }
    }
    Ok(())
}

fn load_config(args: &TargetArgs, dry_run: bool) -> Result<Config> {
    let (config, warnings) = ConfigLoader::new()
        .with_env_file(&args.env_file)
        .with_overrides(args.overrides(dry_run))
        .load_checked()
        .context("failed to load configuration")?;

    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => warn!(
                message = %warning.message,
                hint = %hint,
                "configuration warning"
            ),
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    info!(
        medusa = %config.target.base(),
        protocol = %config.migration.protocol,
        source = config.migration.source_status,
        destination = config.migration.target_status,
        "configuration ready"
    );
    Ok(config)
}

/// Lists every failed episode before the summary error bubbles up.
fn describe_failures(err: ArchiverError) -> anyhow::Error {
    if let ArchiverError::UpdateFailures { failures, .. } = &err {
        for failure in failures {
            error!(
                series = %failure.series_id,
                episode = %failure.episode,
                error = %failure.error,
                "episode left at source status"
            );
        }
    }
    err.into()
}
