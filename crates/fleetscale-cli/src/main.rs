//! fleetscale: scale every resource in a YAML config up or down.
//!
//! # Usage
//!
//! ```text
//! fleetscale -c scaling.yaml --scale-up
//! fleetscale -c scaling.yaml -d --format json --timeout 300
//! ```
//!
//! The report goes to stdout, logs to stderr. Exit status is 0 when every
//! directive succeeded, 1 when some failed, 2 when the run itself could not
//! complete.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::builder::RangedU64ValueParser;
use clap::{ArgGroup, Parser, ValueEnum};
use tracing::{debug, info, warn};

use fleetscale_aws::AwsProvider;
use fleetscale_core::{ConfigTree, ScaleDirection};
use fleetscale_engine::{Orchestrator, OrchestratorConfig, Shutdown};

mod render;

#[derive(Parser)]
#[command(
    name = "fleetscale",
    about = "Scale AWS compute groups, streams, caches and tables across regions",
    version,
    group(ArgGroup::new("direction").required(true).args(["scale_up", "scale_down"])),
)]
struct Cli {
    /// Path to the scaling config (YAML).
    #[arg(short = 'c', long)]
    config_path: PathBuf,

    /// Apply the configured values for scaling up.
    #[arg(short = 'u', long)]
    scale_up: bool,

    /// Apply the configured values for scaling down, removing listed cache nodes.
    #[arg(short = 'd', long)]
    scale_down: bool,

    /// Report format.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Give up after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum number of regions processed at once.
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    max_regions: Option<usize>,

    /// Maximum number of services scaled at once within a region.
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    max_services: Option<usize>,

    /// Override the AWS endpoint (e.g. a LocalStack URL).
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl Cli {
    fn direction(&self) -> ScaleDirection {
        if self.scale_down {
            ScaleDirection::Down
        } else {
            ScaleDirection::Up
        }
    }

    fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_concurrent_regions: self.max_regions,
            max_concurrent_directives: self.max_services,
            deadline: self.timeout.map(Duration::from_secs),
            ..OrchestratorConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,fleetscale=debug"));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let tree = ConfigTree::from_file(&cli.config_path)
        .with_context(|| format!("loading {}", cli.config_path.display()))?;
    info!(application = %tree.application_name, regions = tree.regions.len(), "loaded scaling config");
    for spec in &tree.regions {
        for directive in &spec.directives {
            debug!(region = %spec.region, directive = %directive.describe(), "configured");
        }
    }

    let mut provider = AwsProvider::new();
    if let Some(endpoint) = &cli.endpoint_url {
        provider = provider.with_endpoint_url(endpoint.clone());
    }
    let orchestrator = Orchestrator::new(provider).with_config(cli.orchestrator_config());
    let limits = orchestrator.config();
    debug!(
        max_regions = ?limits.max_concurrent_regions,
        max_services = ?limits.max_concurrent_directives,
        deadline = ?limits.deadline,
        "orchestrator configured"
    );

    let (shutdown_tx, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            let _ = shutdown_tx.send(true);
        }
    });

    let report = orchestrator
        .scale_all_until(&tree, cli.direction(), shutdown)
        .await
        .context("scaling run aborted")?;

    match cli.format {
        Format::Text => print!("{}", render::format_report(&report)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
