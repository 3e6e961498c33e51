//! Dashboard CLI - Open the operator dashboard
//!
//! Runs the locally installed dashboard, or with `--kubernetes` finds the
//! dashboard in the current cluster and forwards it to a local port.

mod output;

use anyhow::{Context, Result};
use clap::Parser;
use dashboard_core::config::{DEFAULT_LOCAL_PORT, SYSTEM_NAMESPACE};
use dashboard_core::{
    CtrlC, DashboardConfig, DashboardService, ExitStatus, KubectlConnector, StandaloneDashboard,
    SystemBrowser,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

use output::ConsoleReporter;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(author, about = "Start the operator dashboard")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Open the dashboard in the current Kubernetes cluster
    #[arg(short, long)]
    kubernetes: bool,

    /// The local port on which to serve the dashboard
    #[arg(short, long, default_value_t = DEFAULT_LOCAL_PORT, allow_negative_numbers = true)]
    port: i64,

    /// The namespace where the dashboard is running
    #[arg(short, long, default_value = SYSTEM_NAMESPACE)]
    namespace: String,

    /// Print the version of the installed dashboard
    #[arg(short, long)]
    version: bool,
}

fn main() -> ExitStatus {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(status) => status,
        Err(e) => {
            error!("{:#}", e);
            ExitStatus::Failure
        }
    }
}

fn run(cli: Cli) -> Result<ExitStatus> {
    // Single-threaded: one interrupt listener plus the tunnel supervisor.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let config = DashboardConfig::from_flags(cli.kubernetes, cli.port, cli.namespace, cli.version);
    let service = DashboardService::new(
        KubectlConnector::new(),
        StandaloneDashboard::new(),
        SystemBrowser,
        ConsoleReporter,
        CtrlC,
    );
    Ok(runtime.block_on(service.run(&config)))
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
