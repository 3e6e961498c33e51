//! Dashboard command orchestration.

use tracing::{debug, info};

use super::announcer::announce_endpoint;
use super::resolver::{resolve_namespace, search_cluster_wide};
use super::tunnel_session::{run_session, SessionEnd};
use crate::config::DashboardConfig;
use crate::domain::ExitStatus;
use crate::error::Error;
use crate::ports::{
    BrowserOpener, ClusterClient, ClusterConnector, InterruptSource, StandaloneLauncher,
    StatusReporter,
};

/// Version string printed when the installed dashboard cannot report one.
const UNKNOWN_VERSION: &str = "n/a";

/// Application service for the `dashboard` command.
///
/// Decides between cluster and standalone mode and reports every failure at
/// the point it happens. The returned [`ExitStatus`] is the process exit code.
pub struct DashboardService<C, L, B, R, I> {
    cluster: C,
    launcher: L,
    browser: B,
    reporter: R,
    interrupts: I,
}

impl<C, L, B, R, I> DashboardService<C, L, B, R, I>
where
    C: ClusterConnector,
    L: StandaloneLauncher,
    B: BrowserOpener,
    R: StatusReporter,
    I: InterruptSource,
{
    pub fn new(cluster: C, launcher: L, browser: B, reporter: R, interrupts: I) -> Self {
        Self {
            cluster,
            launcher,
            browser,
            reporter,
            interrupts,
        }
    }

    /// Run one invocation of the command.
    pub async fn run(&self, config: &DashboardConfig) -> ExitStatus {
        if config.print_version {
            let version = self.launcher.version().await;
            self.reporter
                .plain(version.as_deref().unwrap_or(UNKNOWN_VERSION));
            return ExitStatus::Success;
        }

        let port = match config.validated_port() {
            Ok(port) => port,
            Err(e) => {
                self.reporter.failure(&e.to_string());
                return ExitStatus::Failure;
            }
        };

        if config.kubernetes {
            self.run_cluster(config, port).await
        } else {
            self.run_standalone(port).await
        }
    }

    async fn run_standalone(&self, port: u16) -> ExitStatus {
        if let Err(e) = self.launcher.run(port).await {
            debug!(error = %e, "standalone dashboard failed");
            self.reporter
                .failure("Dapr dashboard not found. Is Dapr installed?");
        }
        ExitStatus::Success
    }

    async fn run_cluster(&self, config: &DashboardConfig, port: u16) -> ExitStatus {
        let client = match self.cluster.connect().await {
            Ok(client) => client,
            Err(e) => {
                self.reporter
                    .failure(&format!("Failed to initialize kubernetes client: {}", e));
                return ExitStatus::Failure;
            }
        };

        let candidates = config.namespace_candidates();
        let location = resolve_namespace(&client, &candidates, &config.service_name).await;
        let Some(namespace) = location.namespace() else {
            let miss = Error::DiscoveryMiss {
                service: config.service_name.clone(),
                searched: candidates.iter().collect::<Vec<_>>().join(", "),
            };
            info!(error = %miss, "searching all namespaces");
            return self.report_elsewhere(&client, &config.service_name).await;
        };

        let tunnel_config = config.tunnel_config(namespace, port);
        let tunnel = match client.open_tunnel(&tunnel_config) {
            Ok(tunnel) => tunnel,
            Err(e) => {
                self.reporter.failure(&format!("{}\n", e));
                return ExitStatus::Failure;
            }
        };

        let url = tunnel_config.local_url();
        let announce = || {
            announce_endpoint(&self.browser, &self.reporter, namespace, &url);
        };

        match run_session(tunnel, &self.interrupts, announce).await {
            Ok(SessionEnd::Stopped) => ExitStatus::Success,
            Ok(SessionEnd::TransportLost) => {
                self.reporter
                    .failure("Port forwarding to the dashboard was lost");
                ExitStatus::Failure
            }
            Ok(SessionEnd::AbortedDuringInit) => {
                info!("port forwarding cancelled before it was established");
                ExitStatus::Success
            }
            Err(e) => {
                self.reporter.failure(&format!(
                    "Error in port forwarding: {}\nCheck for `dapr dashboard` running in other terminal sessions, or use the `--port` flag to use a different port.\n",
                    e
                ));
                ExitStatus::Failure
            }
        }
    }

    /// Last-resort search. Always ends the command with a failure: a hit in
    /// another namespace is only reported, never forwarded to.
    async fn report_elsewhere(&self, client: &C::Client, service_name: &str) -> ExitStatus {
        match search_cluster_wide(client, service_name).await.namespace() {
            Some(namespace) => self.reporter.info(&format!(
                "Dapr dashboard found in namespace: {}. Run dapr dashboard -k -n {} to use this namespace.",
                namespace, namespace
            )),
            None => self.reporter.failure(
                "Failed to find Dapr dashboard in cluster. Check status of dapr dashboard in the cluster.",
            ),
        }
        ExitStatus::Failure
    }
}
