//! kubectl-backed cluster client.

use tracing::{debug, info};

use super::discovery::KubernetesDiscovery;
use super::errors::KubectlError;
use super::models::find_running_pod;
use super::port_forward::PortForwardTunnel;
use crate::domain::{LabelSelector, TunnelConfig};
use crate::error::{Error, Result};
use crate::ports::{ClusterClient, ClusterConnector};

/// Builds a [`KubectlClient`] from the local kubectl installation and kubeconfig.
#[derive(Debug, Clone, Default)]
pub struct KubectlConnector {
    discovery: KubernetesDiscovery,
}

impl KubectlConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discovery(discovery: KubernetesDiscovery) -> Self {
        Self { discovery }
    }
}

impl ClusterConnector for KubectlConnector {
    type Client = KubectlClient;

    async fn connect(&self) -> Result<KubectlClient> {
        let kubectl_path = self
            .discovery
            .kubectl_path()
            .cloned()
            .ok_or_else(|| Error::ClientInit(KubectlError::KubectlNotFound.to_string()))?;

        let context = match self.discovery.context() {
            Some(context) => context.to_string(),
            None => self
                .discovery
                .current_context()
                .await
                .map_err(|e| Error::ClientInit(e.to_string()))?,
        };
        info!(kubectl = %kubectl_path.display(), %context, "using kubernetes context");

        Ok(KubectlClient {
            discovery: KubernetesDiscovery::with_path(Some(kubectl_path)).with_context(context),
        })
    }
}

/// Cluster client that shells out to kubectl, pinned to one context.
#[derive(Debug, Clone)]
pub struct KubectlClient {
    discovery: KubernetesDiscovery,
}

impl KubectlClient {
    pub fn context(&self) -> Option<&str> {
        self.discovery.context()
    }
}

impl ClusterClient for KubectlClient {
    type Tunnel = PortForwardTunnel;

    async fn find_service(
        &self,
        namespace: Option<&str>,
        selector: Option<&LabelSelector>,
        service_name: &str,
    ) -> Result<Option<String>> {
        let pods = self.discovery.fetch_pods(namespace, selector).await?;
        let found = find_running_pod(&pods, service_name).map(|pod| pod.namespace.clone());
        debug!(
            namespace = namespace.unwrap_or("<all>"),
            service = service_name,
            pods = pods.len(),
            found = ?found,
            "searched for service"
        );
        Ok(found)
    }

    fn open_tunnel(&self, config: &TunnelConfig) -> Result<PortForwardTunnel> {
        if config.use_ssl {
            return Err(Error::TunnelInit(
                "kubectl port-forward cannot carry TLS to the dashboard".to_string(),
            ));
        }
        Ok(PortForwardTunnel::new(self.discovery.clone(), config.clone()))
    }
}
