//! Cluster access ports (interfaces).

use crate::domain::{LabelSelector, TunnelConfig};
use crate::error::Result;
use crate::ports::Tunnel;

/// Port for building an authenticated cluster client.
pub trait ClusterConnector: Send + Sync {
    type Client: ClusterClient;

    /// Load cluster configuration and build a client.
    ///
    /// A failure here is fatal for cluster mode.
    fn connect(&self) -> impl std::future::Future<Output = Result<Self::Client>> + Send;
}

/// Port for the cluster operations the dashboard command needs.
pub trait ClusterClient: Send + Sync {
    type Tunnel: Tunnel;

    /// Check whether a running workload named `service_name` exists.
    ///
    /// `namespace: None` searches every namespace. Returns the namespace the
    /// workload was found in.
    fn find_service(
        &self,
        namespace: Option<&str>,
        selector: Option<&LabelSelector>,
        service_name: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Create (but do not initialize) a forwarding tunnel.
    fn open_tunnel(&self, config: &TunnelConfig) -> Result<Self::Tunnel>;
}
