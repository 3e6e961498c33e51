//! Command configuration.
//!
//! A [`DashboardConfig`] is built once from parsed command-line arguments and
//! handed to the dispatcher by reference. Nothing here reads global state.

use crate::domain::{NamespaceCandidates, TunnelConfig};
use crate::error::{Error, Result};

/// Name of the dashboard service running in the cluster.
pub const DASHBOARD_SERVICE: &str = "dapr-dashboard";

/// Host used for the local end of the port forward.
pub const DEFAULT_HOST: &str = "localhost";

/// Local port the dashboard is served on by default.
pub const DEFAULT_LOCAL_PORT: i64 = 8080;

/// Port the dashboard pod listens on.
pub const REMOTE_PORT: u16 = 8080;

/// Recommended install namespace.
pub const SYSTEM_NAMESPACE: &str = "dapr-system";

/// Namespace used by a plain `init -k` installation.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Everything one dashboard invocation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Forward to a cluster instead of launching the local dashboard.
    pub kubernetes: bool,
    /// Requested local port, unvalidated.
    pub port: i64,
    /// Namespace the user expects the dashboard in.
    pub namespace: String,
    /// Print the dashboard version and exit.
    pub print_version: bool,
    pub service_name: String,
    pub host: String,
    pub remote_port: u16,
    pub system_namespace: String,
    pub default_namespace: String,
    pub use_ssl: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            kubernetes: false,
            port: DEFAULT_LOCAL_PORT,
            namespace: SYSTEM_NAMESPACE.to_string(),
            print_version: false,
            service_name: DASHBOARD_SERVICE.to_string(),
            host: DEFAULT_HOST.to_string(),
            remote_port: REMOTE_PORT,
            system_namespace: SYSTEM_NAMESPACE.to_string(),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            use_ssl: false,
        }
    }
}

impl DashboardConfig {
    /// Configuration from the four user-facing flags, defaults elsewhere.
    pub fn from_flags(kubernetes: bool, port: i64, namespace: String, print_version: bool) -> Self {
        Self {
            kubernetes,
            port,
            namespace,
            print_version,
            ..Self::default()
        }
    }

    /// The local port, if it is a usable TCP port.
    pub fn validated_port(&self) -> Result<u16> {
        match u16::try_from(self.port) {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(Error::InvalidPort(self.port)),
        }
    }

    /// Namespaces to search, in priority order.
    pub fn namespace_candidates(&self) -> NamespaceCandidates {
        NamespaceCandidates::new(
            &self.namespace,
            &self.system_namespace,
            &self.default_namespace,
        )
    }

    /// Tunnel configuration for a dashboard found in `namespace`.
    pub fn tunnel_config(&self, namespace: &str, local_port: u16) -> TunnelConfig {
        TunnelConfig {
            namespace: namespace.to_string(),
            service_name: self.service_name.clone(),
            local_host: self.host.clone(),
            local_port,
            remote_port: self.remote_port,
            use_ssl: self.use_ssl,
        }
    }
}
