//! Kubernetes module for service discovery and port forwarding.
//!
//! This module provides:
//! - kubectl location and kubeconfig context resolution
//! - Pod discovery by namespace and workload name
//! - A supervised `kubectl port-forward` tunnel

pub mod client;
pub mod discovery;
pub mod errors;
pub mod models;
pub mod port_forward;

#[cfg(all(test, unix))]
pub(crate) mod testing;

// Re-export commonly used types
pub use client::{KubectlClient, KubectlConnector};
pub use discovery::KubernetesDiscovery;
pub use errors::{KubectlError, Result};
pub use models::{find_running_pod, KubernetesPod};
pub use port_forward::PortForwardTunnel;
