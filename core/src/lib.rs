//! Dashboard Core Library
//!
//! Finds the operator dashboard and exposes it on a local port.
//! Provides functionality to:
//! - Search an ordered set of namespaces for the dashboard workload
//! - Fall back to a cluster-wide search with advice on where it was found
//! - Run a `kubectl port-forward` tunnel until it is interrupted
//! - Launch the locally installed dashboard when no cluster is targeted
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: Browser, signal and standalone launcher implementations
//! - `kubernetes`: kubectl-backed cluster client and tunnel
//! - `application`: Use case services

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;
pub mod kubernetes;

// Re-export domain types (primary API)
pub use domain::{
    ExitStatus, LabelSelector, NamespaceCandidates, ServiceLocation, StopCause, StopHandle,
    StopNotifier, StopSignal, TunnelConfig, TunnelState,
};

// Re-export other commonly used types
pub use adapters::{CtrlC, StandaloneDashboard, SystemBrowser};
pub use application::DashboardService;
pub use config::DashboardConfig;
pub use error::{Error, Result};
pub use kubernetes::{KubectlConnector, PortForwardTunnel};
