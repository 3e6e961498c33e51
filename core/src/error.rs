//! Error types for the dashboard-core library.

use thiserror::Error;

use crate::kubernetes::errors::KubectlError;

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating or exposing the dashboard.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested local port is not a usable TCP port.
    #[error("Invalid port: {0}")]
    InvalidPort(i64),

    /// The cluster client could not be built.
    #[error("{0}")]
    ClientInit(String),

    /// The service was not found in any searched namespace.
    #[error("{service} not found in namespaces: {searched}")]
    DiscoveryMiss { service: String, searched: String },

    /// The tunnel could not be established.
    #[error("{0}")]
    TunnelInit(String),

    /// The browser could not be opened.
    #[error("Failed to open browser: {0}")]
    BrowserOpen(String),

    /// The standalone dashboard could not be run.
    #[error("Failed to launch dashboard: {0}")]
    StandaloneLaunch(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Kubernetes/kubectl error.
    #[error("Kubernetes error: {0}")]
    Kubernetes(#[from] KubectlError),
}
