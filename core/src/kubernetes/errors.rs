//! Errors raised by the kubectl-backed cluster adapter.

use thiserror::Error;

/// Result type alias for kubectl operations.
pub type Result<T> = std::result::Result<T, KubectlError>;

/// Errors from invoking kubectl or supervising a port forward.
#[derive(Error, Debug)]
pub enum KubectlError {
    #[error("kubectl not found (install it or set KUBECTL)")]
    KubectlNotFound,

    #[error("kubectl command timed out")]
    Timeout,

    #[error("Failed to parse kubectl output: {0}")]
    ParsingFailed(String),

    #[error("kubectl failed: {0}")]
    CommandFailed(String),

    #[error("Cluster not reachable: {0}")]
    ClusterNotConnected(String),

    #[error("No current kubernetes context is configured")]
    NoCurrentContext,

    #[error("unable to listen on port {0}: address already in use")]
    PortInUse(u16),

    #[error("no running pod for {workload} in namespace {namespace}")]
    PodNotFound { workload: String, namespace: String },

    #[error("Port forward exited before it was ready: {0}")]
    ForwardExited(String),

    #[error("Port forward was stopped before it was ready")]
    InitAborted,

    #[error("{0}")]
    ProcessError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KubectlError {
    /// Classify a kubectl failure from its stderr.
    pub fn from_kubectl_error(stderr: &str) -> Self {
        let trimmed = stderr.trim();
        let lower = trimmed.to_lowercase();

        if lower.contains("connection refused")
            || lower.contains("no configuration has been provided")
            || lower.contains("dial tcp")
            || lower.contains("unable to connect to the server")
            || lower.contains("no such host")
        {
            KubectlError::ClusterNotConnected(trimmed.to_string())
        } else if lower.contains("current-context is not set") {
            KubectlError::NoCurrentContext
        } else {
            KubectlError::CommandFailed(trimmed.to_string())
        }
    }
}
