//! Kubernetes discovery using kubectl commands.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::errors::{KubectlError, Result};
use super::models::{KubernetesPod, PodListResponse};
use crate::domain::LabelSelector;

/// Environment variable that overrides the kubectl binary.
pub const KUBECTL_ENV: &str = "KUBECTL";

/// Default paths to search for kubectl.
const KUBECTL_PATHS: &[&str] = &[
    "/opt/homebrew/bin/kubectl", // Apple Silicon
    "/usr/local/bin/kubectl",    // Intel Mac / Homebrew
    "/usr/bin/kubectl",          // System
];

#[cfg(windows)]
const KUBECTL_BINARY: &str = "kubectl.exe";
#[cfg(not(windows))]
const KUBECTL_BINARY: &str = "kubectl";

/// Timeout for kubectl discovery commands.
const KUBECTL_TIMEOUT: Duration = Duration::from_secs(15);

/// Kubernetes discovery service.
#[derive(Debug, Clone)]
pub struct KubernetesDiscovery {
    kubectl_path: Option<PathBuf>,
    context: Option<String>,
}

impl KubernetesDiscovery {
    /// Creates a new KubernetesDiscovery, searching for kubectl.
    ///
    /// Search order: `$KUBECTL`, well-known install paths, then `$PATH`.
    pub fn new() -> Self {
        let from_env = std::env::var_os(KUBECTL_ENV)
            .map(PathBuf::from)
            .filter(|p| p.exists());
        let kubectl_path = from_env
            .or_else(|| find_executable(KUBECTL_PATHS))
            .or_else(|| find_in_path(KUBECTL_BINARY, std::env::var_os("PATH")));

        Self {
            kubectl_path,
            context: None,
        }
    }

    /// Creates a new KubernetesDiscovery with a custom kubectl path.
    pub fn with_path(kubectl_path: Option<PathBuf>) -> Self {
        Self {
            kubectl_path,
            context: None,
        }
    }

    /// Pins every subsequent command to a kubeconfig context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns the kubectl path if found.
    pub fn kubectl_path(&self) -> Option<&PathBuf> {
        self.kubectl_path.as_ref()
    }

    /// Returns the pinned context, if any.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Name of the current kubeconfig context.
    pub async fn current_context(&self) -> Result<String> {
        let output = self.execute_kubectl(&["config", "current-context"]).await?;
        let context = output.trim();
        if context.is_empty() {
            return Err(KubectlError::NoCurrentContext);
        }
        Ok(context.to_string())
    }

    /// Fetches pods in a namespace, or in every namespace when `namespace` is `None`.
    pub async fn fetch_pods(
        &self,
        namespace: Option<&str>,
        selector: Option<&LabelSelector>,
    ) -> Result<Vec<KubernetesPod>> {
        let args = pod_query_args(namespace, selector);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.execute_kubectl(&args).await?;

        let response: PodListResponse = serde_json::from_str(&output)
            .map_err(|e| KubectlError::ParsingFailed(e.to_string()))?;

        Ok(response.into_pods())
    }

    /// Executes a kubectl command and returns the output.
    async fn execute_kubectl(&self, args: &[&str]) -> Result<String> {
        let kubectl_path = self
            .kubectl_path
            .as_ref()
            .ok_or(KubectlError::KubectlNotFound)?;

        let mut command = Command::new(kubectl_path);
        if let Some(context) = &self.context {
            command.args(["--context", context]);
        }
        command.args(args).kill_on_drop(true);
        debug!(kubectl = %kubectl_path.display(), ?args, "running kubectl");

        let result = timeout(KUBECTL_TIMEOUT, async {
            let output = command.output().await?;

            Ok::<_, std::io::Error>((output.status, output.stdout, output.stderr))
        })
        .await;

        match result {
            Ok(Ok((status, stdout, stderr))) => {
                if status.success() {
                    String::from_utf8(stdout)
                        .map_err(|e| KubectlError::ParsingFailed(e.to_string()))
                } else {
                    let stderr_str = String::from_utf8_lossy(&stderr);
                    Err(KubectlError::from_kubectl_error(&stderr_str))
                }
            }
            Ok(Err(e)) => Err(KubectlError::Io(e)),
            Err(_) => Err(KubectlError::Timeout),
        }
    }
}

impl Default for KubernetesDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

/// Arguments for `kubectl get pods`.
fn pod_query_args(namespace: Option<&str>, selector: Option<&LabelSelector>) -> Vec<String> {
    let mut args: Vec<String> = ["get", "pods", "-o", "json", "--request-timeout=10s"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    match namespace {
        Some(ns) => args.extend(["-n".to_string(), ns.to_string()]),
        None => args.push("--all-namespaces".to_string()),
    }

    if let Some(selector) = selector.filter(|s| !s.is_empty()) {
        args.extend(["-l".to_string(), selector.to_string()]);
    }

    args
}

/// Finds an executable in the given paths.
fn find_executable(paths: &[&str]) -> Option<PathBuf> {
    for path in paths {
        let path_buf = PathBuf::from(path);
        if path_buf.exists() {
            return Some(path_buf);
        }
    }
    None
}

/// Finds `binary` in a `PATH`-style list of directories.
pub(crate) fn find_in_path(binary: impl AsRef<Path>, path_var: Option<impl AsRef<OsStr>>) -> Option<PathBuf> {
    let path_var = path_var?;
    std::env::split_paths(path_var.as_ref())
        .map(|dir| dir.join(binary.as_ref()))
        .find(|candidate| candidate.is_file())
}
