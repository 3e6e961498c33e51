//! Standalone dashboard launcher.
//!
//! Runs the dashboard binary installed by the local (non-cluster) setup,
//! normally `~/.dapr/bin/dashboard`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::kubernetes::discovery::find_in_path;
use crate::ports::StandaloneLauncher;

#[cfg(windows)]
const DASHBOARD_BINARY: &str = "dashboard.exe";
#[cfg(not(windows))]
const DASHBOARD_BINARY: &str = "dashboard";

/// Launches the locally installed dashboard.
#[derive(Debug, Clone)]
pub struct StandaloneDashboard {
    binary: Option<PathBuf>,
}

impl StandaloneDashboard {
    /// Looks for the dashboard under `~/.dapr/bin`, then on `$PATH`.
    pub fn new() -> Self {
        Self {
            binary: locate_dashboard(dirs::home_dir().as_deref(), std::env::var_os("PATH")),
        }
    }

    pub fn with_binary(binary: Option<PathBuf>) -> Self {
        Self { binary }
    }

    fn require_binary(&self) -> Result<&Path> {
        self.binary
            .as_deref()
            .ok_or_else(|| Error::StandaloneLaunch("dashboard binary not found".to_string()))
    }
}

impl Default for StandaloneDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl StandaloneLauncher for StandaloneDashboard {
    async fn run(&self, port: u16) -> Result<()> {
        let binary = self.require_binary()?;
        info!(binary = %binary.display(), port, "launching standalone dashboard");

        let mut command = Command::new(binary);
        command
            .args(["--port", &port.to_string()])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = binary.parent() {
            command.current_dir(dir);
        }

        let status = command
            .status()
            .await
            .map_err(|e| Error::StandaloneLaunch(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::StandaloneLaunch(format!("dashboard exited with {}", status)))
        }
    }

    async fn version(&self) -> Option<String> {
        let binary = self.binary.as_deref()?;
        let output = Command::new(binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            debug!(status = %output.status, "dashboard --version failed");
            return None;
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!version.is_empty()).then_some(version)
    }
}

/// `<home>/.dapr/bin/dashboard` if present, otherwise the first match on `PATH`.
fn locate_dashboard(home: Option<&Path>, path_var: Option<impl AsRef<OsStr>>) -> Option<PathBuf> {
    home.map(|h| h.join(".dapr").join("bin").join(DASHBOARD_BINARY))
        .filter(|p| p.is_file())
        .or_else(|| find_in_path(DASHBOARD_BINARY, path_var))
}
