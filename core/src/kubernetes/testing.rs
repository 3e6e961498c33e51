//! Shell scripts that stand in for kubectl in process-level tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// `kubectl get pods -o json` output with one running dashboard pod.
pub const DASHBOARD_PODS: &str = r#"{"items":[{"metadata":{"name":"dapr-dashboard-abc","namespace":"dapr-system"},"status":{"phase":"Running"}}]}"#;

/// Writes an executable script that prints `pods` for `get pods` and runs
/// `forward` for anything else (a port forward).
pub fn fake_kubectl(dir: &Path, name: &str, pods: &str, forward: &str) -> PathBuf {
    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\ncase \"$*\" in\n*\"get pods\"*)\necho '{}'\n;;\n*)\n{}\n;;\nesac\n",
        pods, forward
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
