//! Supervised `kubectl port-forward` tunnel.
//!
//! The tunnel spawns one kubectl process, waits for it to report that it is
//! forwarding, then hands the process to a supervisor task. The supervisor is
//! the only place the process is reaped after initialization, and the only
//! producer of the stop signal from then on.

use std::process::Stdio;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::discovery::KubernetesDiscovery;
use super::errors::{KubectlError, Result};
use super::models::find_running_pod;
use crate::domain::{StopCause, StopNotifier, StopSignal, TunnelConfig, TunnelState};
use crate::error::Error;
use crate::ports::Tunnel;

/// Grace period between SIGTERM and a forced kill.
const KILL_GRACE_PERIOD: Duration = Duration::from_millis(300);

/// How long to wait for kubectl's final output after it closes stdout.
const EXIT_OUTPUT_WAIT: Duration = Duration::from_secs(1);

/// Stderr lines kept for error reporting.
const MAX_STDERR_LINES: usize = 50;

#[derive(Debug)]
struct Lifecycle {
    state: TunnelState,
    /// Set while `init` or the supervisor owns the kubectl process. The owner
    /// fires the stop signal; `stop` only does so when there is no owner.
    transport_owned: bool,
    cause: Option<StopCause>,
}

/// A port forward backed by a `kubectl port-forward` child process.
///
/// `init` looks up the running pod of the workload in the configured
/// namespace and forwards to that pod.
#[derive(Debug)]
pub struct PortForwardTunnel {
    id: Uuid,
    discovery: KubernetesDiscovery,
    config: TunnelConfig,
    lifecycle: Arc<Mutex<Lifecycle>>,
    stop_requested: watch::Sender<bool>,
    notifier: Arc<StopNotifier>,
}

impl PortForwardTunnel {
    /// Creates a tunnel in the `Created` state. Nothing is spawned yet.
    ///
    /// kubectl is run through `discovery`, so its binary and context apply
    /// to both the pod lookup and the forward.
    pub fn new(discovery: KubernetesDiscovery, config: TunnelConfig) -> Self {
        let (stop_requested, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4(),
            discovery,
            config,
            lifecycle: Arc::new(Mutex::new(Lifecycle {
                state: TunnelState::Created,
                transport_owned: false,
                cause: None,
            })),
            stop_requested,
            notifier: Arc::new(StopNotifier::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &TunnelConfig {
        &self.config
    }

    /// Arguments passed to kubectl to forward to `pod`.
    pub fn args(&self, pod: &str) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(context) = self.discovery.context() {
            args.extend(["--context".to_string(), context.to_string()]);
        }
        args.extend([
            "port-forward".to_string(),
            "-n".to_string(),
            self.config.namespace.clone(),
            format!("pod/{}", pod),
            format!("{}:{}", self.config.local_port, self.config.remote_port),
            "--address".to_string(),
            self.config.local_host.clone(),
        ]);
        args
    }

    /// Name of the running pod to forward to.
    async fn find_pod(&self) -> Result<String> {
        let pods = self
            .discovery
            .fetch_pods(Some(&self.config.namespace), None)
            .await?;
        let pod = find_running_pod(&pods, &self.config.service_name).ok_or_else(|| {
            KubectlError::PodNotFound {
                workload: self.config.service_name.clone(),
                namespace: self.config.namespace.clone(),
            }
        })?;
        debug!(tunnel = %self.id, pod = %pod.id(), "forwarding to pod");
        Ok(pod.name.clone())
    }

    /// Moves to `Running` unless a stop arrived in the meantime.
    fn mark_running(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        if *self.stop_requested.borrow() {
            return Err(KubectlError::InitAborted);
        }
        lifecycle.state = TunnelState::Initialized;
        debug!(tunnel = %self.id, "port forward initialized");
        lifecycle.state = TunnelState::Running;
        Ok(())
    }

    fn abandon(&self, err: &KubectlError) {
        let cause = match err {
            KubectlError::InitAborted => StopCause::Requested,
            _ => StopCause::TransportLost,
        };
        finish(&self.lifecycle, &self.notifier, self.id, cause);
    }

    async fn start(&self) -> Result<()> {
        let aborted = {
            let mut lifecycle = self.lifecycle.lock();
            match lifecycle.state {
                TunnelState::Created => {}
                TunnelState::Stopped => return Err(KubectlError::InitAborted),
                state => {
                    return Err(KubectlError::ProcessError(format!(
                        "port forward is already {}",
                        state
                    )))
                }
            }
            let aborted = *self.stop_requested.borrow();
            if !aborted {
                lifecycle.transport_owned = true;
            }
            aborted
        };
        if aborted {
            self.abandon(&KubectlError::InitAborted);
            return Err(KubectlError::InitAborted);
        }

        let mut stop_rx = self.stop_requested.subscribe();
        let pod = tokio::select! {
            pod = self.find_pod() => pod,
            _ = stop_requested(&mut stop_rx) => Err(KubectlError::InitAborted),
        };
        let pod = match pod {
            Ok(pod) => pod,
            Err(e) => {
                self.abandon(&e);
                return Err(e);
            }
        };
        let Some(kubectl_path) = self.discovery.kubectl_path() else {
            self.abandon(&KubectlError::KubectlNotFound);
            return Err(KubectlError::KubectlNotFound);
        };

        info!(
            tunnel = %self.id,
            namespace = %self.config.namespace,
            %pod,
            local_port = self.config.local_port,
            remote_port = self.config.remote_port,
            "starting port forward"
        );

        let spawned = Command::new(kubectl_path)
            .args(self.args(&pod))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                let err = KubectlError::ProcessError(format!("Failed to start kubectl: {}", e));
                self.abandon(&err);
                return Err(err);
            }
        };

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            terminate(&mut child).await;
            let err = KubectlError::ProcessError("kubectl output was not captured".to_string());
            self.abandon(&err);
            return Err(err);
        };

        let stderr_log = Arc::new(Mutex::new(Vec::new()));
        let stderr_task = tokio::spawn(drain_stderr(stderr, Arc::clone(&stderr_log), self.id));
        let mut stdout_lines = BufReader::new(stdout).lines();

        let outcome = tokio::select! {
            ready = wait_until_ready(&mut stdout_lines, self.id) => ready,
            _ = stop_requested(&mut stop_rx) => Err(KubectlError::InitAborted),
        };
        // Readiness and a stop can land in the same poll.
        let outcome = outcome.and_then(|()| self.mark_running());

        match outcome {
            Ok(()) => {
                info!(tunnel = %self.id, url = %self.config.local_url(), "port forward running");

                tokio::spawn(supervise(Supervisor {
                    id: self.id,
                    child,
                    stdout_lines,
                    stop_rx,
                    stderr_task,
                    lifecycle: Arc::clone(&self.lifecycle),
                    notifier: Arc::clone(&self.notifier),
                }));
                Ok(())
            }
            Err(KubectlError::InitAborted) => {
                info!(tunnel = %self.id, "port forward stopped during initialization");
                terminate(&mut child).await;
                stderr_task.abort();
                self.abandon(&KubectlError::InitAborted);
                Err(KubectlError::InitAborted)
            }
            Err(e) => {
                // stdout closed early, so kubectl is on its way out. Give it a
                // moment to flush stderr before classifying the failure.
                let _ = timeout(EXIT_OUTPUT_WAIT, child.wait()).await;
                let _ = timeout(EXIT_OUTPUT_WAIT, stderr_task).await;
                terminate(&mut child).await;

                let lines = stderr_log.lock().clone();
                let err = classify_failure(&lines, e);
                self.abandon(&err);
                debug!(tunnel = %self.id, error = %err, "port forward failed to start");
                Err(err)
            }
        }
    }
}

impl Tunnel for PortForwardTunnel {
    async fn init(&self) -> crate::error::Result<()> {
        self.start()
            .await
            .map_err(|e| Error::TunnelInit(e.to_string()))
    }

    fn stop(&self) {
        let first = self.stop_requested.send_if_modified(|requested| {
            if *requested {
                false
            } else {
                *requested = true;
                true
            }
        });
        if !first {
            return;
        }
        debug!(tunnel = %self.id, "stop requested");

        let unowned = {
            let lifecycle = self.lifecycle.lock();
            !lifecycle.transport_owned && !lifecycle.state.is_terminal()
        };
        if unowned {
            finish(&self.lifecycle, &self.notifier, self.id, StopCause::Requested);
        }
    }

    fn stop_signal(&self) -> StopSignal {
        self.notifier.subscribe()
    }

    fn state(&self) -> TunnelState {
        self.lifecycle.lock().state
    }

    fn stop_cause(&self) -> Option<StopCause> {
        self.lifecycle.lock().cause
    }
}

struct Supervisor {
    id: Uuid,
    child: Child,
    stdout_lines: Lines<BufReader<ChildStdout>>,
    stop_rx: watch::Receiver<bool>,
    stderr_task: JoinHandle<()>,
    lifecycle: Arc<Mutex<Lifecycle>>,
    notifier: Arc<StopNotifier>,
}

/// Owns a running kubectl process until it exits or a stop is requested.
async fn supervise(supervisor: Supervisor) {
    let Supervisor {
        id,
        mut child,
        mut stdout_lines,
        mut stop_rx,
        stderr_task,
        lifecycle,
        notifier,
    } = supervisor;

    let stdout_task = tokio::spawn(async move {
        while let Ok(Some(line)) = stdout_lines.next_line().await {
            debug!(tunnel = %id, %line, "port-forward output");
        }
    });

    let cause = tokio::select! {
        status = child.wait() => {
            match status {
                Ok(status) => warn!(tunnel = %id, %status, "port forward exited"),
                Err(e) => warn!(tunnel = %id, error = %e, "lost track of port forward"),
            }
            StopCause::TransportLost
        }
        _ = stop_requested(&mut stop_rx) => StopCause::Requested,
    };

    if cause == StopCause::Requested {
        info!(tunnel = %id, "stopping port forward");
        terminate(&mut child).await;
    }

    stdout_task.abort();
    stderr_task.abort();
    finish(&lifecycle, &notifier, id, cause);
}

/// Marks the tunnel stopped and fires the stop signal once. The first cause
/// recorded wins.
fn finish(lifecycle: &Mutex<Lifecycle>, notifier: &StopNotifier, id: Uuid, cause: StopCause) {
    {
        let mut lifecycle = lifecycle.lock();
        lifecycle.state = TunnelState::Stopped;
        lifecycle.transport_owned = false;
        lifecycle.cause.get_or_insert(cause);
    }
    if notifier.notify() {
        info!(tunnel = %id, ?cause, "port forward stopped");
    }
}

/// Resolves once a stop has been requested. Never resolves if the sender is gone.
async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        let requested = *rx.borrow_and_update();
        if requested {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn wait_until_ready(lines: &mut Lines<BufReader<ChildStdout>>, id: Uuid) -> Result<()> {
    while let Some(line) = lines.next_line().await? {
        debug!(tunnel = %id, %line, "port-forward output");
        if is_ready_line(&line) {
            return Ok(());
        }
    }
    Err(KubectlError::ForwardExited(
        "kubectl exited without forwarding".to_string(),
    ))
}

async fn drain_stderr(stderr: ChildStderr, log: Arc<Mutex<Vec<String>>>, id: Uuid) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(tunnel = %id, %line, "port-forward stderr");
        let mut log = log.lock();
        if log.len() < MAX_STDERR_LINES {
            log.push(line);
        }
    }
}

/// Stops a child process: SIGTERM first where available, then kill. Always reaps.
async fn terminate(child: &mut Child) {
    if let Ok(Some(_)) = child.try_wait() {
        return;
    }

    if request_graceful_exit(child) {
        if let Ok(Ok(_)) = timeout(KILL_GRACE_PERIOD, child.wait()).await {
            return;
        }
    }

    let _ = child.kill().await;
}

#[cfg(unix)]
fn request_graceful_exit(child: &Child) -> bool {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    match child.id() {
        Some(pid) => signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok(),
        None => false,
    }
}

#[cfg(not(unix))]
fn request_graceful_exit(_child: &Child) -> bool {
    false
}

// ============================================================================
// Output Parsing
// ============================================================================

/// Checks if a line reports that forwarding is active.
///
/// kubectl format: "Forwarding from 127.0.0.1:8080 -> 8080"
pub fn is_ready_line(line: &str) -> bool {
    line.trim_start().starts_with("Forwarding from")
}

/// Checks if a line indicates an error.
pub fn is_error_line(line: &str) -> bool {
    let line_lower = line.to_lowercase();
    line_lower.contains("error")
        || line_lower.contains("failed")
        || line_lower.contains("unable to")
        || line_lower.contains("connection refused")
        || line_lower.contains("lost connection")
}

/// Detects port conflict from output line.
/// Returns the conflicting port if detected.
pub fn detect_port_conflict(line: &str) -> Option<u16> {
    // kubectl format: "listen tcp4 127.0.0.1:8080: bind: address already in use"
    if !line.to_lowercase().contains("address already in use") {
        return None;
    }

    static PORT: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = PORT
        .get_or_init(|| Regex::new(r":(\d{1,5})\b").ok())
        .as_ref()?;

    // IP octets never follow a colon in IPv4, but skip small values anyway
    // so IPv6 fragments like "[::1]" are not mistaken for ports.
    regex
        .captures_iter(line)
        .filter_map(|c| c.get(1)?.as_str().parse::<u16>().ok())
        .find(|port| *port > 255)
}

/// Turns kubectl's stderr into the most specific error available.
fn classify_failure(stderr: &[String], fallback: KubectlError) -> KubectlError {
    if let Some(port) = stderr.iter().find_map(|line| detect_port_conflict(line)) {
        return KubectlError::PortInUse(port);
    }

    let errors: Vec<&str> = stderr
        .iter()
        .map(String::as_str)
        .filter(|line| is_error_line(line))
        .collect();
    if errors.is_empty() {
        return fallback;
    }

    match KubectlError::from_kubectl_error(&errors.join("\n")) {
        KubectlError::CommandFailed(message) => KubectlError::ForwardExited(message),
        other => other,
    }
}
