//! Tunnel domain model: configuration, lifecycle state and stop signalling.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Immutable description of a forwarding tunnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelConfig {
    pub namespace: String,
    pub service_name: String,
    pub local_host: String,
    pub local_port: u16,
    pub remote_port: u16,
    /// kubectl forwards plain TCP only; a tunnel asking for TLS is rejected.
    pub use_ssl: bool,
}

impl TunnelConfig {
    /// The URL the forwarded dashboard is reachable at.
    pub fn local_url(&self) -> String {
        format!("http://{}:{}", self.local_host, self.local_port)
    }
}

/// Lifecycle state of a tunnel.
///
/// `Created -> Initialized -> Running -> Stopped`. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TunnelState {
    Created,
    Initialized,
    Running,
    Stopped,
}

impl TunnelState {
    pub fn is_terminal(self) -> bool {
        self == TunnelState::Stopped
    }
}

impl fmt::Display for TunnelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TunnelState::Created => "created",
            TunnelState::Initialized => "initialized",
            TunnelState::Running => "running",
            TunnelState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Why a tunnel reached `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// Someone called `stop`.
    Requested,
    /// The forwarding transport ended on its own.
    TransportLost,
}

/// Producing side of a [`StopSignal`]. Owned by the tunnel.
#[derive(Debug)]
pub struct StopNotifier {
    tx: watch::Sender<bool>,
}

impl StopNotifier {
    /// Create a notifier with no subscribers yet.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Fire the signal. Returns `true` only for the call that actually fired it.
    pub fn notify(&self) -> bool {
        self.tx.send_if_modified(|stopped| {
            if *stopped {
                false
            } else {
                *stopped = true;
                true
            }
        })
    }

    /// A read-only view of the signal.
    pub fn subscribe(&self) -> StopSignal {
        StopSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for StopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-fire notification that a tunnel has fully torn down.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Wait until the tunnel has stopped.
    ///
    /// Also returns if the notifier is dropped without firing, since no
    /// tunnel can be running at that point.
    pub async fn stopped(mut self) {
        loop {
            let stopped = *self.rx.borrow_and_update();
            if stopped || self.rx.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Capability to request that a tunnel stop, and nothing else.
#[derive(Clone)]
pub struct StopHandle {
    request: Arc<dyn Fn() + Send + Sync>,
}

impl StopHandle {
    pub fn new<F>(request: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            request: Arc::new(request),
        }
    }

    pub fn request_stop(&self) {
        (self.request)()
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle").finish_non_exhaustive()
    }
}
