//! In-memory implementations of the ports for application tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::domain::{
    LabelSelector, StopCause, StopNotifier, StopSignal, TunnelConfig, TunnelState,
};
use crate::error::{Error, Result};
use crate::ports::{
    BrowserOpener, ClusterClient, ClusterConnector, InterruptSource, StandaloneLauncher,
    StatusReporter, Tunnel,
};

/// Shared, ordered record of what the collaborators saw.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Position of the first event starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e.starts_with(prefix))
    }
}

// ============================================================================
// Cluster
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitBehavior {
    Succeed,
    Fail,
    /// Stays pending until the tunnel is stopped.
    Hang,
    /// Succeeds, then the transport drops straight away.
    LoseTransport,
}

#[derive(Debug)]
struct ClusterState {
    /// Namespaces in which the service is running.
    present_in: Vec<String>,
    /// Namespaces whose probe returns an error.
    failing: HashSet<String>,
    /// Every probe, `None` for a cluster-wide search.
    probes: Mutex<Vec<Option<String>>>,
    tunnels: Mutex<Vec<TunnelConfig>>,
    init: InitBehavior,
    events: EventLog,
}

#[derive(Debug, Clone)]
pub struct MockClient {
    state: Arc<ClusterState>,
}

impl MockClient {
    pub fn new(present_in: &[&str], init: InitBehavior, events: EventLog) -> Self {
        Self {
            state: Arc::new(ClusterState {
                present_in: present_in.iter().map(|s| s.to_string()).collect(),
                failing: HashSet::new(),
                probes: Mutex::new(Vec::new()),
                tunnels: Mutex::new(Vec::new()),
                init,
                events,
            }),
        }
    }

    pub fn with_failing(present_in: &[&str], failing: &[&str]) -> Self {
        let mut client = Self::new(present_in, InitBehavior::Succeed, EventLog::default());
        if let Some(state) = Arc::get_mut(&mut client.state) {
            state.failing = failing.iter().map(|s| s.to_string()).collect();
        }
        client
    }

    pub fn probes(&self) -> Vec<Option<String>> {
        self.state.probes.lock().clone()
    }

    pub fn tunnels(&self) -> Vec<TunnelConfig> {
        self.state.tunnels.lock().clone()
    }
}

impl ClusterClient for MockClient {
    type Tunnel = MockTunnel;

    async fn find_service(
        &self,
        namespace: Option<&str>,
        _selector: Option<&LabelSelector>,
        _service_name: &str,
    ) -> Result<Option<String>> {
        self.state.probes.lock().push(namespace.map(String::from));
        match namespace {
            Some(ns) if self.state.failing.contains(ns) => {
                Err(Error::Io(std::io::Error::other("probe failed")))
            }
            Some(ns) => Ok(self.state.present_in.iter().find(|p| *p == ns).cloned()),
            None => Ok(self.state.present_in.first().cloned()),
        }
    }

    fn open_tunnel(&self, config: &TunnelConfig) -> Result<MockTunnel> {
        self.state.tunnels.lock().push(config.clone());
        Ok(MockTunnel::new(self.state.init, self.state.events.clone()))
    }
}

pub struct MockConnector {
    client: MockClient,
    fail: bool,
    connects: AtomicUsize,
}

impl MockConnector {
    pub fn new(client: MockClient) -> Self {
        Self {
            client,
            fail: false,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn failing(client: MockClient) -> Self {
        Self {
            fail: true,
            ..Self::new(client)
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn client(&self) -> &MockClient {
        &self.client
    }
}

impl ClusterConnector for MockConnector {
    type Client = MockClient;

    async fn connect(&self) -> Result<MockClient> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::ClientInit("no kubeconfig".to_string()));
        }
        Ok(self.client.clone())
    }
}

// ============================================================================
// Tunnel
// ============================================================================

pub struct MockTunnel {
    init: InitBehavior,
    state: Mutex<TunnelState>,
    cause: Mutex<Option<StopCause>>,
    notifier: StopNotifier,
    stops: AtomicUsize,
    events: EventLog,
}

impl MockTunnel {
    pub fn new(init: InitBehavior, events: EventLog) -> Self {
        Self {
            init,
            state: Mutex::new(TunnelState::Created),
            cause: Mutex::new(None),
            notifier: StopNotifier::new(),
            stops: AtomicUsize::new(0),
            events,
        }
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    fn finish(&self, cause: StopCause) {
        *self.state.lock() = TunnelState::Stopped;
        self.cause.lock().get_or_insert(cause);
        if self.notifier.notify() {
            self.events.push("stopped");
        }
    }
}

impl Tunnel for MockTunnel {
    async fn init(&self) -> Result<()> {
        self.events.push("init");
        match self.init {
            InitBehavior::Succeed => {
                *self.state.lock() = TunnelState::Running;
                Ok(())
            }
            InitBehavior::Fail => Err(Error::TunnelInit(
                "unable to listen on port 9090: address already in use".to_string(),
            )),
            InitBehavior::Hang => {
                self.notifier.subscribe().stopped().await;
                Err(Error::TunnelInit("stopped during init".to_string()))
            }
            InitBehavior::LoseTransport => {
                self.finish(StopCause::TransportLost);
                Ok(())
            }
        }
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.finish(StopCause::Requested);
    }

    fn stop_signal(&self) -> StopSignal {
        self.notifier.subscribe()
    }

    fn state(&self) -> TunnelState {
        *self.state.lock()
    }

    fn stop_cause(&self) -> Option<StopCause> {
        *self.cause.lock()
    }
}

// ============================================================================
// Interrupts
// ============================================================================

pub struct MockInterrupts {
    tx: watch::Sender<bool>,
}

impl MockInterrupts {
    pub fn never() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// An interrupt that is already pending when the listener subscribes.
    pub fn fired() -> Self {
        let interrupts = Self::never();
        interrupts.trigger();
        interrupts
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Interrupt subscriptions still alive.
    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl InterruptSource for MockInterrupts {
    fn interrupted(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            loop {
                let fired = *rx.borrow_and_update();
                if fired {
                    return;
                }
                if rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

// ============================================================================
// Standalone, browser, reporter
// ============================================================================

pub struct MockLauncher {
    fail: bool,
    version: Option<String>,
    runs: Mutex<Vec<u16>>,
}

impl MockLauncher {
    pub fn new(fail: bool, version: Option<&str>) -> Self {
        Self {
            fail,
            version: version.map(String::from),
            runs: Mutex::new(Vec::new()),
        }
    }

    pub fn runs(&self) -> Vec<u16> {
        self.runs.lock().clone()
    }
}

impl StandaloneLauncher for MockLauncher {
    async fn run(&self, port: u16) -> Result<()> {
        self.runs.lock().push(port);
        if self.fail {
            return Err(Error::StandaloneLaunch("dashboard binary not found".to_string()));
        }
        Ok(())
    }

    async fn version(&self) -> Option<String> {
        self.version.clone()
    }
}

pub struct MockBrowser {
    fail: bool,
    events: EventLog,
    opened: Mutex<Vec<String>>,
}

impl MockBrowser {
    pub fn new(fail: bool, events: EventLog) -> Self {
        Self {
            fail,
            events,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl BrowserOpener for MockBrowser {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().push(url.to_string());
        self.events.push(format!("browser {}", url));
        if self.fail {
            return Err(Error::BrowserOpen("no browser".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Plain,
    Info,
    Failure,
}

pub struct MockReporter {
    events: EventLog,
    messages: Mutex<Vec<(Kind, String)>>,
}

impl MockReporter {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<(Kind, String)> {
        self.messages.lock().clone()
    }

    pub fn count(&self) -> HashMap<Kind, usize> {
        let mut counts = HashMap::new();
        for (kind, _) in self.messages.lock().iter() {
            *counts.entry(*kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn contains(&self, kind: Kind, needle: &str) -> bool {
        self.messages
            .lock()
            .iter()
            .any(|(k, m)| *k == kind && m.contains(needle))
    }

    fn record(&self, kind: Kind, message: &str) {
        self.events.push(format!("{:?} {}", kind, message));
        self.messages.lock().push((kind, message.to_string()));
    }
}

impl StatusReporter for MockReporter {
    fn plain(&self, message: &str) {
        self.record(Kind::Plain, message);
    }

    fn info(&self, message: &str) {
        self.record(Kind::Info, message);
    }

    fn failure(&self, message: &str) {
        self.record(Kind::Failure, message);
    }
}
