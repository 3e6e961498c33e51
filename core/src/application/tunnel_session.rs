//! Tunnel lifecycle management.
//!
//! A session initializes one tunnel, lets the caller announce it, then blocks
//! until the tunnel's stop signal fires. A single background task listens for
//! a process interrupt and can only request a stop.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::domain::{StopCause, StopHandle};
use crate::error::Result;
use crate::ports::{InterruptSource, Tunnel};

/// How a session that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The tunnel ran until a stop was requested.
    Stopped,
    /// The tunnel ran until its transport ended on its own.
    TransportLost,
    /// An interrupt arrived before the tunnel was running.
    AbortedDuringInit,
}

/// Run `tunnel` to completion.
///
/// `on_running` is called exactly once, after a successful `init` and before
/// waiting for the stop signal. Initialization errors are returned unless an
/// interrupt caused them.
pub async fn run_session<T, I, F>(tunnel: T, interrupts: &I, on_running: F) -> Result<SessionEnd>
where
    T: Tunnel,
    I: InterruptSource,
    F: FnOnce(),
{
    let tunnel = Arc::new(tunnel);
    let stopped = tunnel.stop_signal();

    let stop = {
        let tunnel = Arc::clone(&tunnel);
        StopHandle::new(move || tunnel.stop())
    };
    let listener = InterruptListener::spawn(interrupts.interrupted(), stop);

    if let Err(e) = tunnel.init().await {
        tunnel.stop();
        if listener.fired() {
            info!("interrupted before the tunnel was running");
            return Ok(SessionEnd::AbortedDuringInit);
        }
        return Err(e);
    }
    info!(state = %tunnel.state(), "tunnel ready");

    on_running();

    stopped.stopped().await;
    info!("tunnel closed");
    match tunnel.stop_cause() {
        Some(StopCause::TransportLost) => Ok(SessionEnd::TransportLost),
        _ => Ok(SessionEnd::Stopped),
    }
}

/// Background interrupt subscription. Dropping it unsubscribes.
struct InterruptListener {
    task: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

impl InterruptListener {
    fn spawn<Fut>(interrupted: Fut, stop: StopHandle) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let task = tokio::spawn(async move {
            interrupted.await;
            info!("interrupt received, stopping tunnel");
            flag.store(true, Ordering::SeqCst);
            stop.request_stop();
        });
        Self { task, fired }
    }

    fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Drop for InterruptListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{EventLog, InitBehavior, MockInterrupts, MockTunnel};
    use crate::domain::TunnelState;
    use crate::error::Error;
    use std::time::Duration;

    #[tokio::test]
    async fn test_interrupt_stops_running_tunnel() {
        let events = EventLog::default();
        let tunnel = MockTunnel::new(InitBehavior::Succeed, events.clone());
        let signal = tunnel.stop_signal();

        let end = run_session(tunnel, &MockInterrupts::fired(), || events.push("announce"))
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Stopped);
        assert!(signal.is_stopped());
        assert_eq!(events.events(), vec!["init", "announce", "stopped"]);
    }

    #[tokio::test]
    async fn test_session_blocks_until_interrupt() {
        let events = EventLog::default();
        let tunnel = MockTunnel::new(InitBehavior::Succeed, events.clone());
        let interrupts = MockInterrupts::never();

        let session = run_session(tunnel, &interrupts, || {});
        tokio::pin!(session);

        let early = tokio::time::timeout(Duration::from_millis(50), &mut session).await;
        assert!(early.is_err(), "session returned before the tunnel stopped");
        assert_eq!(interrupts.listeners(), 1);

        interrupts.trigger();
        let end = tokio::time::timeout(Duration::from_secs(1), session)
            .await
            .expect("session finished")
            .unwrap();
        assert_eq!(end, SessionEnd::Stopped);
    }

    #[tokio::test]
    async fn test_init_failure_is_returned_without_announcing() {
        let events = EventLog::default();
        let tunnel = MockTunnel::new(InitBehavior::Fail, events.clone());

        let err = run_session(tunnel, &MockInterrupts::never(), || events.push("announce"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TunnelInit(_)));
        assert_eq!(events.position("announce"), None);
    }

    #[tokio::test]
    async fn test_interrupt_during_init_aborts_cleanly() {
        let events = EventLog::default();
        let tunnel = MockTunnel::new(InitBehavior::Hang, events.clone());
        let signal = tunnel.stop_signal();

        let end = run_session(tunnel, &MockInterrupts::fired(), || events.push("announce"))
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::AbortedDuringInit);
        assert!(signal.is_stopped());
        assert_eq!(events.position("announce"), None);
    }

    #[tokio::test]
    async fn test_lost_transport_ends_session() {
        let events = EventLog::default();
        let tunnel = MockTunnel::new(InitBehavior::LoseTransport, events.clone());

        let end = run_session(tunnel, &MockInterrupts::never(), || events.push("announce"))
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::TransportLost);
        assert!(events.position("announce").is_some());
    }

    async fn wait_for_unsubscribe(interrupts: &MockInterrupts) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while interrupts.listeners() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("interrupt listener dropped");
    }

    #[tokio::test]
    async fn test_listener_dropped_after_init_failure() {
        let interrupts = MockInterrupts::never();
        let tunnel = MockTunnel::new(InitBehavior::Fail, EventLog::default());

        assert!(run_session(tunnel, &interrupts, || {}).await.is_err());
        wait_for_unsubscribe(&interrupts).await;
    }

    #[tokio::test]
    async fn test_listener_dropped_after_session_ends() {
        let interrupts = MockInterrupts::never();
        let tunnel = MockTunnel::new(InitBehavior::LoseTransport, EventLog::default());

        let end = run_session(tunnel, &interrupts, || {}).await.unwrap();
        assert_eq!(end, SessionEnd::TransportLost);
        wait_for_unsubscribe(&interrupts).await;
    }

    #[tokio::test]
    async fn test_repeated_stop_fires_signal_once() {
        let events = EventLog::default();
        let tunnel = MockTunnel::new(InitBehavior::Succeed, events.clone());
        tunnel.init().await.unwrap();

        tunnel.stop();
        tunnel.stop();

        assert_eq!(tunnel.stops(), 2);
        assert_eq!(tunnel.state(), TunnelState::Stopped);
        let fired = events.events().iter().filter(|e| *e == "stopped").count();
        assert_eq!(fired, 1);
    }
}
