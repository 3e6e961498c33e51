//! Ctrl+C interrupt adapter.

use tracing::{debug, warn};

use crate::ports::InterruptSource;

/// Interrupts delivered by the operating system (SIGINT / Ctrl+C).
#[derive(Debug, Clone, Copy, Default)]
pub struct CtrlC;

impl InterruptSource for CtrlC {
    fn interrupted(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => debug!("interrupt received"),
                Err(e) => {
                    // Without a handler the default SIGINT behaviour still applies.
                    warn!(error = %e, "unable to listen for interrupts");
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}
