//! Forwarding tunnel port (interface).

use crate::domain::{StopCause, StopSignal, TunnelState};
use crate::error::Result;

/// Port for a forwarding session from a local port to a remote workload.
///
/// Implementations must make `stop` safe to call from another task while
/// `init` is pending or traffic is being forwarded.
pub trait Tunnel: Send + Sync + 'static {
    /// Establish the forwarded connection. Once this returns `Ok` the tunnel
    /// is running until stopped.
    fn init(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Request teardown. Idempotent.
    fn stop(&self);

    /// Signal fired exactly once when teardown completes.
    fn stop_signal(&self) -> StopSignal;

    /// Current lifecycle state.
    fn state(&self) -> TunnelState;

    /// Why the tunnel stopped, once it has.
    fn stop_cause(&self) -> Option<StopCause>;
}
