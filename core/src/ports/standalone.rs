//! Standalone dashboard port (interface).

use crate::error::Result;

/// Port for running the dashboard as a local process.
pub trait StandaloneLauncher: Send + Sync {
    /// Run the dashboard on `port` until it exits.
    fn run(&self, port: u16) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Version of the installed dashboard, if it can be determined.
    fn version(&self) -> impl std::future::Future<Output = Option<String>> + Send;
}
