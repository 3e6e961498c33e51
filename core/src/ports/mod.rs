//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `adapters`
//! and `kubernetes`.

mod browser;
mod cluster;
mod interrupt;
mod reporter;
mod standalone;
mod tunnel;

pub use browser::BrowserOpener;
pub use cluster::{ClusterClient, ClusterConnector};
pub use interrupt::InterruptSource;
pub use reporter::StatusReporter;
pub use standalone::StandaloneLauncher;
pub use tunnel::Tunnel;
