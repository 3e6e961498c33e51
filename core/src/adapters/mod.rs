//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! The cluster adapter lives in `crate::kubernetes`.

pub mod browser;
pub mod signal;
pub mod standalone;

// Re-export main types for convenience
pub use browser::SystemBrowser;
pub use signal::CtrlC;
pub use standalone::StandaloneDashboard;
