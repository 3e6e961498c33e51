//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no cluster or process I/O and can be tested in isolation.

mod location;
mod namespace;
mod status;
mod tunnel;

// Re-export all domain types
pub use location::ServiceLocation;
pub use namespace::{LabelSelector, NamespaceCandidates};
pub use status::ExitStatus;
pub use tunnel::{
    StopCause, StopHandle, StopNotifier, StopSignal, TunnelConfig, TunnelState,
};
