//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs

mod announcer;
mod dashboard_service;
mod resolver;
mod tunnel_session;

#[cfg(test)]
pub(crate) mod testing;

pub use announcer::announce_endpoint;
pub use dashboard_service::DashboardService;
pub use resolver::{resolve_namespace, search_cluster_wide};
pub use tunnel_session::{run_session, SessionEnd};
