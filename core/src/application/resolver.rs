//! Namespace resolution for the dashboard service.

use tracing::debug;

use crate::domain::{NamespaceCandidates, ServiceLocation};
use crate::ports::ClusterClient;

/// Probe each candidate namespace in order; the first hit wins.
///
/// A failed probe counts as "not found in that namespace" and the search moves
/// on. Nothing is retried.
pub async fn resolve_namespace<C: ClusterClient>(
    client: &C,
    candidates: &NamespaceCandidates,
    service_name: &str,
) -> ServiceLocation {
    for namespace in candidates.iter() {
        match client.find_service(Some(namespace), None, service_name).await {
            Ok(Some(_)) => {
                debug!(namespace, service = service_name, "service found");
                return ServiceLocation::found(namespace);
            }
            Ok(None) => debug!(namespace, service = service_name, "service not in namespace"),
            Err(e) => debug!(
                namespace,
                service = service_name,
                error = %e,
                "probe failed, treating as not found"
            ),
        }
    }
    ServiceLocation::not_found()
}

/// One unrestricted search across every namespace.
pub async fn search_cluster_wide<C: ClusterClient>(client: &C, service_name: &str) -> ServiceLocation {
    match client.find_service(None, None, service_name).await {
        Ok(namespace) => ServiceLocation::from(namespace),
        Err(e) => {
            debug!(service = service_name, error = %e, "cluster-wide probe failed");
            ServiceLocation::not_found()
        }
    }
}
