//! Kubernetes data models for pod discovery.

use serde::Deserialize;

// ============================================================================
// Discovery Models
// ============================================================================

/// Pod phase reported while a pod's containers are up.
pub const POD_PHASE_RUNNING: &str = "Running";

/// A Kubernetes pod.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KubernetesPod {
    pub name: String,
    pub namespace: String,
    pub phase: Option<String>,
}

impl KubernetesPod {
    /// Returns the pod ID in the format "namespace/name".
    pub fn id(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    pub fn is_running(&self) -> bool {
        self.phase.as_deref() == Some(POD_PHASE_RUNNING)
    }

    /// Pods created by a deployment are named `<deployment>-<hash>-<suffix>`.
    pub fn belongs_to(&self, workload: &str) -> bool {
        self.name.starts_with(workload)
    }
}

/// First running pod that belongs to `workload`.
pub fn find_running_pod<'a>(pods: &'a [KubernetesPod], workload: &str) -> Option<&'a KubernetesPod> {
    pods.iter().find(|p| p.is_running() && p.belongs_to(workload))
}

// ============================================================================
// kubectl JSON Response Parsing
// ============================================================================

/// Response structure for `kubectl get pods -o json`.
#[derive(Debug, Deserialize)]
pub struct PodListResponse {
    #[serde(default)]
    pub items: Vec<PodItem>,
}

#[derive(Debug, Deserialize)]
pub struct PodItem {
    pub metadata: PodMetadata,
    pub status: Option<PodStatus>,
}

#[derive(Debug, Deserialize)]
pub struct PodMetadata {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Debug, Deserialize)]
pub struct PodStatus {
    pub phase: Option<String>,
}

impl PodListResponse {
    /// Converts the kubectl response to a list of KubernetesPod.
    pub fn into_pods(self) -> Vec<KubernetesPod> {
        self.items
            .into_iter()
            .map(|item| KubernetesPod {
                name: item.metadata.name,
                namespace: item.metadata.namespace,
                phase: item.status.and_then(|s| s.phase),
            })
            .collect()
    }
}
