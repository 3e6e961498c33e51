//! Namespace search domain model.

use std::collections::BTreeMap;
use std::fmt;

/// Ordered, duplicate-free list of namespaces to search for a service.
///
/// Priority is user namespace, then the system namespace, then the default
/// namespace. The two well-known namespaces are only appended when they
/// differ from the user namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceCandidates {
    namespaces: Vec<String>,
}

impl NamespaceCandidates {
    /// Build the candidate list from the user-supplied namespace.
    pub fn new(user: &str, system: &str, default: &str) -> Self {
        let mut namespaces = vec![user.to_string()];
        if user != system {
            namespaces.push(system.to_string());
        }
        if user != default {
            namespaces.push(default.to_string());
        }
        Self { namespaces }
    }

    /// Iterate candidates in search priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// Equality-based label selector used to narrow an existence query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    labels: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `key=value` requirement.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&rendered)
    }
}
