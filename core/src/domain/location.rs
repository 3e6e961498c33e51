//! Result of a service search.

/// Where a service was found, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLocation {
    pub found: bool,
    pub namespace: String,
}

impl ServiceLocation {
    /// A hit in the given namespace.
    pub fn found(namespace: impl Into<String>) -> Self {
        Self {
            found: true,
            namespace: namespace.into(),
        }
    }

    /// A miss. The namespace is empty.
    pub fn not_found() -> Self {
        Self {
            found: false,
            namespace: String::new(),
        }
    }

    /// Returns the namespace of a hit.
    pub fn namespace(&self) -> Option<&str> {
        self.found.then_some(self.namespace.as_str())
    }
}

impl From<Option<String>> for ServiceLocation {
    fn from(namespace: Option<String>) -> Self {
        match namespace {
            Some(ns) => Self::found(ns),
            None => Self::not_found(),
        }
    }
}
