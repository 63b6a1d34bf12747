//! The cluster capability consumed by the reconciliation pass.
//!
//! The core never talks to the Kubernetes API directly. It sees namespaces
//! as `{ name, labels }` pairs through [`NamespaceApi`], which the binary
//! implements on top of `kube` and tests implement in memory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Namespace
// ---------------------------------------------------------------------------

/// A namespace as observed from the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn has_label(&self, key: &str) -> bool {
        self.labels.contains_key(key)
    }
}

// ---------------------------------------------------------------------------
// ClusterError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("namespace not found: {0}")]
    NotFound(String),

    #[error("cluster API error: {0}")]
    Api(String),
}

// ---------------------------------------------------------------------------
// NamespaceApi
// ---------------------------------------------------------------------------

/// List and delete namespaces.
///
/// Calls are issued one at a time by the reconciliation pass. Timeouts and
/// retries, if any, belong to the implementation's client configuration.
#[async_trait]
pub trait NamespaceApi: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError>;

    /// Delete a namespace by name. A missing namespace is an error.
    async fn delete_namespace(&self, name: &str) -> Result<(), ClusterError>;
}

#[async_trait]
impl<T: NamespaceApi + ?Sized> NamespaceApi for std::sync::Arc<T> {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        (**self).list_namespaces().await
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), ClusterError> {
        (**self).delete_namespace(name).await
    }
}

// ---------------------------------------------------------------------------
// In-memory cluster for tests
// ---------------------------------------------------------------------------
