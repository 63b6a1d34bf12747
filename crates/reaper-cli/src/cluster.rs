use anyhow::Context;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace as KubeNamespace;
use kube::api::{DeleteParams, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client};
use reaper_core::{ClusterError, Namespace, NamespaceApi};
use std::path::Path;

/// [`NamespaceApi`] backed by the Kubernetes API server.
pub struct KubeNamespaces {
    api: Api<KubeNamespace>,
}

impl KubeNamespaces {
    /// Connect using `kubeconfig` when given, otherwise the in-cluster
    /// service account or the default kubeconfig.
    pub async fn connect(kubeconfig: Option<&Path>) -> anyhow::Result<Self> {
        let client = match kubeconfig {
            Some(path) => {
                let raw = Kubeconfig::read_from(path)
                    .with_context(|| format!("cannot read kubeconfig {}", path.display()))?;
                let config = kube::Config::from_custom_kubeconfig(raw, &KubeConfigOptions::default())
                    .await
                    .context("cannot build config")?;
                Client::try_from(config).context("cannot build kube client")?
            }
            None => Client::try_default()
                .await
                .context("cannot build kube client")?,
        };
        Ok(Self {
            api: Api::all(client),
        })
    }
}

fn to_cluster_error(err: kube::Error, name: Option<&str>) -> ClusterError {
    match (&err, name) {
        (kube::Error::Api(resp), Some(name)) if resp.code == 404 => {
            ClusterError::NotFound(name.to_string())
        }
        _ => ClusterError::Api(err.to_string()),
    }
}

#[async_trait]
impl NamespaceApi for KubeNamespaces {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        let list = self
            .api
            .list(&ListParams::default())
            .await
            .map_err(|e| to_cluster_error(e, None))?;

        Ok(list
            .items
            .into_iter()
            .map(|ns| Namespace {
                name: ns.metadata.name.unwrap_or_default(),
                labels: ns.metadata.labels.unwrap_or_default(),
            })
            .collect())
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), ClusterError> {
        self.api
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| to_cluster_error(e, Some(name)))
    }
}
