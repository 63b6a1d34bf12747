use crate::cluster::NamespaceApi;
use crate::error::{ReaperError, Result};
use crate::policy::RetentionPolicy;
use serde::{Deserialize, Serialize};

/// What a single pass found and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub dry_run: bool,
    /// Unprotected namespaces, in the order the cluster listed them.
    pub candidates: Vec<String>,
    /// Namespaces actually deleted. Always empty in dry-run.
    pub deleted: Vec<String>,
}

/// List namespaces, classify them against `policy`, and delete the
/// unprotected ones unless `dry_run` is set.
///
/// Deletions run sequentially in list order and stop at the first failure.
/// Namespaces deleted before that failure stay deleted.
pub async fn reconcile<A>(api: &A, policy: &RetentionPolicy, dry_run: bool) -> Result<ReconcileReport>
where
    A: NamespaceApi + ?Sized,
{
    let namespaces = api.list_namespaces().await.map_err(ReaperError::List)?;
    let candidates = policy.candidates(&namespaces);

    tracing::debug!(
        listed = namespaces.len(),
        candidates = candidates.len(),
        "classified namespaces"
    );

    if dry_run {
        tracing::info!(
            namespaces = ?candidates,
            "dry run mode, would have deleted {} namespace(s)",
            candidates.len()
        );
        return Ok(ReconcileReport {
            dry_run,
            candidates,
            deleted: Vec::new(),
        });
    }

    let mut deleted = Vec::with_capacity(candidates.len());
    for name in &candidates {
        tracing::info!(namespace = %name, "deleting namespace");
        api.delete_namespace(name)
            .await
            .map_err(|source| ReaperError::Delete {
                namespace: name.clone(),
                source,
            })?;
        deleted.push(name.clone());
    }

    Ok(ReconcileReport {
        dry_run,
        candidates,
        deleted,
    })
}
