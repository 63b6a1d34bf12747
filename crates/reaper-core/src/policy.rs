use crate::cluster::Namespace;
use std::collections::BTreeSet;

/// Namespaces the platform itself depends on. Never deleted.
pub const NEVER_DELETE: &[&str] = &["kube-system", "default", "kube-public"];

/// Label key that protects a namespace regardless of its name. Only the
/// key's presence matters.
pub const PRESERVE_LABEL: &str = "preserve";

/// Which namespaces survive a reconciliation pass.
///
/// Dry-run reporting and execution both go through [`Self::candidates`], so
/// the "would delete" set is exactly what execute mode deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    protected: BTreeSet<String>,
}

impl RetentionPolicy {
    pub fn new<N, R>(never_delete: N, retain: R) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let protected = never_delete
            .into_iter()
            .map(Into::into)
            .chain(retain.into_iter().map(Into::into))
            .collect();
        Self { protected }
    }

    /// The platform never-delete set plus `retain`.
    pub fn platform_default<R>(retain: R) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self::new(NEVER_DELETE.iter().copied(), retain)
    }

    pub fn protected_names(&self) -> impl Iterator<Item = &str> {
        self.protected.iter().map(String::as_str)
    }

    pub fn is_protected(&self, ns: &Namespace) -> bool {
        self.protected.contains(&ns.name) || ns.has_label(PRESERVE_LABEL)
    }

    /// Names of unprotected namespaces, in input order.
    pub fn candidates(&self, namespaces: &[Namespace]) -> Vec<String> {
        namespaces
            .iter()
            .filter(|ns| !self.is_protected(ns))
            .map(|ns| ns.name.clone())
            .collect()
    }
}
