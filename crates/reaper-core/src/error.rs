use crate::cluster::ClusterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaperError {
    #[error("cannot list namespaces")]
    List(#[source] ClusterError),

    #[error("cannot delete namespace '{namespace}'")]
    Delete {
        namespace: String,
        #[source]
        source: ClusterError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl ReaperError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The namespace whose deletion failed, if this is a delete error.
    pub fn failed_namespace(&self) -> Option<&str> {
        match self {
            Self::Delete { namespace, .. } => Some(namespace),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReaperError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    /// Render the message chain the way `{:#}` on an `anyhow::Error` does.
    fn chain(err: &ReaperError) -> String {
        let mut out = err.to_string();
        let mut next = err.source();
        while let Some(cause) = next {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            next = cause.source();
        }
        out
    }

    #[test]
    fn list_error_names_cause_once() {
        let err = ReaperError::List(ClusterError::Api("x".into()));
        assert_eq!(err.to_string(), "cannot list namespaces");
        assert_eq!(chain(&err), "cannot list namespaces: cluster API error: x");
    }

    #[test]
    fn delete_error_names_namespace_and_cause_once() {
        let err = ReaperError::Delete {
            namespace: "custom".into(),
            source: ClusterError::NotFound("custom".into()),
        };
        assert_eq!(err.failed_namespace(), Some("custom"));
        assert_eq!(
            chain(&err),
            "cannot delete namespace 'custom': namespace not found: custom"
        );
    }

    #[test]
    fn config_error_has_no_source() {
        let err = ReaperError::config("bad hour");
        assert!(err.source().is_none());
        assert_eq!(chain(&err), "invalid configuration: bad hour");
    }
}
