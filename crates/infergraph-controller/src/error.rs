//! Controller error types

use infergraph_types::GraphValidationError;
use thiserror::Error;

/// Errors returned by the cluster object API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("{kind} {namespace}/{name} already exists")]
    AlreadyExists {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid object: {0}")]
    Invalid(String),

    #[error("api error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl ClusterError {
    /// Not-found is an expected outcome of a lookup, not a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound { .. })
    }
}

/// Result type for cluster operations
pub type ClusterResult<T> = std::result::Result<T, ClusterError>;

/// Failures of the observe/act steps of convergence
#[derive(Debug, Error)]
pub enum ConvergeError {
    #[error("failed to get {kind} {namespace}/{name}")]
    Observe {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed to create {kind} {namespace}/{name}")]
    Create {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed to update {kind} {namespace}/{name}")]
    Update {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: ClusterError,
    },
}

impl ConvergeError {
    /// Underlying cluster error, unmodified
    pub fn cluster_error(&self) -> &ClusterError {
        match self {
            ConvergeError::Observe { source, .. }
            | ConvergeError::Create { source, .. }
            | ConvergeError::Update { source, .. } => source,
        }
    }
}

/// Owner reference attachment failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnerRefError {
    #[error("owner {kind} {name} has no uid")]
    MissingUid { kind: &'static str, name: String },

    #[error("cross-namespace owner reference: owner in {owner_namespace}, object in {object_namespace}")]
    CrossNamespace {
        owner_namespace: String,
        object_namespace: String,
    },

    #[error("object is already controlled by {kind} {name}")]
    AlreadyOwned { kind: String, name: String },
}

/// Invalid router sizing or an unserializable graph
#[derive(Debug, Error)]
pub enum PodSpecError {
    #[error("failed to serialize graph spec: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid quantity {value:?} for {field}")]
    Quantity { field: &'static str, value: String },
}

/// Errors from one reconciliation pass of an inference graph
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("inference graph has no {field}")]
    MissingIdentity { field: &'static str },

    #[error("inference graph is invalid")]
    InvalidGraph(#[from] GraphValidationError),

    #[error("invalid router configuration")]
    PodSpec(#[from] PodSpecError),

    #[error("failed to set {kind} owner reference for inference graph")]
    OwnerReference {
        kind: &'static str,
        #[source]
        source: OwnerRefError,
    },

    #[error("failed to reconcile workload")]
    Workload(#[source] ConvergeError),

    #[error("failed to reconcile scaling policy")]
    ScalingPolicy(#[source] ConvergeError),
}

/// Result type for reconciliation
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_not_found_is_distinguished() {
        let err = ClusterError::NotFound {
            kind: "Deployment".into(),
            namespace: "ns".into(),
            name: "ig".into(),
        };
        assert!(err.is_not_found());
        assert!(!ClusterError::Transport("reset".into()).is_not_found());
    }

    #[test]
    fn test_stage_message_wraps_cause() {
        let err = ReconcileError::Workload(ConvergeError::Update {
            kind: "Deployment",
            namespace: "ns".into(),
            name: "ig".into(),
            source: ClusterError::Api {
                code: 500,
                message: "etcd timeout".into(),
            },
        });

        assert_eq!(err.to_string(), "failed to reconcile workload");
        let converge = err.source().unwrap();
        assert_eq!(converge.to_string(), "failed to update Deployment ns/ig");
        assert_eq!(
            converge.source().unwrap().to_string(),
            "api error (500): etcd timeout"
        );
    }
}
