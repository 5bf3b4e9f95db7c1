//! Inference Graph Controller - reconciliation core
//!
//! Turns an [`InferenceGraph`](infergraph_types::InferenceGraph) into the
//! objects that run it and keeps them converged:
//!
//! - **metadata**: identity block shared by every derived object
//! - **podspec**: the router process spec (image, graph JSON, headers, sizing)
//! - **workload**: the Deployment wrapping that process spec
//! - **scaling**: layered resolution of the autoscaling policy
//! - **converge**: observe, compare and act against the cluster
//! - **status**: workload availability folded back into graph status
//! - **reconciler**: one pass over all of the above
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    GraphReconciler                     │
//! │  identity ─▶ pod spec ─▶ Deployment ─┐                 │
//! │  identity ─▶ scaling policy ─▶ HPA ──┼─▶ converge      │
//! │                                      │       │         │
//! │                 graph status ◀── propagate ◀─┘         │
//! └──────────────────────────────┬─────────────────────────┘
//!                                │ ObjectApi
//!                   ┌────────────▼────────────┐
//!                   │ cluster (or in-memory)  │
//!                   └─────────────────────────┘
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod cluster;
pub mod config;
pub mod converge;
pub mod error;
pub mod metadata;
pub mod owner;
pub mod podspec;
pub mod reconciler;
pub mod resources;
pub mod scaling;
pub mod status;
pub mod telemetry;
pub mod workload;

// Re-export main types
pub use cluster::{InMemoryCluster, ObjectApi};
pub use config::{ControllerConfig, IngressConfig, LoggingConfig};
pub use converge::{converge, ConvergeAction, Converged, Convergent, Decision};
pub use error::{
    ClusterError, ClusterResult, ConvergeError, OwnerRefError, PodSpecError, ReconcileError,
    Result,
};
pub use metadata::build_identity;
pub use owner::set_controller_reference;
pub use podspec::build_pod_spec;
pub use reconciler::{GraphReconciler, ReconcileReport};
pub use scaling::{ConfigSource, ScalingPolicy};
pub use status::propagate_raw_status;
pub use workload::build_deployment;
