//! Inference Graph Types - resource and configuration types
//!
//! An inference graph is a declarative routing topology of inference steps.
//! This crate holds the shapes the controller reads and writes:
//!
//! - **InferenceGraph**: the custom resource (metadata, spec, status)
//! - **InferenceGraphSpec**: named router nodes, resources, affinity
//! - **RouterConfig**: router image and default sizing, supplied by the operator
//! - **ComponentExtensionSpec**: scaling fields shared with inference services
//! - **InferenceGraphStatus**: URL, conditions and observed generation
//! - **constants**: well-known annotation and label keys
//!
//! Platform objects (ObjectMeta, ResourceRequirements, Affinity) are the
//! `k8s-openapi` types so they serialize exactly as the platform expects.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod constants;
pub mod extension;
pub mod graph;
pub mod modes;
pub mod router;
pub mod status;

// Re-export main types
pub use extension::{ComponentExtensionSpec, ScaleMetric};
pub use graph::{
    GraphValidationError, InferenceGraph, InferenceGraphSpec, InferenceRouter, InferenceStep,
    RouterType, StepDependency,
};
pub use modes::{AutoscalerClass, DeploymentMode};
pub use router::{RouterConfig, RouterConfigError};
pub use status::{ConditionStatus, GraphCondition, InferenceGraphStatus};
