//! Component extension spec
//!
//! Scaling fields shared by every inference service component. Graphs carry
//! their scaling knobs in annotations instead, so for a graph these fields are
//! ignored by the policy resolver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric a component scales on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMetric {
    Cpu,
    Memory,
    Concurrency,
    Rps,
}

impl ScaleMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleMetric::Cpu => "cpu",
            ScaleMetric::Memory => "memory",
            ScaleMetric::Concurrency => "concurrency",
            ScaleMetric::Rps => "rps",
        }
    }
}

impl fmt::Display for ScaleMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scaling configuration of an inference service component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentExtensionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_replicas: Option<i32>,

    /// Upper bound; values below the resolved minimum are raised to it
    #[serde(default)]
    pub max_replicas: i32,

    /// Target utilization in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_target: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_metric: Option<ScaleMetric>,
}
