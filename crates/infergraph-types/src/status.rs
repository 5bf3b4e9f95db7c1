//! Observed state of an inference graph

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition type reported once the graph serves traffic
pub const CONDITION_READY: &str = "Ready";

/// Status block of an inference graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceGraphStatus {
    /// Externally reachable URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<GraphCondition>,

    /// Generation last processed by the workload controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl InferenceGraphStatus {
    /// Look up a condition by type
    pub fn condition(&self, type_: &str) -> Option<&GraphCondition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }

    /// Whether the Ready condition is True
    pub fn is_ready(&self) -> bool {
        self.condition(CONDITION_READY)
            .is_some_and(|c| c.status == ConditionStatus::True)
    }

    /// Replace the whole condition set
    pub fn set_conditions(&mut self, conditions: Vec<GraphCondition>) {
        self.conditions = conditions;
    }
}

/// Tri-state condition value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionStatus::True => write!(f, "True"),
            ConditionStatus::False => write!(f, "False"),
            ConditionStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A typed status condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphCondition {
    #[serde(rename = "type")]
    pub type_: String,

    pub status: ConditionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GraphCondition {
    /// Ready=True, stamped now
    pub fn ready() -> Self {
        Self {
            type_: CONDITION_READY.to_string(),
            status: ConditionStatus::True,
            last_transition_time: Some(Utc::now()),
            reason: None,
            message: None,
        }
    }
}
