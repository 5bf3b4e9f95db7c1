//! Inference graph resource and topology
//!
//! A graph is a map of named router nodes. Each node routes a request through
//! its ordered steps; a step targets either another node or a service. The
//! `root` node is the entry point.
//!
//! Serialization of [`InferenceGraphSpec`] is stable: nodes live in a sorted
//! map and every struct serializes in declaration order, so the same spec
//! always produces the same JSON bytes.

use crate::constants::{GRAPH_ROOT_NODE, SERVING_GROUP};
use crate::status::InferenceGraphStatus;
use k8s_openapi::api::core::v1::{Affinity, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// The inference graph custom resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceGraph {
    #[serde(default)]
    pub metadata: ObjectMeta,

    pub spec: InferenceGraphSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InferenceGraphStatus>,
}

impl InferenceGraph {
    /// Graph name, empty when unset
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Graph namespace, empty when unset
    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }

    /// Mutable status block, created on first use
    pub fn status_mut(&mut self) -> &mut InferenceGraphStatus {
        self.status.get_or_insert_with(InferenceGraphStatus::default)
    }
}

impl k8s_openapi::Resource for InferenceGraph {
    const API_VERSION: &'static str = "serving.kserve.io/v1alpha1";
    const GROUP: &'static str = SERVING_GROUP;
    const KIND: &'static str = "InferenceGraph";
    const VERSION: &'static str = "v1alpha1";
    const URL_PATH_SEGMENT: &'static str = "inferencegraphs";
    type Scope = k8s_openapi::NamespaceResourceScope;
}

impl k8s_openapi::Metadata for InferenceGraph {
    type Ty = ObjectMeta;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Desired state of an inference graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceGraphSpec {
    /// Router nodes keyed by name
    pub nodes: BTreeMap<String, InferenceRouter>,

    /// Resource requirements for the router process
    #[serde(default)]
    pub resources: ResourceRequirements,

    /// Scheduling affinity for the router process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,
}

/// How a node dispatches to its steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouterType {
    /// Steps run one after another, each feeding the next
    #[default]
    Sequence,
    /// One step is picked by weight
    Splitter,
    /// All steps run and results are merged
    Ensemble,
    /// The first step whose condition matches runs
    Switch,
}

/// A router node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceRouter {
    pub router_type: RouterType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<InferenceStep>,
}

/// Whether a failing step fails the whole request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepDependency {
    Soft,
    Hard,
}

/// One step of a router node
///
/// Exactly one of `node_name`, `service_name` and `service_url` names the
/// target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,

    /// Request payload selector, `$request` or `$response`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Traffic share for splitter nodes, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,

    /// Routing condition for switch nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<StepDependency>,
}

impl InferenceStep {
    /// Step targeting a service by URL
    pub fn to_url(url: impl Into<String>) -> Self {
        Self {
            service_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Step targeting another node of the same graph
    pub fn to_node(node: impl Into<String>) -> Self {
        Self {
            node_name: Some(node.into()),
            ..Default::default()
        }
    }

    fn target_count(&self) -> usize {
        [&self.node_name, &self.service_name, &self.service_url]
            .iter()
            .filter(|t| t.as_deref().is_some_and(|s| !s.is_empty()))
            .count()
    }
}

/// Structural problems that make a graph undeployable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphValidationError {
    #[error("graph must define a \"{0}\" node")]
    MissingRoot(String),

    #[error("node {node} step {index} must target exactly one of nodeName, serviceName or serviceUrl, found {found}")]
    StepTarget {
        node: String,
        index: usize,
        found: usize,
    },

    #[error("node {node} step {index} references unknown node {target}")]
    UnknownNode {
        node: String,
        index: usize,
        target: String,
    },

    #[error("node {node} has duplicate step name {name}")]
    DuplicateStepName { node: String, name: String },

    #[error("splitter node {node} step {index} has no weight")]
    MissingWeight { node: String, index: usize },

    #[error("splitter node {node} step {index} weight {weight} is outside 0..=100")]
    WeightRange {
        node: String,
        index: usize,
        weight: i64,
    },

    #[error("splitter node {node} weights sum to {total}, expected 100")]
    SplitterWeight { node: String, total: i64 },
}

impl InferenceGraphSpec {
    /// Single-node graph with a root of the given type
    pub fn with_root(router_type: RouterType, steps: Vec<InferenceStep>) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            GRAPH_ROOT_NODE.to_string(),
            InferenceRouter { router_type, steps },
        );
        Self {
            nodes,
            ..Default::default()
        }
    }

    /// Check the topology is deployable
    pub fn validate(&self) -> Result<(), GraphValidationError> {
        if !self.nodes.contains_key(GRAPH_ROOT_NODE) {
            return Err(GraphValidationError::MissingRoot(GRAPH_ROOT_NODE.to_string()));
        }

        for (node, router) in &self.nodes {
            let mut names = HashSet::new();

            for (index, step) in router.steps.iter().enumerate() {
                let found = step.target_count();
                if found != 1 {
                    return Err(GraphValidationError::StepTarget {
                        node: node.clone(),
                        index,
                        found,
                    });
                }

                if let Some(target) = step.node_name.as_deref().filter(|t| !t.is_empty()) {
                    if !self.nodes.contains_key(target) {
                        return Err(GraphValidationError::UnknownNode {
                            node: node.clone(),
                            index,
                            target: target.to_string(),
                        });
                    }
                }

                if let Some(name) = step.name.as_deref().filter(|n| !n.is_empty()) {
                    if !names.insert(name) {
                        return Err(GraphValidationError::DuplicateStepName {
                            node: node.clone(),
                            name: name.to_string(),
                        });
                    }
                }
            }

            if router.router_type == RouterType::Splitter {
                let mut total = 0;
                for (index, step) in router.steps.iter().enumerate() {
                    match step.weight {
                        // Bounded weights keep the sum far from overflow.
                        Some(weight) if !(0..=100).contains(&weight) => {
                            return Err(GraphValidationError::WeightRange {
                                node: node.clone(),
                                index,
                                weight,
                            })
                        }
                        Some(weight) => total += weight,
                        None => {
                            return Err(GraphValidationError::MissingWeight {
                                node: node.clone(),
                                index,
                            })
                        }
                    }
                }
                if total != 100 {
                    return Err(GraphValidationError::SplitterWeight {
                        node: node.clone(),
                        total,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(weights: &[Option<i64>]) -> InferenceGraphSpec {
        let steps = weights
            .iter()
            .enumerate()
            .map(|(i, w)| InferenceStep {
                weight: *w,
                ..InferenceStep::to_url(format!("http://model-{i}.example.com"))
            })
            .collect();
        InferenceGraphSpec::with_root(RouterType::Splitter, steps)
    }

    #[test]
    fn test_spec_serialization_is_compact_and_ordered() {
        let spec = InferenceGraphSpec::with_root(
            RouterType::Sequence,
            vec![InferenceStep::to_url("http://someservice.example.com")],
        );

        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(
            json,
            r#"{"nodes":{"root":{"routerType":"Sequence","steps":[{"serviceUrl":"http://someservice.example.com"}]}},"resources":{}}"#
        );
    }

    #[test]
    fn test_nodes_serialize_sorted() {
        let mut spec = InferenceGraphSpec::with_root(
            RouterType::Sequence,
            vec![InferenceStep::to_node("zeta"), InferenceStep::to_node("alpha")],
        );
        spec.nodes.insert("zeta".into(), InferenceRouter::default());
        spec.nodes.insert("alpha".into(), InferenceRouter::default());

        let json = serde_json::to_string(&spec).unwrap();
        let alpha = json.find("\"alpha\":").unwrap();
        let root = json.find("\"root\":").unwrap();
        let zeta = json.find("\"zeta\":").unwrap();
        assert!(alpha < root && root < zeta);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_graph_deserializes_from_manifest() {
        let manifest = r#"
apiVersion: serving.kserve.io/v1alpha1
kind: InferenceGraph
metadata:
  name: dog-breed
  namespace: models
  annotations:
    serving.kserve.io/min-scale: "2"
spec:
  nodes:
    root:
      routerType: Sequence
      steps:
        - name: classifier
          serviceName: cat-dog
        - name: breed
          serviceName: dog-breed
          data: $request
          condition: "[@this].#(predictions.0==\"dog\")"
"#;
        let graph: InferenceGraph = serde_yaml::from_str(manifest).unwrap();
        assert_eq!(graph.name(), "dog-breed");
        assert_eq!(graph.namespace(), "models");
        let root = &graph.spec.nodes["root"];
        assert_eq!(root.router_type, RouterType::Sequence);
        assert_eq!(root.steps.len(), 2);
        assert_eq!(root.steps[1].data.as_deref(), Some("$request"));
        assert!(graph.spec.validate().is_ok());
    }

    #[test]
    fn test_missing_root_rejected() {
        let mut spec = InferenceGraphSpec::default();
        spec.nodes.insert("other".into(), InferenceRouter::default());
        assert_eq!(
            spec.validate(),
            Err(GraphValidationError::MissingRoot("root".into()))
        );
    }

    #[test]
    fn test_step_needs_exactly_one_target() {
        let empty = InferenceGraphSpec::with_root(RouterType::Sequence, vec![InferenceStep::default()]);
        assert!(matches!(
            empty.validate(),
            Err(GraphValidationError::StepTarget { found: 0, .. })
        ));

        let both = InferenceGraphSpec::with_root(
            RouterType::Sequence,
            vec![InferenceStep {
                service_name: Some("svc".into()),
                ..InferenceStep::to_url("http://svc.example.com")
            }],
        );
        assert!(matches!(
            both.validate(),
            Err(GraphValidationError::StepTarget { found: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_node_reference() {
        let spec = InferenceGraphSpec::with_root(RouterType::Sequence, vec![InferenceStep::to_node("missing")]);
        assert!(matches!(
            spec.validate(),
            Err(GraphValidationError::UnknownNode { target, .. }) if target == "missing"
        ));
    }

    #[test]
    fn test_duplicate_step_names() {
        let step = InferenceStep {
            name: Some("a".into()),
            ..InferenceStep::to_url("http://a.example.com")
        };
        let spec = InferenceGraphSpec::with_root(RouterType::Ensemble, vec![step.clone(), step]);
        assert!(matches!(
            spec.validate(),
            Err(GraphValidationError::DuplicateStepName { .. })
        ));
    }

    #[test]
    fn test_splitter_weights() {
        assert!(splitter(&[Some(30), Some(70)]).validate().is_ok());
        assert!(matches!(
            splitter(&[Some(30), Some(60)]).validate(),
            Err(GraphValidationError::SplitterWeight { total: 90, .. })
        ));
        assert!(matches!(
            splitter(&[Some(100), None]).validate(),
            Err(GraphValidationError::MissingWeight { index: 1, .. })
        ));
    }

    #[test]
    fn test_splitter_negative_weight_rejected() {
        assert_eq!(
            splitter(&[Some(150), Some(-50)]).validate(),
            Err(GraphValidationError::WeightRange {
                node: "root".into(),
                index: 0,
                weight: 150,
            })
        );
        assert!(matches!(
            splitter(&[Some(100), Some(-1), Some(1)]).validate(),
            Err(GraphValidationError::WeightRange { index: 1, weight: -1, .. })
        ));
    }

    #[test]
    fn test_splitter_huge_weights_do_not_overflow() {
        assert!(matches!(
            splitter(&[Some(i64::MAX), Some(1)]).validate(),
            Err(GraphValidationError::WeightRange { index: 0, .. })
        ));
        assert!(matches!(
            splitter(&[Some(i64::MIN), Some(i64::MAX)]).validate(),
            Err(GraphValidationError::WeightRange { index: 0, .. })
        ));
    }
}
