//! Scaling policy resolution
//!
//! Which layers apply depends on what is being scaled. A graph (identity
//! carries the graph label) is configured through graph annotations; any
//! other component through its extension spec. Within each case the layer
//! order below is the whole precedence story:
//!
//! | value       | graph                            | component                                     |
//! |-------------|----------------------------------|-----------------------------------------------|
//! | utilization | `target` annotation, 80          | `scaleTarget`, `targetUtilizationPercentage`, 80 |
//! | metric      | `metric` annotation, cpu         | `scaleMetric`, cpu                            |
//! | min         | `min-scale` annotation, 1        | `minReplicas`, 1                              |
//! | max         | `max-scale` annotation, 0        | `maxReplicas`                                 |
//!
//! The replica clamps run last and only ever raise values.

use super::overlay::ScalingOverlay;
use super::precedence::{ConfigSource, Precedence, Resolved};
use crate::converge::{merge_identity, Convergent};
use infergraph_types::constants::{
    DEFAULT_MIN_REPLICAS, DEFAULT_SCALE_METRIC, DEFAULT_UTILIZATION, GRAPH_MAX_SCALE_ANNOTATION,
    GRAPH_METRIC_ANNOTATION, GRAPH_MIN_SCALE_ANNOTATION, GRAPH_TARGET_ANNOTATION,
    TARGET_UTILIZATION_ANNOTATION,
};
use infergraph_types::ComponentExtensionSpec;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerBehavior,
    HorizontalPodAutoscalerSpec, MetricSpec, MetricTarget, ResourceMetricSource,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::Resource;
use tracing::debug;

/// Workload the policy scales
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleTargetRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingMetric {
    /// Resource name, e.g. `cpu`
    pub resource: String,
    /// Average utilization target in percent
    pub target_utilization: i32,
}

/// Layer that supplied each resolved field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicySources {
    pub min_replicas: ConfigSource,
    pub max_replicas: ConfigSource,
    pub metric: ConfigSource,
    pub utilization: ConfigSource,
}

/// Resolved autoscaling policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingPolicy {
    pub target: ScaleTargetRef,
    pub min_replicas: i32,
    pub max_replicas: i32,
    pub metric: ScalingMetric,
    pub sources: PolicySources,
}

pub fn utilization_precedence(
    overlay: &ScalingOverlay,
    extension: &ComponentExtensionSpec,
) -> Precedence<i32> {
    if overlay.is_graph {
        Precedence::new().layer(
            ConfigSource::Annotation(GRAPH_TARGET_ANNOTATION),
            overlay.graph_target,
        )
    } else {
        Precedence::new()
            .layer(ConfigSource::ExtensionSpec("scaleTarget"), extension.scale_target)
            .layer(
                ConfigSource::Annotation(TARGET_UTILIZATION_ANNOTATION),
                overlay.target_utilization,
            )
    }
}

pub fn metric_precedence(
    overlay: &ScalingOverlay,
    extension: &ComponentExtensionSpec,
) -> Precedence<String> {
    if overlay.is_graph {
        Precedence::new().layer(
            ConfigSource::Annotation(GRAPH_METRIC_ANNOTATION),
            overlay.graph_metric.clone(),
        )
    } else {
        Precedence::new().layer(
            ConfigSource::ExtensionSpec("scaleMetric"),
            extension.scale_metric.map(|m| m.as_str().to_string()),
        )
    }
}

pub fn min_replicas_precedence(
    overlay: &ScalingOverlay,
    extension: &ComponentExtensionSpec,
) -> Precedence<i32> {
    if overlay.is_graph {
        Precedence::new().layer(
            ConfigSource::Annotation(GRAPH_MIN_SCALE_ANNOTATION),
            overlay.graph_min_scale,
        )
    } else {
        Precedence::new().layer(ConfigSource::ExtensionSpec("minReplicas"), extension.min_replicas)
    }
}

pub fn max_replicas_precedence(
    overlay: &ScalingOverlay,
    extension: &ComponentExtensionSpec,
) -> Precedence<i32> {
    if overlay.is_graph {
        Precedence::new().layer(
            ConfigSource::Annotation(GRAPH_MAX_SCALE_ANNOTATION),
            overlay.graph_max_scale,
        )
    } else {
        Precedence::new().layer(
            ConfigSource::ExtensionSpec("maxReplicas"),
            Some(extension.max_replicas),
        )
    }
}

/// Raise `min` to the global floor, then `max` to `min`
pub fn clamp_replicas(min: i32, max: i32) -> (i32, i32) {
    let min = min.max(DEFAULT_MIN_REPLICAS);
    let max = max.max(min);
    (min, max)
}

/// Resolve the scaling policy for the object described by `identity`
pub fn resolve(identity: &ObjectMeta, extension: &ComponentExtensionSpec) -> ScalingPolicy {
    let overlay = ScalingOverlay::decode(identity);

    let utilization_layers = utilization_precedence(&overlay, extension);
    let min_layers = min_replicas_precedence(&overlay, extension);
    debug!(
        graph = overlay.is_graph,
        utilization_layers = ?utilization_layers.sources(),
        min_replicas_layers = ?min_layers.sources(),
        "scaling precedence"
    );

    let utilization = utilization_layers.resolve_or(DEFAULT_UTILIZATION);
    let metric = metric_precedence(&overlay, extension).resolve_or(DEFAULT_SCALE_METRIC.to_string());
    let min: Resolved<i32> = min_layers.resolve_or(DEFAULT_MIN_REPLICAS);
    let max: Resolved<i32> = max_replicas_precedence(&overlay, extension).resolve_or(0);

    let (min_replicas, max_replicas) = clamp_replicas(min.value, max.value);

    debug!(
        graph = overlay.is_graph,
        min_replicas,
        max_replicas,
        metric = %metric.value,
        utilization = utilization.value,
        min_source = %min.source,
        max_source = %max.source,
        "resolved scaling policy"
    );

    ScalingPolicy {
        target: ScaleTargetRef {
            api_version: Deployment::API_VERSION.to_string(),
            kind: Deployment::KIND.to_string(),
            name: identity.name.clone().unwrap_or_default(),
        },
        min_replicas,
        max_replicas,
        metric: ScalingMetric {
            resource: metric.value,
            target_utilization: utilization.value,
        },
        sources: PolicySources {
            min_replicas: min.source,
            max_replicas: max.source,
            metric: metric.source,
            utilization: utilization.source,
        },
    }
}

impl ScalingPolicy {
    /// Render as an `autoscaling/v2` HorizontalPodAutoscaler carrying `identity`
    pub fn to_autoscaler(&self, identity: &ObjectMeta) -> HorizontalPodAutoscaler {
        HorizontalPodAutoscaler {
            metadata: identity.clone(),
            spec: Some(HorizontalPodAutoscalerSpec {
                scale_target_ref: CrossVersionObjectReference {
                    api_version: Some(self.target.api_version.clone()),
                    kind: self.target.kind.clone(),
                    name: self.target.name.clone(),
                },
                min_replicas: Some(self.min_replicas),
                max_replicas: self.max_replicas,
                metrics: Some(vec![MetricSpec {
                    type_: "Resource".to_string(),
                    resource: Some(ResourceMetricSource {
                        name: self.metric.resource.clone(),
                        target: MetricTarget {
                            type_: "Utilization".to_string(),
                            average_utilization: Some(self.metric.target_utilization),
                            ..Default::default()
                        },
                    }),
                    ..Default::default()
                }]),
                behavior: Some(HorizontalPodAutoscalerBehavior::default()),
            }),
            status: None,
        }
    }
}

impl Convergent for HorizontalPodAutoscaler {
    fn spec_matches(desired: &Self, live: &Self) -> bool {
        desired.spec == live.spec
    }

    fn merge_onto(desired: &Self, mut live: Self) -> Self {
        merge_identity(&desired.metadata, &mut live.metadata);
        live.spec = desired.spec.clone();
        live
    }
}
