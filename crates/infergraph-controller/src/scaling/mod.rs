//! Autoscaling policy: annotation overlay, layered precedence and the
//! HorizontalPodAutoscaler rendering.

mod overlay;
mod policy;
mod precedence;

pub use overlay::ScalingOverlay;
pub use policy::{
    clamp_replicas, max_replicas_precedence, metric_precedence, min_replicas_precedence, resolve,
    utilization_precedence, PolicySources, ScaleTargetRef, ScalingMetric, ScalingPolicy,
};
pub use precedence::{ConfigSource, Precedence, Resolved};
