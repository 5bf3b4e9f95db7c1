//! Well-known keys and defaults shared by the controller and its users.

/// API group of the inference graph resource.
pub const SERVING_GROUP: &str = "serving.kserve.io";

/// Label marking an object as belonging to an inference graph. Its value is
/// the graph name.
pub const INFERENCE_GRAPH_LABEL: &str = "serving.kserve.io/inferencegraph";

/// Annotation selecting the deployment mode.
pub const DEPLOYMENT_MODE_ANNOTATION: &str = "serving.kserve.io/deploymentMode";

/// Annotation selecting who manages the autoscaler.
pub const AUTOSCALER_CLASS_ANNOTATION: &str = "serving.kserve.io/autoscalerClass";

/// Generic utilization override, honoured for non-graph components.
pub const TARGET_UTILIZATION_ANNOTATION: &str = "serving.kserve.io/targetUtilizationPercentage";

// Graph-only scaling overrides:
//
//   serving.kserve.io/max-scale: "7"
//   serving.kserve.io/metric: memory
//   serving.kserve.io/min-scale: "1"
//   serving.kserve.io/target: "40"
pub const GRAPH_TARGET_ANNOTATION: &str = "serving.kserve.io/target";
pub const GRAPH_METRIC_ANNOTATION: &str = "serving.kserve.io/metric";
pub const GRAPH_MIN_SCALE_ANNOTATION: &str = "serving.kserve.io/min-scale";
pub const GRAPH_MAX_SCALE_ANNOTATION: &str = "serving.kserve.io/max-scale";

/// Environment variable carrying the headers the router must forward.
pub const PROPAGATE_HEADERS_ENV: &str = "PROPAGATE_HEADERS";

/// Router header config key whose values are forwarded downstream.
pub const PROPAGATE_HEADERS_KEY: &str = "propagate";

/// Startup flag that precedes the serialized graph.
pub const GRAPH_JSON_FLAG: &str = "--graph-json";

/// Name of the node every graph starts from.
pub const GRAPH_ROOT_NODE: &str = "root";

/// Label used as the workload selector.
pub const APP_LABEL: &str = "app";

/// Default average utilization target, in percent.
pub const DEFAULT_UTILIZATION: i32 = 80;

/// Global floor for minimum replicas.
pub const DEFAULT_MIN_REPLICAS: i32 = 1;

/// Scale metric used when nothing else is configured.
pub const DEFAULT_SCALE_METRIC: &str = "cpu";

/// Key holding the router JSON document in the controller config map.
pub const ROUTER_CONFIG_KEY: &str = "router";
