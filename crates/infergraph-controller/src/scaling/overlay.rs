//! Typed view of the scaling annotations and labels
//!
//! Decoded once per pass. Values that do not parse are dropped here, so the
//! resolver only ever sees well-typed optional fields and falls through to
//! the next layer.

use infergraph_types::constants::{
    GRAPH_MAX_SCALE_ANNOTATION, GRAPH_METRIC_ANNOTATION, GRAPH_MIN_SCALE_ANNOTATION,
    GRAPH_TARGET_ANNOTATION, INFERENCE_GRAPH_LABEL, TARGET_UTILIZATION_ANNOTATION,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalingOverlay {
    /// The object carries the graph identity label
    pub is_graph: bool,
    pub graph_target: Option<i32>,
    pub graph_metric: Option<String>,
    pub graph_min_scale: Option<i32>,
    pub graph_max_scale: Option<i32>,
    pub target_utilization: Option<i32>,
}

impl ScalingOverlay {
    pub fn decode(meta: &ObjectMeta) -> Self {
        let empty = BTreeMap::new();
        let annotations = meta.annotations.as_ref().unwrap_or(&empty);
        let is_graph = meta
            .labels
            .as_ref()
            .is_some_and(|labels| labels.contains_key(INFERENCE_GRAPH_LABEL));

        Self {
            is_graph,
            graph_target: int_annotation(annotations, GRAPH_TARGET_ANNOTATION),
            graph_metric: annotations.get(GRAPH_METRIC_ANNOTATION).cloned(),
            graph_min_scale: int_annotation(annotations, GRAPH_MIN_SCALE_ANNOTATION),
            graph_max_scale: int_annotation(annotations, GRAPH_MAX_SCALE_ANNOTATION),
            target_utilization: int_annotation(annotations, TARGET_UTILIZATION_ANNOTATION),
        }
    }
}

fn int_annotation(annotations: &BTreeMap<String, String>, key: &str) -> Option<i32> {
    let raw = annotations.get(key)?;
    match raw.parse::<i32>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(annotation = key, value = %raw, error = %e, "ignoring unparsable annotation");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(labels: &[(&str, &str)], annotations: &[(&str, &str)]) -> ObjectMeta {
        let to_map = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };
        ObjectMeta {
            labels: Some(to_map(labels)),
            annotations: Some(to_map(annotations)),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_graph_annotations() {
        let overlay = ScalingOverlay::decode(&meta(
            &[(INFERENCE_GRAPH_LABEL, "ig")],
            &[
                (GRAPH_TARGET_ANNOTATION, "40"),
                (GRAPH_METRIC_ANNOTATION, "memory"),
                (GRAPH_MIN_SCALE_ANNOTATION, "2"),
                (GRAPH_MAX_SCALE_ANNOTATION, "7"),
            ],
        ));

        assert_eq!(
            overlay,
            ScalingOverlay {
                is_graph: true,
                graph_target: Some(40),
                graph_metric: Some("memory".into()),
                graph_min_scale: Some(2),
                graph_max_scale: Some(7),
                target_utilization: None,
            }
        );
    }

    #[test]
    fn test_unparsable_values_dropped() {
        let overlay = ScalingOverlay::decode(&meta(
            &[],
            &[
                (GRAPH_TARGET_ANNOTATION, "forty"),
                (GRAPH_MIN_SCALE_ANNOTATION, " 2"),
                (GRAPH_MAX_SCALE_ANNOTATION, "99999999999"),
                (TARGET_UTILIZATION_ANNOTATION, "75"),
            ],
        ));

        assert!(!overlay.is_graph);
        assert_eq!(overlay.graph_target, None);
        assert_eq!(overlay.graph_min_scale, None);
        assert_eq!(overlay.graph_max_scale, None);
        assert_eq!(overlay.target_utilization, Some(75));
    }

    #[test]
    fn test_absent_maps() {
        let overlay = ScalingOverlay::decode(&ObjectMeta::default());
        assert_eq!(overlay, ScalingOverlay::default());
    }
}
