//! Identity block construction
//!
//! Every derived object carries the graph's name and namespace plus the graph
//! identity label. Label and annotation maps are always present (possibly
//! empty) so that derived objects compare equal pass after pass.

use infergraph_types::constants::INFERENCE_GRAPH_LABEL;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Build the identity block for objects derived from graph `name`
///
/// The identity label is always set to `name`, replacing any caller value for
/// that key.
pub fn build_identity(
    name: &str,
    namespace: &str,
    annotations: Option<BTreeMap<String, String>>,
    labels: Option<BTreeMap<String, String>>,
) -> ObjectMeta {
    debug_assert!(!name.is_empty(), "identity name must not be empty");
    debug_assert!(!namespace.is_empty(), "identity namespace must not be empty");

    let annotations = annotations.unwrap_or_default();
    let mut labels = labels.unwrap_or_default();
    labels.insert(INFERENCE_GRAPH_LABEL.to_string(), name.to_string());

    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        labels: Some(labels),
        annotations: Some(annotations),
        ..Default::default()
    }
}
