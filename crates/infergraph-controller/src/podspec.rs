//! Process spec for the graph router
//!
//! The router runs as a single container that receives the whole graph as
//! JSON on its command line. The JSON is the compact serialization of the
//! graph spec, which is stable for an unchanged spec, so repeated passes
//! produce byte-identical arguments and the workload comparison stays quiet.

use crate::error::PodSpecError;
use crate::resources::container_requirements;
use infergraph_types::constants::{GRAPH_JSON_FLAG, PROPAGATE_HEADERS_ENV};
use infergraph_types::{InferenceGraph, RouterConfig};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec};

/// Build the router pod spec for `graph`
///
/// Fails when the graph spec cannot be serialized or a router quantity is invalid;
/// both are configuration errors for this pass.
pub fn build_pod_spec(graph: &InferenceGraph, router: &RouterConfig) -> Result<PodSpec, PodSpecError> {
    let graph_json = serde_json::to_string(&graph.spec)?;
    let resources = container_requirements(&graph.spec, router)?;

    // Only set when forwarding is configured; an absent list and an empty
    // value mean different things to the router.
    let env = router.propagated_headers().map(|headers| {
        vec![EnvVar {
            name: PROPAGATE_HEADERS_ENV.to_string(),
            value: Some(headers.join(",")),
            ..Default::default()
        }]
    });

    Ok(PodSpec {
        containers: vec![Container {
            name: graph.name().to_string(),
            image: Some(router.image.clone()),
            args: Some(vec![GRAPH_JSON_FLAG.to_string(), graph_json]),
            env,
            resources: Some(resources),
            ..Default::default()
        }],
        affinity: graph.spec.affinity.clone(),
        ..Default::default()
    })
}
