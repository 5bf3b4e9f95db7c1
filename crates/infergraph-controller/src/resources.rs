//! Resource requirements for the router container

use crate::error::PodSpecError;
use infergraph_types::{InferenceGraphSpec, RouterConfig};
use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

// <signedNumber><suffix>, suffix being a binary SI unit, a decimal SI unit or
// a decimal exponent.
static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[KMGTPE]i|[numkMGTPE]|[eE][+-]?[0-9]+)?$")
        .expect("quantity pattern is valid")
});

/// Parse a resource quantity string such as `100m` or `500Mi`
///
/// Negative amounts are rejected since they are never valid for container
/// resources.
pub fn parse_quantity(field: &'static str, value: &str) -> Result<Quantity, PodSpecError> {
    if !QUANTITY.is_match(value) || value.starts_with('-') {
        return Err(PodSpecError::Quantity {
            field,
            value: value.to_string(),
        });
    }
    Ok(Quantity(value.to_string()))
}

/// Default limits and requests from the router config
pub fn router_requirements(router: &RouterConfig) -> Result<ResourceRequirements, PodSpecError> {
    let limits = BTreeMap::from([
        ("cpu".to_string(), parse_quantity("cpuLimit", &router.cpu_limit)?),
        ("memory".to_string(), parse_quantity("memoryLimit", &router.memory_limit)?),
    ]);
    let requests = BTreeMap::from([
        ("cpu".to_string(), parse_quantity("cpuRequest", &router.cpu_request)?),
        ("memory".to_string(), parse_quantity("memoryRequest", &router.memory_request)?),
    ]);

    Ok(ResourceRequirements {
        limits: Some(limits),
        requests: Some(requests),
        ..Default::default()
    })
}

/// Requirements for the router container of `spec`
///
/// Requirements declared on the graph win; otherwise the router defaults
/// apply. Router defaults are validated either way so a broken router config
/// surfaces on every graph, not only on graphs that happen to use it.
pub fn container_requirements(
    spec: &InferenceGraphSpec,
    router: &RouterConfig,
) -> Result<ResourceRequirements, PodSpecError> {
    let defaults = router_requirements(router)?;
    if is_unset(&spec.resources) {
        Ok(defaults)
    } else {
        Ok(spec.resources.clone())
    }
}

fn is_unset(resources: &ResourceRequirements) -> bool {
    resources.limits.as_ref().map_or(true, BTreeMap::is_empty)
        && resources.requests.as_ref().map_or(true, BTreeMap::is_empty)
        && resources.claims.as_ref().map_or(true, Vec::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_quantities() {
        for q in ["100m", "1", "0.5", ".5", "500Mi", "1Gi", "2e3", "1E", "128974848", "+1k"] {
            assert!(parse_quantity("cpuLimit", q).is_ok(), "{q} should parse");
        }
    }

    #[test]
    fn test_invalid_quantities() {
        for q in ["", "abc", "100 m", "1Mb", "-1", "1.2.3", "Mi", "1ii"] {
            assert!(
                matches!(
                    parse_quantity("memoryLimit", q),
                    Err(PodSpecError::Quantity { field: "memoryLimit", .. })
                ),
                "{q} should be rejected"
            );
        }
    }

    #[test]
    fn test_router_requirements() {
        let router = RouterConfig {
            image: "router:v1".into(),
            cpu_request: "100m".into(),
            cpu_limit: "100m".into(),
            memory_request: "100Mi".into(),
            memory_limit: "500Mi".into(),
            headers: BTreeMap::new(),
        };
        let reqs = router_requirements(&router).unwrap();
        let limits = reqs.limits.unwrap();
        let requests = reqs.requests.unwrap();
        assert_eq!(limits["cpu"], Quantity("100m".into()));
        assert_eq!(limits["memory"], Quantity("500Mi".into()));
        assert_eq!(requests["memory"], Quantity("100Mi".into()));
        assert!(reqs.claims.is_none());
    }

    #[test]
    fn test_graph_requirements_win() {
        let mut spec = InferenceGraphSpec::default();
        spec.resources.limits = Some(BTreeMap::from([(
            "cpu".to_string(),
            Quantity("2".into()),
        )]));

        let reqs = container_requirements(&spec, &RouterConfig::default()).unwrap();
        assert_eq!(reqs, spec.resources);
    }

    #[test]
    fn test_bad_router_quantity_is_reported() {
        let router = RouterConfig {
            cpu_request: "lots".into(),
            ..RouterConfig::default()
        };
        let err = container_requirements(&InferenceGraphSpec::default(), &router).unwrap_err();
        assert!(matches!(
            err,
            PodSpecError::Quantity { field: "cpuRequest", ref value } if value == "lots"
        ));
    }
}
