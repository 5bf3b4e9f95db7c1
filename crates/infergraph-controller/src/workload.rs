//! Router workload (Deployment)

use crate::converge::{merge_identity, Convergent};
use infergraph_types::constants::APP_LABEL;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use std::collections::BTreeMap;

/// Selector value for the workload of `name`
pub fn app_label_value(name: &str) -> String {
    format!("isvc.{name}")
}

/// Wrap the router pod spec in a Deployment carrying `identity`
///
/// Replicas are left unset; the scaling policy owns them.
pub fn build_deployment(identity: &ObjectMeta, pod_spec: PodSpec) -> Deployment {
    let name = identity.name.clone().unwrap_or_default();
    let selector = BTreeMap::from([(APP_LABEL.to_string(), app_label_value(&name))]);

    let mut labels = identity.labels.clone().unwrap_or_default();
    labels.extend(selector.clone());

    let mut metadata = identity.clone();
    metadata.labels = Some(labels.clone());

    Deployment {
        metadata,
        spec: Some(DeploymentSpec {
            selector: LabelSelector {
                match_labels: Some(selector),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    annotations: Some(identity.annotations.clone().unwrap_or_default()),
                    ..Default::default()
                }),
                spec: Some(pod_spec),
            },
            ..Default::default()
        }),
        status: None,
    }
}

impl Convergent for Deployment {
    /// Selector, pod template and (when set) strategy. Replicas are excluded
    /// because the autoscaler changes them.
    fn spec_matches(desired: &Self, live: &Self) -> bool {
        match (desired.spec.as_ref(), live.spec.as_ref()) {
            (Some(d), Some(l)) => {
                d.selector == l.selector
                    && d.template == l.template
                    && (d.strategy.is_none() || d.strategy == l.strategy)
            }
            (None, None) => true,
            _ => false,
        }
    }

    fn merge_onto(desired: &Self, mut live: Self) -> Self {
        merge_identity(&desired.metadata, &mut live.metadata);

        let live_replicas = live.spec.as_ref().and_then(|s| s.replicas);
        let mut spec = desired.spec.clone();
        if let Some(spec) = spec.as_mut() {
            if spec.replicas.is_none() {
                spec.replicas = live_replicas;
            }
        }
        live.spec = spec;
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::build_identity;
    use k8s_openapi::api::core::v1::Container;

    fn pod(image: &str) -> PodSpec {
        PodSpec {
            containers: vec![Container {
                name: "ig".into(),
                image: Some(image.into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_deployment_shape() {
        let identity = build_identity("ig", "ns", None, None);
        let deployment = build_deployment(&identity, pod("router:v1"));

        let labels = deployment.metadata.labels.as_ref().unwrap();
        assert_eq!(labels["app"], "isvc.ig");
        assert_eq!(labels["serving.kserve.io/inferencegraph"], "ig");

        let spec = deployment.spec.as_ref().unwrap();
        assert_eq!(spec.replicas, None);
        assert_eq!(
            spec.selector.match_labels,
            Some(BTreeMap::from([("app".to_string(), "isvc.ig".to_string())]))
        );
        assert_eq!(spec.template.spec, Some(pod("router:v1")));
        assert_eq!(
            spec.template.metadata.as_ref().unwrap().labels.as_ref(),
            Some(labels)
        );
    }

    #[test]
    fn test_replicas_and_metadata_do_not_count_as_drift() {
        let identity = build_identity("ig", "ns", None, None);
        let desired = build_deployment(&identity, pod("router:v1"));

        let mut live = desired.clone();
        live.metadata.resource_version = Some("42".into());
        live.metadata.uid = Some("abc".into());
        live.spec.as_mut().unwrap().replicas = Some(4);

        assert!(Deployment::spec_matches(&desired, &live));
    }

    #[test]
    fn test_image_change_is_drift() {
        let identity = build_identity("ig", "ns", None, None);
        let desired = build_deployment(&identity, pod("router:v2"));
        let live = build_deployment(&identity, pod("router:v1"));

        assert!(!Deployment::spec_matches(&desired, &live));
    }

    #[test]
    fn test_merge_keeps_live_identity_and_replicas() {
        let identity = build_identity("ig", "ns", None, None);
        let desired = build_deployment(&identity, pod("router:v2"));

        let mut live = build_deployment(&identity, pod("router:v1"));
        live.metadata.resource_version = Some("7".into());
        live.metadata.uid = Some("uid-1".into());
        live.spec.as_mut().unwrap().replicas = Some(3);

        let merged = Deployment::merge_onto(&desired, live);
        assert_eq!(merged.metadata.resource_version.as_deref(), Some("7"));
        assert_eq!(merged.metadata.uid.as_deref(), Some("uid-1"));
        let spec = merged.spec.unwrap();
        assert_eq!(spec.replicas, Some(3));
        assert_eq!(spec.template.spec, Some(pod("router:v2")));
    }
}
