//! Workload health to graph status

use infergraph_types::status::CONDITION_READY;
use infergraph_types::{ConditionStatus, GraphCondition, InferenceGraphStatus};
use k8s_openapi::api::apps::v1::Deployment;
use tracing::debug;

/// Workload condition type that marks the graph ready
pub const WORKLOAD_AVAILABLE: &str = "Available";

/// Copy workload health onto the graph status
///
/// The first `Available` condition sets `url` and a single `Ready=True`
/// condition; later ones are ignored. `observedGeneration` is copied whether
/// or not one was found.
pub fn propagate_raw_status(status: &mut InferenceGraphStatus, workload: &Deployment, url: &str) {
    let observed = workload.status.as_ref();

    let available = observed
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == WORKLOAD_AVAILABLE));

    if available.is_some() {
        let previous = status
            .condition(CONDITION_READY)
            .filter(|c| c.status == ConditionStatus::True)
            .and_then(|c| c.last_transition_time);

        let mut ready = GraphCondition::ready();
        if previous.is_some() {
            ready.last_transition_time = previous;
        }

        status.url = Some(url.to_string());
        status.set_conditions(vec![ready]);
    } else {
        debug!(url, "workload has no available condition yet");
    }

    status.observed_generation = observed.and_then(|s| s.observed_generation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use k8s_openapi::api::apps::v1::{DeploymentCondition, DeploymentStatus};

    fn condition(type_: &str, status: &str) -> DeploymentCondition {
        DeploymentCondition {
            type_: type_.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    fn workload(conditions: Vec<DeploymentCondition>, generation: i64) -> Deployment {
        Deployment {
            status: Some(DeploymentStatus {
                conditions: Some(conditions),
                observed_generation: Some(generation),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_available_sets_ready_and_url() {
        let mut status = InferenceGraphStatus::default();
        propagate_raw_status(
            &mut status,
            &workload(vec![condition("Progressing", "True"), condition("Available", "True")], 2),
            "http://ig-ns.example.com",
        );

        assert!(status.is_ready());
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.url.as_deref(), Some("http://ig-ns.example.com"));
        assert_eq!(status.observed_generation, Some(2));
    }

    #[test]
    fn test_first_available_wins() {
        let mut status = InferenceGraphStatus::default();
        propagate_raw_status(
            &mut status,
            &workload(vec![condition("Available", "True"), condition("Available", "False")], 1),
            "http://ig-ns.example.com",
        );

        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.conditions[0].type_, "Ready");
    }

    #[test]
    fn test_generation_copied_without_available() {
        let mut status = InferenceGraphStatus::default();
        propagate_raw_status(
            &mut status,
            &workload(vec![condition("Progressing", "True")], 5),
            "http://ig-ns.example.com",
        );

        assert!(!status.is_ready());
        assert_eq!(status.url, None);
        assert_eq!(status.observed_generation, Some(5));
    }

    #[test]
    fn test_no_workload_status() {
        let mut status = InferenceGraphStatus {
            observed_generation: Some(9),
            ..Default::default()
        };
        propagate_raw_status(&mut status, &Deployment::default(), "http://x");
        assert_eq!(status.observed_generation, None);
        assert!(status.conditions.is_empty());
    }

    #[test]
    fn test_ready_transition_time_kept() {
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut earlier = GraphCondition::ready();
        earlier.last_transition_time = Some(since);
        let mut status = InferenceGraphStatus {
            conditions: vec![earlier],
            ..Default::default()
        };

        propagate_raw_status(
            &mut status,
            &workload(vec![condition("Available", "True")], 1),
            "http://x",
        );
        assert_eq!(status.conditions[0].last_transition_time, Some(since));
    }
}
