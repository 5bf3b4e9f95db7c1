//! Single-pass reconciliation of an inference graph
//!
//! Each call derives the workload and scaling policy from the graph as it is
//! now, converges both against the cluster and folds workload health back
//! into the graph status. Nothing is remembered between calls; the caller's
//! work queue decides when to run again and serializes passes per graph.

use crate::cluster::ObjectApi;
use crate::config::ControllerConfig;
use crate::converge::{converge, ConvergeAction};
use crate::error::{ReconcileError, Result};
use crate::metadata::build_identity;
use crate::owner::set_controller_reference;
use crate::podspec::build_pod_spec;
use crate::scaling;
use crate::status::propagate_raw_status;
use crate::workload::build_deployment;
use infergraph_types::{AutoscalerClass, ComponentExtensionSpec, DeploymentMode, InferenceGraph};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::Resource;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// Outcome of one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileReport {
    /// Converged the workload and, unless scaling is external, the policy
    Reconciled {
        workload: ConvergeAction,
        scaling_policy: Option<ConvergeAction>,
        ready: bool,
    },
    /// Left to another controller
    Skipped { mode: DeploymentMode },
}

/// Reconciles inference graphs in raw deployment mode
pub struct GraphReconciler<C> {
    client: Arc<C>,
    config: Arc<ControllerConfig>,
}

impl<C> Clone for GraphReconciler<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C> GraphReconciler<C>
where
    C: ObjectApi<Deployment> + ObjectApi<HorizontalPodAutoscaler>,
{
    pub fn new(client: Arc<C>, config: Arc<ControllerConfig>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Run one pass for `graph`, updating its status in place
    pub async fn reconcile(&self, graph: &mut InferenceGraph) -> Result<ReconcileReport> {
        let span = info_span!(
            "reconcile",
            name = %graph.name(),
            namespace = %graph.namespace()
        );
        self.reconcile_pass(graph).instrument(span).await
    }

    async fn reconcile_pass(&self, graph: &mut InferenceGraph) -> Result<ReconcileReport> {
        if graph.name().is_empty() {
            return Err(ReconcileError::MissingIdentity { field: "name" });
        }
        if graph.namespace().is_empty() {
            return Err(ReconcileError::MissingIdentity { field: "namespace" });
        }

        let annotations = graph.metadata.annotations.as_ref();
        let mode = DeploymentMode::from_annotations(annotations)
            .unwrap_or(self.config.default_deployment_mode);
        if mode != DeploymentMode::RawDeployment {
            info!(%mode, "deployment mode not handled here, skipping");
            return Ok(ReconcileReport::Skipped { mode });
        }
        let autoscaler = AutoscalerClass::from_annotations(annotations);

        graph.spec.validate()?;
        let pod_spec = build_pod_spec(graph, &self.config.router)?;

        let identity = build_identity(
            graph.name(),
            graph.namespace(),
            graph.metadata.annotations.clone(),
            graph.metadata.labels.clone(),
        );

        let mut workload = build_deployment(&identity, pod_spec);
        set_controller_reference(&*graph, &mut workload).map_err(|source| {
            ReconcileError::OwnerReference {
                kind: Deployment::KIND,
                source,
            }
        })?;

        let mut policy = match autoscaler {
            AutoscalerClass::Hpa => {
                let resolved = scaling::resolve(&identity, &ComponentExtensionSpec::default());
                Some(resolved.to_autoscaler(&identity))
            }
            AutoscalerClass::External => None,
        };
        if let Some(policy) = policy.as_mut() {
            set_controller_reference(&*graph, policy).map_err(|source| {
                ReconcileError::OwnerReference {
                    kind: HorizontalPodAutoscaler::KIND,
                    source,
                }
            })?;
        }

        let workload = converge(self.client.as_ref(), &workload)
            .await
            .map_err(ReconcileError::Workload)?;

        let scaling_policy = match policy {
            Some(policy) => Some(
                converge(self.client.as_ref(), &policy)
                    .await
                    .map_err(ReconcileError::ScalingPolicy)?
                    .action,
            ),
            None => None,
        };

        let url = self.config.graph_url(graph.name(), graph.namespace());
        let status = graph.status_mut();
        propagate_raw_status(status, &workload.object, &url);
        let ready = status.is_ready();

        info!(
            workload = %workload.action,
            scaling_policy = ?scaling_policy,
            ready,
            "reconciled inference graph"
        );

        Ok(ReconcileReport::Reconciled {
            workload: workload.action,
            scaling_policy,
            ready,
        })
    }
}
