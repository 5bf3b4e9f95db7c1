//! infergraph-render - run the reconciler offline
//!
//! Reconciles one inference graph manifest against an in-memory cluster and
//! prints what each pass did, followed by the derived Deployment,
//! HorizontalPodAutoscaler and the resulting graph status as YAML. Running
//! more than one pass shows whether the derived objects are stable.

use anyhow::{bail, Context};
use clap::Parser;
use infergraph_controller::{
    telemetry, ControllerConfig, GraphReconciler, InMemoryCluster, ObjectApi, ReconcileReport,
};
use infergraph_types::{InferenceGraph, RouterConfig};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentCondition, DeploymentStatus};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Inference graph render tool
#[derive(Parser)]
#[command(name = "infergraph-render")]
#[command(about = "Reconcile an inference graph against an in-memory cluster", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "INFERGRAPH_CONFIG")]
    config: Option<String>,

    /// Inference graph manifest (YAML or JSON)
    #[arg(short, long)]
    graph: PathBuf,

    /// Router configuration JSON, overriding the configured router
    #[arg(short, long)]
    router_config: Option<PathBuf>,

    /// Number of reconciliation passes
    #[arg(short, long, default_value_t = 2)]
    passes: u32,

    /// Report the workload as available after each pass
    #[arg(long)]
    mark_available: bool,

    /// Log level
    #[arg(long, env = "INFERGRAPH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "INFERGRAPH_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config =
        ControllerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Override with CLI args
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    if let Some(path) = &cli.router_config {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        config.router = RouterConfig::from_json(&json).context("invalid router configuration")?;
    }

    telemetry::init(&config.logging).context("failed to initialize logging")?;

    if cli.passes == 0 {
        bail!("--passes must be at least 1");
    }

    let mut graph = read_graph(&cli.graph)?;
    let namespace = graph.namespace().to_string();
    let name = graph.name().to_string();

    let cluster = Arc::new(InMemoryCluster::new());
    let reconciler = GraphReconciler::new(cluster.clone(), Arc::new(config));

    for pass in 1..=cli.passes {
        let report = reconciler
            .reconcile(&mut graph)
            .await
            .with_context(|| format!("pass {pass} failed"))?;

        match report {
            ReconcileReport::Reconciled {
                workload,
                scaling_policy,
                ready,
            } => {
                let policy = scaling_policy.map_or("skipped".to_string(), |a| a.to_string());
                println!("# pass {pass}: workload {workload}, scaling policy {policy}, ready {ready}");
            }
            ReconcileReport::Skipped { mode } => {
                println!("# pass {pass}: skipped, deployment mode {mode}");
                return Ok(());
            }
        }

        if cli.mark_available {
            mark_available(&cluster, &namespace, &name).await?;
        }
    }

    let deployment: Deployment = ObjectApi::<Deployment>::get(cluster.as_ref(), &namespace, &name)
        .await
        .context("workload missing after reconciliation")?;
    print_document(&deployment)?;

    match ObjectApi::<HorizontalPodAutoscaler>::get(cluster.as_ref(), &namespace, &name).await {
        Ok(policy) => print_document(&policy)?,
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e).context("failed to read scaling policy"),
    }

    print_document(&graph)?;
    Ok(())
}

/// Parse the manifest, filling in what an API server would have assigned
fn read_graph(path: &Path) -> anyhow::Result<InferenceGraph> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut graph: InferenceGraph = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    if graph.name().is_empty() {
        bail!("{}: metadata.name is required", path.display());
    }
    if graph.namespace().is_empty() {
        graph.metadata.namespace = Some("default".to_string());
    }
    if graph.metadata.uid.is_none() {
        graph.metadata.uid = Some(uuid::Uuid::new_v4().to_string());
    }
    graph.metadata.generation.get_or_insert(1);
    Ok(graph)
}

/// Stand in for the workload controller reporting a rolled-out Deployment
async fn mark_available(
    cluster: &InMemoryCluster,
    namespace: &str,
    name: &str,
) -> anyhow::Result<()> {
    cluster
        .modify(namespace, name, |deployment: &mut Deployment| {
            deployment.status = Some(DeploymentStatus {
                observed_generation: deployment.metadata.generation,
                conditions: Some(vec![DeploymentCondition {
                    type_: "Available".to_string(),
                    status: "True".to_string(),
                    reason: Some("MinimumReplicasAvailable".to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            });
        })
        .await
        .context("failed to mark workload available")?;
    Ok(())
}

fn print_document<T: serde::Serialize>(object: &T) -> anyhow::Result<()> {
    println!("---");
    print!("{}", serde_yaml::to_string(object)?);
    Ok(())
}
