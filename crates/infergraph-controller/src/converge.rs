//! Convergence engine
//!
//! One procedure brings any derived object in line with its desired form:
//!
//! 1. **Observe**: fetch the live object. Not-found means `Create`; any other
//!    error aborts the pass untouched.
//! 2. **Compare**: only the kind-specific spec fields, never server-managed
//!    metadata or status. Equal means `NoOp`, otherwise `Update`.
//! 3. **Act**: a single exhaustive dispatch on the [`Decision`].
//!
//! Write failures are returned as-is; retrying is the caller's business.

use crate::cluster::ObjectApi;
use crate::error::{ClusterError, ConvergeError};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::{Metadata, Resource};
use std::fmt;
use tracing::{debug, info};

/// A derived object kind the engine can converge
pub trait Convergent: Resource + Metadata<Ty = ObjectMeta> + Clone + Send + Sync + 'static {
    /// Whether the live object already carries the desired spec
    fn spec_matches(desired: &Self, live: &Self) -> bool;

    /// The desired spec placed on the live object's identity
    fn merge_onto(desired: &Self, live: Self) -> Self;
}

/// Outcome of the observe/compare steps
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<K> {
    Create,
    Update { live: K },
    NoOp { live: K },
}

impl<K> Decision<K> {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Create => "create",
            Decision::Update { .. } => "update",
            Decision::NoOp { .. } => "noop",
        }
    }
}

/// What the act step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergeAction {
    Created,
    Updated,
    Unchanged,
}

impl fmt::Display for ConvergeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergeAction::Created => write!(f, "created"),
            ConvergeAction::Updated => write!(f, "updated"),
            ConvergeAction::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// A converged object and how it got there
#[derive(Debug, Clone, PartialEq)]
pub struct Converged<K> {
    pub action: ConvergeAction,
    pub object: K,
}

fn object_key<K: Convergent>(object: &K) -> (String, String) {
    let meta = object.metadata();
    (
        meta.namespace.clone().unwrap_or_default(),
        meta.name.clone().unwrap_or_default(),
    )
}

/// Copy the metadata this controller owns from `desired` onto `live`
///
/// Name, uid, resourceVersion and generation stay as the server set them.
/// Owner references are merged by uid: entries added by other actors are
/// kept, entries for owners named in `desired` are replaced.
pub fn merge_identity(desired: &ObjectMeta, live: &mut ObjectMeta) {
    live.labels = desired.labels.clone();
    live.annotations = desired.annotations.clone();

    if let Some(owned) = desired.owner_references.as_ref() {
        let references = live.owner_references.get_or_insert_with(Vec::new);
        references.retain(|r| owned.iter().all(|o| o.uid != r.uid));
        references.extend(owned.iter().cloned());
    }
}

/// Observe the live object and decide what to do
pub async fn observe<K, A>(api: &A, desired: &K) -> Result<Decision<K>, ConvergeError>
where
    K: Convergent,
    A: ObjectApi<K> + ?Sized,
{
    let (namespace, name) = object_key(desired);

    let live = match api.get(&namespace, &name).await {
        Ok(live) => live,
        Err(ClusterError::NotFound { .. }) => return Ok(Decision::Create),
        Err(source) => {
            return Err(ConvergeError::Observe {
                kind: K::KIND,
                namespace,
                name,
                source,
            })
        }
    };

    if K::spec_matches(desired, &live) {
        Ok(Decision::NoOp { live })
    } else {
        Ok(Decision::Update { live })
    }
}

/// Bring the live object in line with `desired`
pub async fn converge<K, A>(api: &A, desired: &K) -> Result<Converged<K>, ConvergeError>
where
    K: Convergent,
    A: ObjectApi<K> + ?Sized,
{
    let decision = observe(api, desired).await?;
    let (namespace, name) = object_key(desired);

    info!(
        kind = K::KIND,
        namespace = %namespace,
        name = %name,
        decision = decision.label(),
        "convergence decision"
    );

    match decision {
        Decision::Create => {
            let object = api.create(desired).await.map_err(|source| ConvergeError::Create {
                kind: K::KIND,
                namespace,
                name,
                source,
            })?;
            Ok(Converged {
                action: ConvergeAction::Created,
                object,
            })
        }
        Decision::Update { live } => {
            let merged = K::merge_onto(desired, live);
            let object = api.update(&merged).await.map_err(|source| ConvergeError::Update {
                kind: K::KIND,
                namespace,
                name,
                source,
            })?;
            Ok(Converged {
                action: ConvergeAction::Updated,
                object,
            })
        }
        Decision::NoOp { live } => {
            debug!(kind = K::KIND, "live spec matches desired spec");
            Ok(Converged {
                action: ConvergeAction::Unchanged,
                object: live,
            })
        }
    }
}
