//! In-memory object store
//!
//! Behaves like an API server for the parts the controller depends on: it
//! assigns uid, resourceVersion and generation, rejects duplicate creates,
//! enforces optimistic concurrency on update and keeps status out of reach of
//! plain updates. Used for development, the render tool and tests.

use super::ObjectApi;
use crate::error::{ClusterError, ClusterResult};
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::{Metadata, NamespaceResourceScope, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

type ObjectKey = (&'static str, &'static str, String, String);

/// In-memory cluster for development and testing
#[derive(Debug, Clone, Default)]
pub struct InMemoryCluster {
    objects: Arc<RwLock<HashMap<ObjectKey, Value>>>,
    revision: Arc<AtomicU64>,
    writes: Arc<AtomicU64>,
}

impl InMemoryCluster {
    /// Create an empty cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of create and update calls that succeeded
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Change a stored object in place, status included
    ///
    /// Stands in for other controllers (for example the workload controller
    /// reporting availability). Not counted as a write.
    pub async fn modify<K, F>(&self, namespace: &str, name: &str, f: F) -> ClusterResult<K>
    where
        K: StoredObject,
        F: FnOnce(&mut K) + Send,
    {
        let key = key_of::<K>(namespace, name);
        let mut objects = self.objects.write().await;
        let value = objects.get(&key).ok_or_else(|| not_found::<K>(namespace, name))?;

        let mut object: K = decode(value.clone())?;
        f(&mut object);
        object.metadata_mut().resource_version = Some(self.next_revision());

        objects.insert(key, encode(&object)?);
        Ok(object)
    }

    fn next_revision(&self) -> String {
        (self.revision.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

/// Objects the in-memory cluster can hold
pub trait StoredObject:
    Resource<Scope = NamespaceResourceScope>
    + Metadata<Ty = ObjectMeta>
    + Serialize
    + DeserializeOwned
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<K> StoredObject for K where
    K: Resource<Scope = NamespaceResourceScope>
        + Metadata<Ty = ObjectMeta>
        + Serialize
        + DeserializeOwned
        + Clone
        + Send
        + Sync
        + 'static
{
}

fn key_of<K: StoredObject>(namespace: &str, name: &str) -> ObjectKey {
    (K::API_VERSION, K::KIND, namespace.to_string(), name.to_string())
}

fn not_found<K: StoredObject>(namespace: &str, name: &str) -> ClusterError {
    ClusterError::NotFound {
        kind: K::KIND.to_string(),
        namespace: namespace.to_string(),
        name: name.to_string(),
    }
}

fn encode<K: StoredObject>(object: &K) -> ClusterResult<Value> {
    serde_json::to_value(object).map_err(|e| ClusterError::Invalid(e.to_string()))
}

fn decode<K: StoredObject>(value: Value) -> ClusterResult<K> {
    serde_json::from_value(value).map_err(|e| ClusterError::Invalid(e.to_string()))
}

fn identity<K: StoredObject>(object: &K) -> ClusterResult<(String, String)> {
    let meta = object.metadata();
    match (meta.namespace.as_deref(), meta.name.as_deref()) {
        (Some(ns), Some(name)) if !ns.is_empty() && !name.is_empty() => {
            Ok((ns.to_string(), name.to_string()))
        }
        _ => Err(ClusterError::Invalid(format!(
            "{} requires metadata.namespace and metadata.name",
            K::KIND
        ))),
    }
}

#[async_trait]
impl<K> ObjectApi<K> for InMemoryCluster
where
    K: StoredObject,
{
    async fn get(&self, namespace: &str, name: &str) -> ClusterResult<K> {
        let objects = self.objects.read().await;
        let value = objects
            .get(&key_of::<K>(namespace, name))
            .ok_or_else(|| not_found::<K>(namespace, name))?;
        decode(value.clone())
    }

    async fn create(&self, object: &K) -> ClusterResult<K> {
        let (namespace, name) = identity(object)?;
        let key = key_of::<K>(&namespace, &name);

        let mut objects = self.objects.write().await;
        if objects.contains_key(&key) {
            return Err(ClusterError::AlreadyExists {
                kind: K::KIND.to_string(),
                namespace,
                name,
            });
        }

        let mut stored = object.clone();
        let meta = stored.metadata_mut();
        meta.uid = Some(Uuid::new_v4().to_string());
        meta.resource_version = Some(self.next_revision());
        meta.generation = Some(1);

        objects.insert(key, encode(&stored)?);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn update(&self, object: &K) -> ClusterResult<K> {
        let (namespace, name) = identity(object)?;
        let key = key_of::<K>(&namespace, &name);

        let mut objects = self.objects.write().await;
        let existing_value = objects
            .get(&key)
            .ok_or_else(|| not_found::<K>(&namespace, &name))?;
        let existing: K = decode(existing_value.clone())?;
        let existing_meta = existing.metadata();

        if let Some(version) = object.metadata().resource_version.as_deref() {
            if existing_meta.resource_version.as_deref() != Some(version) {
                return Err(ClusterError::Conflict(format!(
                    "{} {}/{} was modified (resourceVersion {} is stale)",
                    K::KIND,
                    namespace,
                    name,
                    version
                )));
            }
        }

        let mut next = encode(object)?;
        let spec_changed = next.get("spec") != existing_value.get("spec");

        // Status is owned by other writers; plain updates leave it alone.
        if let Some(fields) = next.as_object_mut() {
            match existing_value.get("status") {
                Some(status) => fields.insert("status".to_string(), status.clone()),
                None => fields.remove("status"),
            };
        }

        let mut stored: K = decode(next)?;
        let generation = existing_meta.generation.unwrap_or(1);
        let meta = stored.metadata_mut();
        meta.uid = existing.metadata().uid.clone();
        meta.resource_version = Some(self.next_revision());
        meta.generation = Some(if spec_changed { generation + 1 } else { generation });

        objects.insert(key, encode(&stored)?);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }
}
