//! Cluster object API
//!
//! The controller reaches the platform only through [`ObjectApi`]: get by
//! namespace/name, create and update. Transport, retries and timeouts belong
//! to the implementation behind the trait.

mod memory;

pub use memory::{InMemoryCluster, StoredObject};

use crate::error::ClusterResult;
use async_trait::async_trait;

/// Typed access to one kind of namespaced object
#[async_trait]
pub trait ObjectApi<K>: Send + Sync
where
    K: Send + Sync + 'static,
{
    /// Fetch an object; a missing object is `ClusterError::NotFound`
    async fn get(&self, namespace: &str, name: &str) -> ClusterResult<K>;

    /// Create an object and return it as stored
    async fn create(&self, object: &K) -> ClusterResult<K>;

    /// Replace an existing object and return it as stored
    async fn update(&self, object: &K) -> ClusterResult<K>;
}
