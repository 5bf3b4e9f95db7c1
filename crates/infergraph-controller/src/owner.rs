//! Controller owner references
//!
//! Derived objects name the graph as their controlling owner so that the
//! cluster deletes them together with it.

use crate::error::OwnerRefError;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use k8s_openapi::{Metadata, Resource};

/// Build the controller reference pointing at `owner`
pub fn controller_reference<O>(owner: &O) -> Result<OwnerReference, OwnerRefError>
where
    O: Resource + Metadata<Ty = ObjectMeta>,
{
    let meta = owner.metadata();
    let name = meta.name.clone().unwrap_or_default();
    let uid = meta
        .uid
        .clone()
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| OwnerRefError::MissingUid {
            kind: O::KIND,
            name: name.clone(),
        })?;

    Ok(OwnerReference {
        api_version: O::API_VERSION.to_string(),
        kind: O::KIND.to_string(),
        name,
        uid,
        controller: Some(true),
        block_owner_deletion: Some(true),
    })
}

/// Make `owner` the controller of `object`
///
/// Re-attaching the same owner replaces its entry, so repeated passes leave a
/// single reference behind.
pub fn set_controller_reference<O, K>(owner: &O, object: &mut K) -> Result<(), OwnerRefError>
where
    O: Resource + Metadata<Ty = ObjectMeta>,
    K: Metadata<Ty = ObjectMeta>,
{
    let reference = controller_reference(owner)?;
    let owner_namespace = owner.metadata().namespace.clone().unwrap_or_default();
    let meta = object.metadata_mut();

    let object_namespace = meta.namespace.clone().unwrap_or_default();
    if owner_namespace != object_namespace {
        return Err(OwnerRefError::CrossNamespace {
            owner_namespace,
            object_namespace,
        });
    }

    let references = meta.owner_references.get_or_insert_with(Vec::new);
    if let Some(other) = references
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != reference.uid)
    {
        return Err(OwnerRefError::AlreadyOwned {
            kind: other.kind.clone(),
            name: other.name.clone(),
        });
    }

    references.retain(|r| r.uid != reference.uid);
    references.push(reference);
    Ok(())
}
