// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic finalizer management for namespaced Kubernetes resources.
//!
//! A `VirtualMachine` only carries a deletion marker the controller can act on
//! while a finalizer holds it. The finalizer is added before the VM is created
//! and removed once the backend delete succeeded.
//!
//! # Example
//!
//! ```rust,ignore
//! use nutanix_provider::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
//! use nutanix_provider::labels::FINALIZER_VIRTUAL_MACHINE;
//!
//! async fn reconcile(client: Client, vm: VirtualMachine) -> Result<(), kube::Error> {
//!     if vm.metadata.deletion_timestamp.is_some() {
//!         // delete the backend VM, then:
//!         return remove_finalizer(&client, &vm, FINALIZER_VIRTUAL_MACHINE).await;
//!     }
//!     ensure_finalizer(&client, &vm, FINALIZER_VIRTUAL_MACHINE).await
//! }
//! ```

use kube::api::{Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::info;

/// Whether `finalizer` is present on the resource.
#[must_use]
pub fn has_finalizer<T: Resource>(resource: &T, finalizer: &str) -> bool {
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|existing| existing == finalizer))
}

/// Finalizer list with `finalizer` appended if missing.
#[must_use]
pub fn finalizers_with<T: Resource>(resource: &T, finalizer: &str) -> Vec<String> {
    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    if !finalizers.iter().any(|f| f == finalizer) {
        finalizers.push(finalizer.to_string());
    }
    finalizers
}

/// Finalizer list with every occurrence of `finalizer` removed.
#[must_use]
pub fn finalizers_without<T: Resource>(resource: &T, finalizer: &str) -> Vec<String> {
    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.retain(|f| f != finalizer);
    finalizers
}

async fn patch_finalizers<T>(
    client: &Client,
    resource: &T,
    finalizers: Vec<String>,
) -> Result<(), kube::Error>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + serde::de::DeserializeOwned,
{
    let namespace = resource.namespace().unwrap_or_default();
    let api: Api<T> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(
        &resource.name_any(),
        &PatchParams::default(),
        &Patch::Merge(&patch),
    )
    .await?;
    Ok(())
}

/// Add a finalizer to a resource if not already present.
///
/// Idempotent: calling it again once the finalizer is present issues no API call.
///
/// # Errors
///
/// Returns an error if the API patch operation fails.
pub async fn ensure_finalizer<T>(
    client: &Client,
    resource: &T,
    finalizer: &str,
) -> Result<(), kube::Error>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + serde::de::DeserializeOwned,
{
    if has_finalizer(resource, finalizer) {
        return Ok(());
    }

    info!(
        "Adding finalizer {} to {}/{} {}",
        finalizer,
        resource.namespace().unwrap_or_default(),
        resource.name_any(),
        T::kind(&())
    );
    patch_finalizers(client, resource, finalizers_with(resource, finalizer)).await
}

/// Remove a finalizer from a resource.
///
/// Idempotent: nothing is patched if the finalizer is already absent.
///
/// # Errors
///
/// Returns an error if the API patch operation fails.
pub async fn remove_finalizer<T>(
    client: &Client,
    resource: &T,
    finalizer: &str,
) -> Result<(), kube::Error>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + serde::de::DeserializeOwned,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }

    info!(
        "Removing finalizer {} from {}/{} {}",
        finalizer,
        resource.namespace().unwrap_or_default(),
        resource.name_any(),
        T::kind(&())
    );
    patch_finalizers(client, resource, finalizers_without(resource, finalizer)).await
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
