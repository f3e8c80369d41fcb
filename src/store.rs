// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes-backed access to the objects a reconcile pass reads and writes.
//!
//! The reconciler talks to the cluster only through [`ResourceStore`]. Lookups
//! report a missing object as `Ok(None)` so callers can tell "not found" apart
//! from API failures. [`KubeStore`] implements the trait with `kube::Api`.

use crate::crd::{ProviderConfig, VirtualMachine, VirtualMachineSpec, VirtualMachineStatus};
use crate::labels::{FIELD_MANAGER, FINALIZER_VIRTUAL_MACHINE};
use crate::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::{json, Value};
use tracing::debug;

/// Read and write access to provider objects.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get_virtual_machine(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<VirtualMachine>, kube::Error>;

    /// `ProviderConfig` is cluster-scoped.
    async fn get_provider_config(&self, name: &str)
        -> Result<Option<ProviderConfig>, kube::Error>;

    async fn get_secret(&self, namespace: &str, name: &str)
        -> Result<Option<Secret>, kube::Error>;

    /// Add the VM finalizer if missing.
    async fn add_finalizer(&self, vm: &VirtualMachine) -> Result<(), kube::Error>;

    /// Remove the VM finalizer, releasing the object for deletion.
    async fn remove_finalizer(&self, vm: &VirtualMachine) -> Result<(), kube::Error>;

    /// Write the resolved cluster, image and subnet UUIDs back into the spec.
    async fn persist_resolved_identifiers(
        &self,
        vm: &VirtualMachine,
        resolved: &VirtualMachineSpec,
    ) -> Result<(), kube::Error>;

    /// Replace the status subresource.
    async fn patch_status(
        &self,
        vm: &VirtualMachine,
        status: &VirtualMachineStatus,
    ) -> Result<(), kube::Error>;
}

/// Merge patch carrying the identifier fields of a resolved spec.
///
/// `additionalDisks` is sent whole since merge patches replace lists.
#[must_use]
pub fn resolved_identifiers_patch(resolved: &VirtualMachineSpec) -> Value {
    json!({
        "spec": {
            "clusterUuid": resolved.cluster_uuid,
            "imageUuid": resolved.image_uuid,
            "subnetUuid": resolved.subnet_uuid,
            "additionalDisks": resolved.additional_disks,
        }
    })
}

/// [`ResourceStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn vm_api(&self, vm: &VirtualMachine) -> Api<VirtualMachine> {
        Api::namespaced(self.client.clone(), &vm.namespace().unwrap_or_default())
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    async fn get_virtual_machine(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<VirtualMachine>, kube::Error> {
        let api: Api<VirtualMachine> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name).await
    }

    async fn get_provider_config(
        &self,
        name: &str,
    ) -> Result<Option<ProviderConfig>, kube::Error> {
        let api: Api<ProviderConfig> = Api::all(self.client.clone());
        api.get_opt(name).await
    }

    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Secret>, kube::Error> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name).await
    }

    async fn add_finalizer(&self, vm: &VirtualMachine) -> Result<(), kube::Error> {
        ensure_finalizer(&self.client, vm, FINALIZER_VIRTUAL_MACHINE).await
    }

    async fn remove_finalizer(&self, vm: &VirtualMachine) -> Result<(), kube::Error> {
        remove_finalizer(&self.client, vm, FINALIZER_VIRTUAL_MACHINE).await
    }

    async fn persist_resolved_identifiers(
        &self,
        vm: &VirtualMachine,
        resolved: &VirtualMachineSpec,
    ) -> Result<(), kube::Error> {
        let patch = resolved_identifiers_patch(resolved);
        self.vm_api(vm)
            .patch(
                &vm.name_any(),
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(&patch),
            )
            .await?;

        debug!(
            "Persisted resolved identifiers on VirtualMachine {}/{}",
            vm.namespace().unwrap_or_default(),
            vm.name_any()
        );
        Ok(())
    }

    async fn patch_status(
        &self,
        vm: &VirtualMachine,
        status: &VirtualMachineStatus,
    ) -> Result<(), kube::Error> {
        let patch = json!({ "status": status });
        self.vm_api(vm)
            .patch_status(
                &vm.name_any(),
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(&patch),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
