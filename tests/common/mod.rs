// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::ByteString;
use kube::{
    api::{Api, DeleteParams, PostParams},
    client::Client,
    ResourceExt,
};
use nutanix_provider::crd::{
    ProviderConfig, VirtualMachine, VirtualMachineSpec, VirtualMachineStatus,
};
use nutanix_provider::store::ResourceStore;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {}", e);
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let ns = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": {
                "test": "integration",
                "managed-by": "nutanix-provider-test"
            }
        }
    }))?;

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {}", name);
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {}", name);
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            println!("Deleted test namespace: {}", name);
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {}", name);
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Build a secret holding a JSON credential payload under `key`.
pub fn credential_secret(namespace: &str, name: &str, key: &str, payload: &str) -> Secret {
    let mut secret = Secret::default();
    secret.metadata.name = Some(name.to_string());
    secret.metadata.namespace = Some(namespace.to_string());
    secret.data = Some(BTreeMap::from([(
        key.to_string(),
        ByteString(payload.as_bytes().to_vec()),
    )]));
    secret
}

/// In-memory [`ResourceStore`] that applies writes to the stored objects.
#[derive(Default)]
pub struct MemoryStore {
    vms: Mutex<HashMap<(String, String), VirtualMachine>>,
    provider_configs: Mutex<HashMap<String, ProviderConfig>>,
    secrets: Mutex<HashMap<(String, String), Secret>>,
}

impl MemoryStore {
    pub fn insert_vm(&self, vm: VirtualMachine) {
        let key = (vm.namespace().unwrap_or_default(), vm.name_any());
        self.vms.lock().unwrap().insert(key, vm);
    }

    pub fn insert_provider_config(&self, config: ProviderConfig) {
        self.provider_configs
            .lock()
            .unwrap()
            .insert(config.name_any(), config);
    }

    pub fn insert_secret(&self, secret: Secret) {
        let key = (secret.namespace().unwrap_or_default(), secret.name_any());
        self.secrets.lock().unwrap().insert(key, secret);
    }

    pub fn vm(&self, namespace: &str, name: &str) -> Option<VirtualMachine> {
        self.vms
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    fn update_vm(&self, vm: &VirtualMachine, apply: impl FnOnce(&mut VirtualMachine)) {
        let key = (vm.namespace().unwrap_or_default(), vm.name_any());
        if let Some(stored) = self.vms.lock().unwrap().get_mut(&key) {
            apply(stored);
        }
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn get_virtual_machine(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<VirtualMachine>, kube::Error> {
        Ok(self.vm(namespace, name))
    }

    async fn get_provider_config(
        &self,
        name: &str,
    ) -> Result<Option<ProviderConfig>, kube::Error> {
        Ok(self.provider_configs.lock().unwrap().get(name).cloned())
    }

    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Secret>, kube::Error> {
        let key = (namespace.to_string(), name.to_string());
        Ok(self.secrets.lock().unwrap().get(&key).cloned())
    }

    async fn add_finalizer(&self, vm: &VirtualMachine) -> Result<(), kube::Error> {
        self.update_vm(vm, |stored| {
            let finalizers = stored.metadata.finalizers.get_or_insert_with(Vec::new);
            let finalizer = nutanix_provider::labels::FINALIZER_VIRTUAL_MACHINE.to_string();
            if !finalizers.contains(&finalizer) {
                finalizers.push(finalizer);
            }
        });
        Ok(())
    }

    async fn remove_finalizer(&self, vm: &VirtualMachine) -> Result<(), kube::Error> {
        self.update_vm(vm, |stored| {
            if let Some(finalizers) = stored.metadata.finalizers.as_mut() {
                finalizers.retain(|f| f != nutanix_provider::labels::FINALIZER_VIRTUAL_MACHINE);
            }
        });
        Ok(())
    }

    async fn persist_resolved_identifiers(
        &self,
        vm: &VirtualMachine,
        resolved: &VirtualMachineSpec,
    ) -> Result<(), kube::Error> {
        self.update_vm(vm, |stored| {
            stored.spec.cluster_uuid.clone_from(&resolved.cluster_uuid);
            stored.spec.image_uuid.clone_from(&resolved.image_uuid);
            stored.spec.subnet_uuid.clone_from(&resolved.subnet_uuid);
            stored
                .spec
                .additional_disks
                .clone_from(&resolved.additional_disks);
        });
        Ok(())
    }

    async fn patch_status(
        &self,
        vm: &VirtualMachine,
        status: &VirtualMachineStatus,
    ) -> Result<(), kube::Error> {
        self.update_vm(vm, |stored| stored.status = Some(status.clone()));
        Ok(())
    }
}
