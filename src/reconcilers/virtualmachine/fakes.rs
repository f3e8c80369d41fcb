// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory stand-ins for the Kubernetes store, the detail store and Prism
//! Central, used to drive whole reconcile passes in tests.

use crate::crd::{
    ProviderConfig, ProviderConfigSpec, VirtualMachine, VirtualMachineSpec, VirtualMachineStatus,
};
use crate::details::{DetailStore, Details};
use crate::errors::{DetailError, ProviderApiError};
use crate::nutanix::types::{
    ClusterInfo, CredentialPayload, ImageInfo, SubnetInfo, VmCreateRequest, VmInfo,
};
use crate::nutanix::{ProvisioningApi, ProvisioningConnector};
use crate::store::ResourceStore;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Build a secret holding `payload` under `key`.
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

#[derive(Default)]
pub struct FakeStore {
    pub vms: Mutex<HashMap<(String, String), VirtualMachine>>,
    pub provider_configs: Mutex<HashMap<String, ProviderConfig>>,
    pub secrets: Mutex<HashMap<(String, String), Secret>>,
    /// Names of the write operations, in call order.
    pub writes: Mutex<Vec<String>>,
    pub statuses: Mutex<Vec<VirtualMachineStatus>>,
    pub persisted: Mutex<Vec<VirtualMachineSpec>>,
}

impl FakeStore {
    pub fn with_vm(self, vm: VirtualMachine) -> Self {
        let key = (vm.namespace().unwrap_or_default(), vm.name_any());
        self.vms.lock().unwrap().insert(key, vm);
        self
    }

    pub fn with_provider_config(self, name: &str, spec: ProviderConfigSpec) -> Self {
        self.provider_configs
            .lock()
            .unwrap()
            .insert(name.to_string(), ProviderConfig::new(name, spec));
        self
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        let key = (secret.namespace().unwrap_or_default(), secret.name_any());
        self.secrets.lock().unwrap().insert(key, secret);
        self
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<VirtualMachineStatus> {
        self.statuses.lock().unwrap().last().cloned()
    }

    fn record(&self, operation: &str) {
        self.writes.lock().unwrap().push(operation.to_string());
    }
}

#[async_trait]
impl ResourceStore for FakeStore {
    async fn get_virtual_machine(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<VirtualMachine>, kube::Error> {
        let key = (namespace.to_string(), name.to_string());
        Ok(self.vms.lock().unwrap().get(&key).cloned())
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

    async fn add_finalizer(&self, _vm: &VirtualMachine) -> Result<(), kube::Error> {
        self.record("add_finalizer");
        Ok(())
    }

    async fn remove_finalizer(&self, _vm: &VirtualMachine) -> Result<(), kube::Error> {
        self.record("remove_finalizer");
        Ok(())
    }

    async fn persist_resolved_identifiers(
        &self,
        _vm: &VirtualMachine,
        resolved: &VirtualMachineSpec,
    ) -> Result<(), kube::Error> {
        self.record("persist_resolved_identifiers");
        self.persisted.lock().unwrap().push(resolved.clone());
        Ok(())
    }

    async fn patch_status(
        &self,
        _vm: &VirtualMachine,
        status: &VirtualMachineStatus,
    ) -> Result<(), kube::Error> {
        self.record("patch_status");
        self.statuses.lock().unwrap().push(status.clone());
        Ok(())
    }
}

/// Detail records keyed by `(kind, name)`.
#[derive(Default)]
pub struct FakeDetails {
    pub records: HashMap<(String, String), Details>,
}

impl FakeDetails {
    pub fn with_record(mut self, kind: &str, name: &str, record: serde_json::Value) -> Self {
        let record = record.as_object().cloned().unwrap_or_default();
        self.records
            .insert((kind.to_string(), name.to_string()), record);
        self
    }
}

#[async_trait]
impl DetailStore for FakeDetails {
    async fn lookup(&self, kind: &str, name: &str) -> Result<Details, DetailError> {
        self.records
            .get(&(kind.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| DetailError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            })
    }
}

/// Prism Central stand-in. Clones share call history.
#[derive(Clone, Default)]
pub struct FakeProvisioning {
    pub clusters: Vec<ClusterInfo>,
    pub images: Vec<ImageInfo>,
    pub subnets: Vec<SubnetInfo>,
    pub created_vm_id: String,
    pub existing_vm: Option<VmInfo>,
    pub delete_error: Option<ProviderApiError>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub created: Arc<Mutex<Vec<VmCreateRequest>>>,
}

impl FakeProvisioning {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<VmCreateRequest> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ProvisioningApi for FakeProvisioning {
    async fn list_clusters(&self) -> Result<Vec<ClusterInfo>, ProviderApiError> {
        self.record("list_clusters".to_string());
        Ok(self.clusters.clone())
    }

    async fn list_images(&self) -> Result<Vec<ImageInfo>, ProviderApiError> {
        self.record("list_images".to_string());
        Ok(self.images.clone())
    }

    async fn list_subnets(&self) -> Result<Vec<SubnetInfo>, ProviderApiError> {
        self.record("list_subnets".to_string());
        Ok(self.subnets.clone())
    }

    async fn create_vm(&self, request: &VmCreateRequest) -> Result<String, ProviderApiError> {
        self.record("create_vm".to_string());
        self.created.lock().unwrap().push(request.clone());
        Ok(self.created_vm_id.clone())
    }

    async fn get_vm(&self, vm_id: &str) -> Result<VmInfo, ProviderApiError> {
        self.record(format!("get_vm:{vm_id}"));
        self.existing_vm
            .clone()
            .ok_or_else(|| ProviderApiError::UnexpectedStatus {
                operation: "get_vm".to_string(),
                status: 404,
                body: format!("vm {vm_id} not found"),
            })
    }

    async fn delete_vm(&self, vm_id: &str) -> Result<(), ProviderApiError> {
        self.record(format!("delete_vm:{vm_id}"));
        match &self.delete_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// Hands out clones of one [`FakeProvisioning`] and remembers each connection.
#[derive(Clone, Default)]
pub struct FakeConnector {
    pub api: FakeProvisioning,
    pub connections: Arc<Mutex<Vec<(String, CredentialPayload)>>>,
}

impl FakeConnector {
    pub fn new(api: FakeProvisioning) -> Self {
        Self {
            api,
            connections: Arc::default(),
        }
    }

    pub fn connections(&self) -> Vec<(String, CredentialPayload)> {
        self.connections.lock().unwrap().clone()
    }
}

impl ProvisioningConnector for FakeConnector {
    fn connect(
        &self,
        endpoint: &str,
        credentials: &CredentialPayload,
    ) -> Result<Box<dyn ProvisioningApi>, ProviderApiError> {
        self.connections
            .lock()
            .unwrap()
            .push((endpoint.to_string(), credentials.clone()));
        Ok(Box::new(self.api.clone()))
    }
}
