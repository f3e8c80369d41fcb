// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for Nutanix VM provisioning.
//!
//! This module defines the Kubernetes Custom Resource Definitions used by the
//! provider to provision virtual machines on Nutanix Prism Central declaratively.
//!
//! # Resource Types
//!
//! - [`VirtualMachine`] - Desired state of a single VM (namespaced)
//! - [`ProviderConfig`] - Shared provider policy and credentials (cluster-scoped,
//!   the controller always reads the one named `default`)
//!
//! # Example: Declaring a VM
//!
//! ```rust,no_run
//! use nutanix_provider::crd::{AdditionalDisk, VirtualMachineSpec};
//!
//! let spec = VirtualMachineSpec {
//!     name: "build-agent-01".to_string(),
//!     num_vcpus: 4,
//!     memory_size_mib: 8192,
//!     datacenter: Some("dc1".to_string()),
//!     lob: Some("eng".to_string()),
//!     cluster_name: Some("ch01-aza-ntnx-01".to_string()),
//!     image_name: Some("rhel8".to_string()),
//!     subnet_name: Some("prod-subnet".to_string()),
//!     additional_disks: vec![AdditionalDisk {
//!         device_index: 1,
//!         size_gb: 100,
//!         image_name: None,
//!         image_uuid: None,
//!     }],
//!     ..Default::default()
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Treat `Some("")` the same as `None`.
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. Common types include: Ready, Synced.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// An extra disk attached to the VM after the boot disk.
///
/// A disk may be blank (no image) or cloned from an image given by UUID or by a
/// partial image name. Partial names resolve to the most recently created
/// image whose name contains the given text (case-insensitive).
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalDisk {
    /// Device index on the SCSI bus. The boot disk uses index 0.
    pub device_index: i32,

    /// Disk size in GiB.
    #[schemars(range(min = 1))]
    pub size_gb: i64,

    /// Partial image name to clone the disk from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,

    /// Image UUID to clone the disk from. Takes precedence over `imageName`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uuid: Option<String>,
}

impl AdditionalDisk {
    /// Image UUID, ignoring empty strings.
    #[must_use]
    pub fn image_uuid(&self) -> Option<&str> {
        non_empty(self.image_uuid.as_ref())
    }

    /// Image name, ignoring empty strings.
    #[must_use]
    pub fn image_name(&self) -> Option<&str> {
        non_empty(self.image_name.as_ref())
    }
}

/// `VirtualMachine` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Backend-assigned VM identifier. Empty until the VM has been created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_id: Option<String>,

    /// Coarse lifecycle label (e.g. `Created`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `VirtualMachine` declares a VM to be provisioned on Nutanix Prism Central.
///
/// Cluster, image and subnet may be given either as UUIDs or as names. Names
/// are resolved against Prism Central on every reconcile until the VM exists;
/// after creation the resolved UUIDs are written back into the spec.
///
/// # Example
///
/// ```yaml
/// apiVersion: nutanix.crossplane.io/v1alpha1
/// kind: VirtualMachine
/// metadata:
///   name: build-agent-01
///   namespace: ci
///   labels:
///     repo: platform-builds
/// spec:
///   name: build-agent-01
///   numVcpus: 4
///   memorySizeMib: 8192
///   datacenter: dc1
///   availabilityZone: aza
///   lob: eng
///   imageName: rhel8
///   subnetName: prod-subnet
///   additionalDisks:
///     - deviceIndex: 1
///       sizeGb: 100
///   externalFacts:
///     owner: platform-team
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "nutanix.crossplane.io",
    version = "v1alpha1",
    kind = "VirtualMachine",
    namespaced,
    doc = "VirtualMachine declares a Nutanix VM. The controller validates it against the default ProviderConfig, resolves cluster, image and subnet names to UUIDs and drives the VM through create, observe and delete.",
    printcolumn = r#"{"name":"VMID","type":"string","jsonPath":".status.vmId"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#,
    printcolumn = r#"{"name":"Datacenter","type":"string","jsonPath":".spec.datacenter"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "VirtualMachineStatus")]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSpec {
    /// VM name as it appears in Prism Central.
    pub name: String,

    /// Number of vCPUs.
    #[serde(default)]
    #[schemars(range(min = 0))]
    pub num_vcpus: i32,

    /// Memory size in MiB.
    #[serde(default)]
    #[schemars(range(min = 0))]
    pub memory_size_mib: i32,

    /// Datacenter to deploy into. Must be a key of the provider's
    /// `prismCentralEndpoints`. When omitted the default credentials and the
    /// endpoint embedded in them are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<String>,

    /// Availability zone. When zone mapping is enabled on the provider, the
    /// zone is translated into a cluster name through the zone mapping feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,

    /// Line of business owning the VM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lob: Option<String>,

    /// Exact cluster name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    /// Cluster UUID. Takes precedence over `clusterName`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_uuid: Option<String>,

    /// Partial boot image name (case-insensitive, newest match wins).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,

    /// Boot image UUID. Takes precedence over `imageName`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uuid: Option<String>,

    /// Partial subnet name (case-insensitive, newest match wins).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_name: Option<String>,

    /// Subnet UUID. Takes precedence over `subnetName`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_uuid: Option<String>,

    /// Disks attached in addition to the boot disk.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_disks: Vec<AdditionalDisk>,

    /// Free-form facts attached to the VM at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_facts: Option<BTreeMap<String, String>>,
}

impl VirtualMachineSpec {
    /// Datacenter, ignoring empty strings.
    #[must_use]
    pub fn datacenter(&self) -> Option<&str> {
        non_empty(self.datacenter.as_ref())
    }

    /// Availability zone, ignoring empty strings.
    #[must_use]
    pub fn availability_zone(&self) -> Option<&str> {
        non_empty(self.availability_zone.as_ref())
    }

    /// Line of business, ignoring empty strings.
    #[must_use]
    pub fn lob(&self) -> Option<&str> {
        non_empty(self.lob.as_ref())
    }

    #[must_use]
    pub fn cluster_name(&self) -> Option<&str> {
        non_empty(self.cluster_name.as_ref())
    }

    #[must_use]
    pub fn cluster_uuid(&self) -> Option<&str> {
        non_empty(self.cluster_uuid.as_ref())
    }

    #[must_use]
    pub fn image_name(&self) -> Option<&str> {
        non_empty(self.image_name.as_ref())
    }

    #[must_use]
    pub fn image_uuid(&self) -> Option<&str> {
        non_empty(self.image_uuid.as_ref())
    }

    #[must_use]
    pub fn subnet_name(&self) -> Option<&str> {
        non_empty(self.subnet_name.as_ref())
    }

    #[must_use]
    pub fn subnet_uuid(&self) -> Option<&str> {
        non_empty(self.subnet_uuid.as_ref())
    }
}

impl VirtualMachine {
    /// Stored backend identifier, or `""` if the VM has never been created.
    #[must_use]
    pub fn vm_id(&self) -> &str {
        self.status
            .as_ref()
            .and_then(|s| s.vm_id.as_deref())
            .unwrap_or_default()
    }

    /// Whether the resource carries a deletion marker.
    #[must_use]
    pub fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }
}

/// Where provider credentials come from.
///
/// Only [`CredentialsSource::Secret`] is implemented; the other sources are
/// accepted by the schema and rejected by the controller.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
pub enum CredentialsSource {
    #[default]
    None,
    Secret,
    InjectedIdentity,
    Environment,
    Filesystem,
}

impl CredentialsSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialsSource::None => "None",
            CredentialsSource::Secret => "Secret",
            CredentialsSource::InjectedIdentity => "InjectedIdentity",
            CredentialsSource::Environment => "Environment",
            CredentialsSource::Filesystem => "Filesystem",
        }
    }
}

impl fmt::Display for CredentialsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a single key of a Kubernetes `Secret`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    /// Namespace of the secret.
    pub namespace: String,

    /// Name of the secret.
    pub name: String,

    /// Key within the secret's data holding the JSON credential payload.
    pub key: String,
}

/// Credentials used to authenticate to Prism Central.
///
/// With `source: Secret`, the referenced key must hold a JSON document:
///
/// ```json
/// {"endpoint": "https://pc.example.com:9440", "username": "admin", "password": "...", "insecure": false}
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentials {
    /// Source of the provider credentials.
    pub source: CredentialsSource,

    /// Secret holding the credentials when `source` is `Secret`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretKeySelector>,
}

/// `ProviderConfig` holds the policy and credentials shared by all VMs.
///
/// # Example
///
/// ```yaml
/// apiVersion: nutanix.crossplane.io/v1beta1
/// kind: ProviderConfig
/// metadata:
///   name: default
/// spec:
///   credentials:
///     source: Secret
///     secretRef:
///       namespace: crossplane-system
///       name: nutanix-creds
///       key: credentials
///   allowedLobs: [eng, qa]
///   isLobMandatory: true
///   prismCentralEndpoints:
///     dc1: https://pc-dc1.example.com:9440
///   datacenterCredentials:
///     dc1:
///       source: Secret
///       secretRef:
///         namespace: crossplane-system
///         name: nutanix-creds-dc1
///         key: credentials
///   enableAvailabilityZoneMapping: true
///   availabilityZoneMappingURL: https://inventory.example.com/zones.csv
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "nutanix.crossplane.io",
    version = "v1beta1",
    kind = "ProviderConfig",
    doc = "ProviderConfig configures the Nutanix provider: credentials, business-unit policy, datacenter endpoints and availability zone mapping.",
    printcolumn = r#"{"name":"Secret-Name","type":"string","jsonPath":".spec.credentials.secretRef.name","priority":1}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigSpec {
    /// Default credentials, used when no datacenter-specific ones apply.
    pub credentials: ProviderCredentials,

    /// Lines of business VMs may declare.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_lobs: Vec<String>,

    /// Reject VMs that do not declare a line of business.
    #[serde(default)]
    pub is_lob_mandatory: bool,

    /// Datacenter name to Prism Central endpoint. Also serves as the datacenter allow-list.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prism_central_endpoints: BTreeMap<String, String>,

    /// Datacenter name to datacenter-specific credentials.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub datacenter_credentials: BTreeMap<String, ProviderCredentials>,

    /// Translate `availabilityZone` into a cluster name through the zone feed.
    #[serde(default)]
    pub enable_availability_zone_mapping: bool,

    /// URL of the CSV zone feed.
    #[serde(
        default,
        rename = "availabilityZoneMappingURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub availability_zone_mapping_url: Option<String>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
