// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Types exchanged with Prism Central.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Decoded credential payload stored in the referenced secret key.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CredentialPayload {
    /// Prism Central endpoint. Used only when the VM names no datacenter.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,
}

impl fmt::Debug for CredentialPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPayload")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("insecure", &self.insecure)
            .finish()
    }
}

/// A Prism Central cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterInfo {
    pub name: String,
    pub uuid: String,
}

/// A disk image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub name: String,
    pub uuid: String,
    /// Creation time, seconds since the Unix epoch.
    pub created_time: i64,
}

/// A subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetInfo {
    pub name: String,
    pub uuid: String,
    /// Creation time, seconds since the Unix epoch.
    pub created_time: i64,
}

/// Entities resolved by partial name with newest-wins tie-breaking.
pub trait TimestampedEntity {
    fn name(&self) -> &str;
    fn uuid(&self) -> &str;
    fn created_time(&self) -> i64;
}

impl TimestampedEntity for ImageInfo {
    fn name(&self) -> &str {
        &self.name
    }
    fn uuid(&self) -> &str {
        &self.uuid
    }
    fn created_time(&self) -> i64 {
        self.created_time
    }
}

impl TimestampedEntity for SubnetInfo {
    fn name(&self) -> &str {
        &self.name
    }
    fn uuid(&self) -> &str {
        &self.uuid
    }
    fn created_time(&self) -> i64 {
        self.created_time
    }
}

/// Observed state of an existing VM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmInfo {
    pub uuid: String,
    pub name: String,
    /// Entity state reported by Prism (e.g. `COMPLETE`, `PENDING`).
    pub state: Option<String>,
    /// Power state (e.g. `ON`, `OFF`).
    pub power_state: Option<String>,
}

/// One disk of a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSpec {
    pub device_index: i32,
    /// Size in GiB. `None` keeps the image size.
    pub size_gb: Option<i64>,
    pub image_uuid: Option<String>,
}

/// Fully resolved VM create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmCreateRequest {
    pub name: String,
    pub num_vcpus: i32,
    pub memory_size_mib: i32,
    pub cluster_uuid: String,
    pub subnet_uuid: String,
    /// Boot disk first, then additional disks in declaration order.
    pub disks: Vec<DiskSpec>,
    pub external_facts: BTreeMap<String, String>,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
