// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Nutanix Provider - Virtual Machine Operator for Kubernetes
//!
//! A Kubernetes operator that provisions virtual machines on Nutanix Prism
//! Central from declarative `VirtualMachine` resources, under a shared
//! `ProviderConfig` policy.
//!
//! ## Overview
//!
//! Each reconcile pass:
//!
//! - Maps an availability zone to a cluster through an external CSV feed
//! - Enforces line-of-business and datacenter allow-lists
//! - Routes to the Prism Central endpoint and credentials of the datacenter
//! - Resolves cluster, image and subnet names into UUIDs
//! - Creates, observes or deletes the backend VM
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`reconcilers`] - Reconciliation logic
//! - [`context`] - Shared controller context
//! - [`store`] - Kubernetes reads and writes
//! - [`nutanix`] - Prism Central API contract and client
//! - [`zone_mapping`] - Availability zone feed
//! - [`details`] - Cluster and network detail records
//! - [`errors`] - Error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use nutanix_provider::crd::VirtualMachineSpec;
//!
//! let spec = VirtualMachineSpec {
//!     name: "web-01".to_string(),
//!     num_vcpus: 2,
//!     memory_size_mib: 4096,
//!     datacenter: Some("dc1".to_string()),
//!     image_name: Some("rhel8".to_string()),
//!     subnet_name: Some("prod-vlan10".to_string()),
//!     ..Default::default()
//! };
//! ```

pub mod constants;
pub mod context;
pub mod crd;
pub mod details;
pub mod errors;
pub mod labels;
pub mod metrics;
pub mod nutanix;
pub mod reconcilers;
pub mod status_reasons;
pub mod store;
pub mod zone_mapping;
