// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lifecycle transition selection and create request assembly.

use super::resolution::ensure_complete;
use super::types::LifecycleAction;
use crate::constants::BOOT_DISK_DEVICE_INDEX;
use crate::crd::{VirtualMachine, VirtualMachineSpec};
use crate::errors::ResolutionError;
use crate::nutanix::types::{DiskSpec, VmCreateRequest};

/// Pick the transition for this pass. Deletion wins over everything else; an
/// empty `status.vmId` means the VM was never created.
#[must_use]
pub fn decide_action(vm: &VirtualMachine) -> LifecycleAction {
    if vm.is_being_deleted() {
        LifecycleAction::Delete
    } else if vm.vm_id().is_empty() {
        LifecycleAction::Create
    } else {
        LifecycleAction::Observe
    }
}

/// Build the create request from a fully resolved spec.
///
/// The boot disk comes first at device index 0, followed by the additional
/// disks in declaration order.
///
/// # Errors
///
/// Returns [`ResolutionError::MissingIdentifier`] if the cluster, image or
/// subnet UUID is still unset.
pub fn build_create_request(
    spec: &VirtualMachineSpec,
) -> Result<VmCreateRequest, ResolutionError> {
    ensure_complete(spec)?;

    let boot_disk = DiskSpec {
        device_index: BOOT_DISK_DEVICE_INDEX,
        size_gb: None,
        image_uuid: spec.image_uuid().map(str::to_string),
    };

    let additional = spec.additional_disks.iter().map(|disk| DiskSpec {
        device_index: disk.device_index,
        size_gb: Some(disk.size_gb),
        image_uuid: disk.image_uuid().map(str::to_string),
    });

    Ok(VmCreateRequest {
        name: spec.name.clone(),
        num_vcpus: spec.num_vcpus,
        memory_size_mib: spec.memory_size_mib,
        cluster_uuid: spec.cluster_uuid().unwrap_or_default().to_string(),
        subnet_uuid: spec.subnet_uuid().unwrap_or_default().to_string(),
        disks: std::iter::once(boot_disk).chain(additional).collect(),
        external_facts: spec.external_facts.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;
