// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Ready` condition updates for each reconcile outcome.

use crate::crd::VirtualMachine;
use crate::errors::ReconcileError;
use crate::nutanix::types::VmInfo;
use crate::reconcilers::status::VirtualMachineStatusUpdater;
use crate::status_reasons::{CONDITION_TYPE_READY, REASON_AVAILABLE, REASON_CREATED};
use crate::store::ResourceStore;
use kube::ResourceExt;
use tracing::warn;

/// Message for the `Ready=True` condition of an observed VM.
#[must_use]
pub fn available_message(info: &VmInfo) -> String {
    match info.power_state.as_deref() {
        Some(power_state) => format!("VM {} is available (power state {power_state})", info.uuid),
        None => format!("VM {} is available", info.uuid),
    }
}

/// Record a freshly created VM: `vmId`, `state=Created` and `Ready=True`.
///
/// # Errors
///
/// Returns an error if the status patch fails.
pub async fn mark_created(
    store: &dyn ResourceStore,
    vm: &VirtualMachine,
    vm_id: &str,
) -> Result<(), kube::Error> {
    let mut updater = VirtualMachineStatusUpdater::new(vm);
    updater.set_created(vm_id);
    updater.set_condition(
        CONDITION_TYPE_READY,
        "True",
        REASON_CREATED,
        &format!("VM {vm_id} created"),
    );
    updater.set_observed_generation(vm.metadata.generation);
    updater.apply(store, vm).await
}

/// Record a successful observation of an existing VM.
///
/// # Errors
///
/// Returns an error if the status patch fails.
pub async fn mark_available(
    store: &dyn ResourceStore,
    vm: &VirtualMachine,
    info: &VmInfo,
) -> Result<(), kube::Error> {
    let mut updater = VirtualMachineStatusUpdater::new(vm);
    updater.set_condition(
        CONDITION_TYPE_READY,
        "True",
        REASON_AVAILABLE,
        &available_message(info),
    );
    updater.set_observed_generation(vm.metadata.generation);
    updater.apply(store, vm).await
}

/// Best-effort `Ready=False` with the error's reason and message.
///
/// A failed patch is logged and otherwise ignored so the original error is
/// what reaches the controller.
pub async fn mark_failed(store: &dyn ResourceStore, vm: &VirtualMachine, error: &ReconcileError) {
    let mut updater = VirtualMachineStatusUpdater::new(vm);
    updater.set_condition(
        CONDITION_TYPE_READY,
        "False",
        error.status_reason(),
        &error.to_string(),
    );

    if let Err(e) = updater.apply(store, vm).await {
        warn!(
            namespace = %vm.namespace().unwrap_or_default(),
            name = %vm.name_any(),
            error = %e,
            "Failed to record reconcile failure in status"
        );
    }
}

#[cfg(test)]
#[path = "status_helpers_tests.rs"]
mod status_helpers_tests;
