// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for `VirtualMachine` resources.
//!
//! Kubernetes conditions follow a standard format:
//! - `type`: The aspect of the resource being reported (e.g., "Ready")
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp when the condition changed
//!
//! # Example
//!
//! ```rust,no_run
//! use nutanix_provider::reconcilers::status::create_condition;
//!
//! let condition = create_condition(
//!     "Ready",
//!     "True",
//!     "Available",
//!     "VM 6a1f0b3e is available"
//! );
//! ```

use crate::crd::{Condition, VirtualMachine, VirtualMachineStatus};
use crate::store::ResourceStore;
use chrono::Utc;
use kube::ResourceExt;
use tracing::debug;

/// Create a new condition stamped with the current time.
///
/// # Example
///
/// ```rust,no_run
/// # use nutanix_provider::reconcilers::status::create_condition;
/// let condition = create_condition("Ready", "False", "PolicyViolation", "datacenter 'dc9' is not allowed");
/// assert_eq!(condition.r#type, "Ready");
/// assert_eq!(condition.status, "False");
/// ```
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by type.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Update or add a condition in place (no API call).
///
/// `lastTransitionTime` is preserved when the status value is unchanged.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) {
        let last_transition_time = if existing.status == status {
            existing
                .last_transition_time
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339())
        } else {
            Utc::now().to_rfc3339()
        };

        existing.status = status.to_string();
        existing.reason = Some(reason.to_string());
        existing.message = Some(message.to_string());
        existing.last_transition_time = Some(last_transition_time);
    } else {
        conditions.push(create_condition(condition_type, status, reason, message));
    }
}

/// Compare condition lists ignoring `lastTransitionTime`.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    current.len() == new.len()
        && new.iter().all(|new_cond| {
            find_condition(current, &new_cond.r#type).is_some_and(|curr| {
                curr.status == new_cond.status
                    && curr.reason == new_cond.reason
                    && curr.message == new_cond.message
            })
        })
}

/// Collects status changes during a reconcile and writes them in one patch.
///
/// # Example
///
/// ```rust,ignore
/// let mut updater = VirtualMachineStatusUpdater::new(&vm);
/// updater.set_created("6a1f0b3e");
/// updater.set_condition("Ready", "True", "Created", "VM created");
/// updater.apply(store.as_ref()).await?;
/// ```
pub struct VirtualMachineStatusUpdater {
    namespace: String,
    name: String,
    current_status: Option<VirtualMachineStatus>,
    new_status: VirtualMachineStatus,
}

impl VirtualMachineStatusUpdater {
    #[must_use]
    pub fn new(vm: &VirtualMachine) -> Self {
        let current_status = vm.status.clone();
        let new_status = current_status.clone().unwrap_or_default();

        Self {
            namespace: vm.namespace().unwrap_or_default(),
            name: vm.name_any(),
            current_status,
            new_status,
        }
    }

    pub fn set_condition(
        &mut self,
        condition_type: &str,
        status: &str,
        reason: &str,
        message: &str,
    ) {
        update_condition_in_memory(
            &mut self.new_status.conditions,
            condition_type,
            status,
            reason,
            message,
        );
    }

    /// Record the backend identifier and the created state label.
    pub fn set_created(&mut self, vm_id: &str) {
        self.new_status.vm_id = Some(vm_id.to_string());
        self.new_status.state = Some(crate::constants::VM_STATE_CREATED.to_string());
    }

    pub fn set_observed_generation(&mut self, generation: Option<i64>) {
        self.new_status.observed_generation = generation;
    }

    #[must_use]
    pub fn status(&self) -> &VirtualMachineStatus {
        &self.new_status
    }

    /// Whether the collected status differs from the stored one.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        match &self.current_status {
            None => true,
            Some(current) => {
                current.vm_id != self.new_status.vm_id
                    || current.state != self.new_status.state
                    || current.observed_generation != self.new_status.observed_generation
                    || !conditions_equal(&current.conditions, &self.new_status.conditions)
            }
        }
    }

    /// Write the collected status, skipping the call when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes API call fails.
    pub async fn apply(
        &self,
        store: &dyn ResourceStore,
        vm: &VirtualMachine,
    ) -> Result<(), kube::Error> {
        if !self.has_changes() {
            debug!(
                "VirtualMachine {}/{} status unchanged, skipping update",
                self.namespace, self.name
            );
            return Ok(());
        }

        store.patch_status(vm, &self.new_status).await?;

        debug!(
            "Updated VirtualMachine {}/{} status: vmId={:?} state={:?}",
            self.namespace, self.name, self.new_status.vm_id, self.new_status.state
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
