// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `VirtualMachine` reconciliation logic.
//!
//! One pass runs these stages in order and stops at the first error:
//! 1. Load the `VirtualMachine` and the `ProviderConfig`
//! 2. Map the availability zone to a cluster name (when enabled)
//! 3. Check business-unit and datacenter policy
//! 4. Route to a Prism Central endpoint and credentials
//! 5. Delete, create or observe the backend VM
//!
//! The finalizer is added only once a pass reaches the backend create or
//! observe call. A deleting VM with no recorded backend identifier whose
//! stages 2 to 4 fail has its finalizer released directly.
//!
//! ## Module Structure
//!
//! - [`validation`] - Business-unit and datacenter policy checks
//! - [`credentials`] - Credential and endpoint routing
//! - [`resolution`] - Cluster, image and subnet name resolution
//! - [`lifecycle`] - Transition selection and create request assembly
//! - [`status_helpers`] - `Ready` condition updates
//! - [`types`] - Shared types

// Submodules
pub mod credentials;
pub mod lifecycle;
pub mod resolution;
pub mod status_helpers;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod fakes;

pub use types::{LifecycleAction, ReconcileOutcome};

use crate::context::Context;
use crate::crd::{ProviderConfigSpec, VirtualMachine, VirtualMachineSpec};
use crate::errors::{ConfigurationError, ReconcileError};
use crate::labels::REPO_LABEL;
use crate::nutanix::ProvisioningApi;
use crate::zone_mapping::fetch_zone_mapping;
use kube::ResourceExt;
use tracing::{debug, info, warn};

/// Reconciles a single `VirtualMachine`.
///
/// A `VirtualMachine` that no longer exists is reported as
/// [`ReconcileOutcome::NotFound`], not as an error. Any other failure aborts the
/// pass, is recorded as `Ready=False` on a best-effort basis, and is returned to
/// the controller, which owns retry scheduling.
///
/// # Errors
///
/// Returns a [`ReconcileError`] describing the stage that failed.
pub async fn reconcile_virtual_machine(
    ctx: &Context,
    namespace: &str,
    name: &str,
) -> Result<ReconcileOutcome, ReconcileError> {
    let Some(vm) = ctx.store.get_virtual_machine(namespace, name).await? else {
        debug!(namespace = %namespace, name = %name, "VirtualMachine not found, nothing to do");
        return Ok(ReconcileOutcome::NotFound);
    };

    info!("Reconciling VirtualMachine: {}/{}", namespace, name);
    debug!(
        namespace = %namespace,
        name = %name,
        generation = ?vm.metadata.generation,
        vm_id = %vm.vm_id(),
        "Starting VirtualMachine reconciliation"
    );

    match reconcile_loaded(ctx, &vm).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            status_helpers::mark_failed(ctx.store.as_ref(), &vm, &e).await;
            Err(e)
        }
    }
}

async fn reconcile_loaded(
    ctx: &Context,
    vm: &VirtualMachine,
) -> Result<ReconcileOutcome, ReconcileError> {
    let policy = ctx
        .store
        .get_provider_config(&ctx.provider_config_name)
        .await?
        .ok_or_else(|| ConfigurationError::MissingProviderConfig {
            name: ctx.provider_config_name.clone(),
        })?
        .spec;

    let action = lifecycle::decide_action(vm);
    let mut spec = vm.spec.clone();

    let api = match connect(ctx, &policy, &mut spec).await {
        Ok(api) => api,
        Err(e) if action == LifecycleAction::Delete && vm.vm_id().is_empty() => {
            warn!(
                namespace = %vm.namespace().unwrap_or_default(),
                name = %vm.name_any(),
                error = %e,
                "No backend VM recorded, releasing finalizer without contacting Prism Central"
            );
            ctx.store.remove_finalizer(vm).await?;
            return Ok(ReconcileOutcome::Deleted);
        }
        Err(e) => return Err(e),
    };

    match action {
        LifecycleAction::Delete => delete(ctx, vm, api.as_ref()).await,
        LifecycleAction::Create => create(ctx, vm, spec, api.as_ref()).await,
        LifecycleAction::Observe => observe(ctx, vm, spec, api.as_ref()).await,
    }
}

/// Run zone mapping, policy validation and credential routing, then open a
/// Prism Central session for the routed endpoint.
async fn connect(
    ctx: &Context,
    policy: &ProviderConfigSpec,
    spec: &mut VirtualMachineSpec,
) -> Result<Box<dyn ProvisioningApi>, ReconcileError> {
    apply_zone_mapping(ctx, policy, spec).await?;

    let validated = validation::validate(spec, policy)?;
    let connection =
        credentials::route(ctx.store.as_ref(), policy, validated.datacenter.as_deref()).await?;

    Ok(ctx
        .connector
        .connect(&connection.endpoint, &connection.credentials)?)
}

/// Replace `clusterName` with the cluster the zone feed maps the zone to.
async fn apply_zone_mapping(
    ctx: &Context,
    policy: &ProviderConfigSpec,
    spec: &mut VirtualMachineSpec,
) -> Result<(), ReconcileError> {
    let Some(zone) = spec.availability_zone().map(str::to_string) else {
        return Ok(());
    };
    if !policy.enable_availability_zone_mapping {
        return Ok(());
    }

    let url = policy
        .availability_zone_mapping_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(ConfigurationError::MissingZoneFeedUrl)?;

    let mapping = fetch_zone_mapping(&ctx.http_client, url).await?;
    let cluster = mapping.cluster_for_zone(&zone)?;

    debug!(zone = %zone, cluster = %cluster, "Mapped availability zone to cluster");
    spec.cluster_name = Some(cluster.to_string());
    Ok(())
}

async fn delete(
    ctx: &Context,
    vm: &VirtualMachine,
    api: &dyn ProvisioningApi,
) -> Result<ReconcileOutcome, ReconcileError> {
    let vm_id = vm.vm_id();
    info!(
        "Deleting backend VM '{}' for VirtualMachine {}/{}",
        vm_id,
        vm.namespace().unwrap_or_default(),
        vm.name_any()
    );

    api.delete_vm(vm_id).await?;
    ctx.store.remove_finalizer(vm).await?;

    Ok(ReconcileOutcome::Deleted)
}

async fn create(
    ctx: &Context,
    vm: &VirtualMachine,
    mut spec: VirtualMachineSpec,
    api: &dyn ProvisioningApi,
) -> Result<ReconcileOutcome, ReconcileError> {
    resolution::resolve_identifiers(api, ctx.details.as_ref(), repo_label(vm), &mut spec).await?;
    let request = lifecycle::build_create_request(&spec)?;

    // Only VMs that passed every gate carry the finalizer.
    ctx.store.add_finalizer(vm).await?;
    let vm_id = api.create_vm(&request).await?;
    info!(
        "Created backend VM '{}' for VirtualMachine {}/{}",
        vm_id,
        vm.namespace().unwrap_or_default(),
        vm.name_any()
    );

    status_helpers::mark_created(ctx.store.as_ref(), vm, &vm_id).await?;
    ctx.store.persist_resolved_identifiers(vm, &spec).await?;

    Ok(ReconcileOutcome::Created { vm_id })
}

/// Re-run resolution so resolution errors surface in steady state, then confirm
/// the VM still exists. Resolved identifiers are not written back here.
async fn observe(
    ctx: &Context,
    vm: &VirtualMachine,
    mut spec: VirtualMachineSpec,
    api: &dyn ProvisioningApi,
) -> Result<ReconcileOutcome, ReconcileError> {
    resolution::resolve_identifiers(api, ctx.details.as_ref(), repo_label(vm), &mut spec).await?;
    ctx.store.add_finalizer(vm).await?;

    let info = api.get_vm(vm.vm_id()).await?;
    debug!(
        vm_id = %info.uuid,
        state = ?info.state,
        power_state = ?info.power_state,
        "Observed backend VM"
    );

    status_helpers::mark_available(ctx.store.as_ref(), vm, &info).await?;
    Ok(ReconcileOutcome::Observed { vm: info })
}

fn repo_label(vm: &VirtualMachine) -> Option<&str> {
    vm.labels()
        .get(REPO_LABEL)
        .map(String::as_str)
        .filter(|repo| !repo.is_empty())
}
