// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Name to UUID resolution for clusters, images and subnets.
//!
//! A UUID given in the spec always wins; names are only resolved for unset UUIDs.
//!
//! - **Clusters** come from the `cluster-<name>` detail record's `uuid` field, and
//!   otherwise from an exact, case-sensitive match over the cluster list.
//! - **Images and subnets** match when the candidate name contains the requested
//!   name, ignoring case. The most recently created match wins; among equal
//!   timestamps the first listed one is kept.
//! - A subnet resolved by name is then checked against the `allowed_repos` list
//!   of its `network-<name>` detail record.

use crate::constants::{
    DETAIL_FIELD_ALLOWED_REPOS, DETAIL_FIELD_UUID, DETAIL_KIND_CLUSTER, DETAIL_KIND_NETWORK,
};
use crate::crd::VirtualMachineSpec;
use crate::details::{string_field, string_list, DetailStore};
use crate::errors::{IdentifierKind, PolicyError, ReconcileError, ResolutionError};
use crate::nutanix::types::{ClusterInfo, ImageInfo, TimestampedEntity};
use crate::nutanix::ProvisioningApi;
use tracing::{debug, warn};

/// Exact-name cluster lookup.
#[must_use]
pub fn select_cluster<'a>(clusters: &'a [ClusterInfo], name: &str) -> Option<&'a ClusterInfo> {
    clusters.iter().find(|cluster| cluster.name == name)
}

/// Newest candidate whose name contains `partial`, ignoring case.
///
/// Candidates with an empty name never match.
#[must_use]
pub fn select_latest<'a, T: TimestampedEntity>(
    candidates: &'a [T],
    partial: &str,
) -> Option<&'a T> {
    let needle = partial.to_lowercase();

    candidates
        .iter()
        .filter(|candidate| {
            !candidate.name().is_empty() && candidate.name().to_lowercase().contains(&needle)
        })
        .fold(None, |latest: Option<&T>, candidate| match latest {
            Some(current) if candidate.created_time() <= current.created_time() => Some(current),
            _ => Some(candidate),
        })
}

/// Enforce a subnet's repo allow-list. `None` allows every repo.
///
/// # Errors
///
/// Returns [`PolicyError::SubnetNotAuthorized`] when a list is given and
/// `repo` is unset or absent from it.
pub fn check_subnet_access(
    subnet: &str,
    repo: Option<&str>,
    allowed: Option<&[String]>,
) -> Result<(), PolicyError> {
    let Some(allowed) = allowed else {
        return Ok(());
    };

    match repo {
        Some(repo) if allowed.iter().any(|r| r == repo) => Ok(()),
        _ => Err(PolicyError::SubnetNotAuthorized {
            subnet: subnet.to_string(),
            repo: repo.unwrap_or_default().to_string(),
            allowed: allowed.to_vec(),
        }),
    }
}

/// Fail unless cluster, boot image and subnet UUIDs are all known.
///
/// # Errors
///
/// Returns [`ResolutionError::MissingIdentifier`] for the first missing kind.
pub fn ensure_complete(spec: &VirtualMachineSpec) -> Result<(), ResolutionError> {
    let checks = [
        (IdentifierKind::Cluster, spec.cluster_uuid()),
        (IdentifierKind::Image, spec.image_uuid()),
        (IdentifierKind::Subnet, spec.subnet_uuid()),
    ];

    match checks.iter().find(|(_, uuid)| uuid.is_none()) {
        Some((kind, _)) => Err(ResolutionError::MissingIdentifier { kind: *kind }),
        None => Ok(()),
    }
}

/// Fill every unset UUID of `spec` whose name is set.
///
/// Only `spec` is changed; persisting the result is up to the caller. The image
/// list is fetched at most once and shared by the boot disk and additional disks.
///
/// # Errors
///
/// Returns [`ResolutionError::NotFound`] when a name matches nothing,
/// [`PolicyError::SubnetNotAuthorized`] when the repo may not use the resolved
/// subnet, or any provisioning API error from the list calls.
pub async fn resolve_identifiers(
    api: &dyn ProvisioningApi,
    details: &dyn DetailStore,
    repo: Option<&str>,
    spec: &mut VirtualMachineSpec,
) -> Result<(), ReconcileError> {
    if spec.cluster_uuid().is_none() {
        if let Some(name) = spec.cluster_name().map(str::to_string) {
            spec.cluster_uuid = Some(resolve_cluster(api, details, &name).await?);
        }
    }

    let mut images: Option<Vec<ImageInfo>> = None;

    if spec.image_uuid().is_none() {
        if let Some(name) = spec.image_name().map(str::to_string) {
            spec.image_uuid = Some(resolve_image(api, &mut images, &name).await?);
        }
    }

    if spec.subnet_uuid().is_none() {
        if let Some(name) = spec.subnet_name().map(str::to_string) {
            spec.subnet_uuid = Some(resolve_subnet(api, details, repo, &name).await?);
        }
    }

    for disk in &mut spec.additional_disks {
        if disk.image_uuid().is_some() {
            continue;
        }
        if let Some(name) = disk.image_name().map(str::to_string) {
            disk.image_uuid = Some(resolve_image(api, &mut images, &name).await?);
        }
    }

    Ok(())
}

async fn resolve_cluster(
    api: &dyn ProvisioningApi,
    details: &dyn DetailStore,
    name: &str,
) -> Result<String, ReconcileError> {
    match details.lookup(DETAIL_KIND_CLUSTER, name).await {
        Ok(record) => match string_field(&record, DETAIL_FIELD_UUID) {
            Ok(uuid) if !uuid.is_empty() => {
                debug!(cluster = %name, uuid = %uuid, "Resolved cluster from detail record");
                return Ok(uuid.to_string());
            }
            Ok(_) => debug!(cluster = %name, "Cluster detail record has an empty uuid"),
            Err(e) => debug!(cluster = %name, error = %e, "Cluster detail record unusable"),
        },
        Err(e) => debug!(cluster = %name, error = %e, "No cluster detail record"),
    }

    let clusters = api.list_clusters().await?;
    let cluster = select_cluster(&clusters, name).ok_or_else(|| ResolutionError::NotFound {
        kind: IdentifierKind::Cluster,
        name: name.to_string(),
    })?;

    debug!(cluster = %name, uuid = %cluster.uuid, "Resolved cluster by name");
    Ok(cluster.uuid.clone())
}

async fn resolve_image(
    api: &dyn ProvisioningApi,
    cache: &mut Option<Vec<ImageInfo>>,
    name: &str,
) -> Result<String, ReconcileError> {
    if cache.is_none() {
        *cache = Some(api.list_images().await?);
    }
    let images = cache.as_deref().unwrap_or(&[]);

    let image = select_latest(images, name).ok_or_else(|| ResolutionError::NotFound {
        kind: IdentifierKind::Image,
        name: name.to_string(),
    })?;

    debug!(
        requested = %name,
        image = %image.name,
        uuid = %image.uuid,
        "Resolved image by name"
    );
    Ok(image.uuid.clone())
}

async fn resolve_subnet(
    api: &dyn ProvisioningApi,
    details: &dyn DetailStore,
    repo: Option<&str>,
    name: &str,
) -> Result<String, ReconcileError> {
    let subnets = api.list_subnets().await?;
    let subnet = select_latest(&subnets, name).ok_or_else(|| ResolutionError::NotFound {
        kind: IdentifierKind::Subnet,
        name: name.to_string(),
    })?;

    match details.lookup(DETAIL_KIND_NETWORK, &subnet.name).await {
        Ok(record) => {
            let allowed = string_list(&record, DETAIL_FIELD_ALLOWED_REPOS);
            check_subnet_access(&subnet.name, repo, allowed.as_deref())?;
        }
        Err(e) => warn!(
            subnet = %subnet.name,
            error = %e,
            "Subnet policy record unavailable, allowing access"
        ),
    }

    debug!(
        requested = %name,
        subnet = %subnet.name,
        uuid = %subnet.uuid,
        "Resolved subnet by name"
    );
    Ok(subnet.uuid.clone())
}

#[cfg(test)]
#[path = "resolution_tests.rs"]
mod resolution_tests;
