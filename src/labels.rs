// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label, annotation and finalizer constants used by the reconcilers.

// ============================================================================
// Provider-Specific Labels
// ============================================================================

/// Label on a `VirtualMachine` naming the repo that owns it.
///
/// Subnets whose detail record declares `allowed_repos` only accept VMs whose
/// `repo` label appears in that list.
pub const REPO_LABEL: &str = "repo";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer for `VirtualMachine` resources
pub const FINALIZER_VIRTUAL_MACHINE: &str = "nutanix.crossplane.io/virtualmachine-finalizer";

// ============================================================================
// Field Managers
// ============================================================================

/// Field manager used for patches issued by the controller
pub const FIELD_MANAGER: &str = "nutanix-provider";
