// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Types shared by the `VirtualMachine` reconciliation stages.

use crate::nutanix::types::{CredentialPayload, VmInfo};

/// Policy-checked request fields. `None` means the field was unset or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Line of business
    pub lob: Option<String>,
    /// Datacenter, guaranteed to be a key of `prismCentralEndpoints` when set
    pub datacenter: Option<String>,
}

/// Where and as whom to talk to Prism Central.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedConnection {
    pub endpoint: String,
    pub credentials: CredentialPayload,
}

/// The single lifecycle transition taken by a reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// The resource carries a deletion timestamp.
    Delete,
    /// No backend VM identifier has been recorded yet.
    Create,
    /// The VM exists; confirm it is still there.
    Observe,
}

/// What a reconcile pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The `VirtualMachine` no longer exists. Nothing to do.
    NotFound,
    /// The backend VM was deleted and the finalizer released.
    Deleted,
    /// A backend VM was created.
    Created { vm_id: String },
    /// An existing backend VM was observed.
    Observed { vm: VmInfo },
}
