// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation for Nutanix virtual machines.
//!
//! # Reconciliation Architecture
//!
//! The provider follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor `VirtualMachine` changes via the Kubernetes API
//! 2. **Reconcile** - Compare the desired VM with what Prism Central reports
//! 3. **Act** - Create, observe or delete the backend VM
//! 4. **Status** - Report the result back on the `Ready` condition
//!
//! # Example: Using the Reconciler
//!
//! ```rust,no_run
//! use nutanix_provider::context::Context;
//! use nutanix_provider::reconcilers::reconcile_virtual_machine;
//!
//! async fn reconcile(ctx: &Context) -> anyhow::Result<()> {
//!     let outcome = reconcile_virtual_machine(ctx, "team-a", "web-01").await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod finalizers;
pub mod status;
pub mod virtualmachine;

pub use virtualmachine::{reconcile_virtual_machine, LifecycleAction, ReconcileOutcome};
