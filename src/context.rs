// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the `VirtualMachine` controller.
//!
//! The controller hands every reconcile an `Arc<Context>` holding the
//! collaborators a pass talks to:
//! - the Kubernetes-backed [`ResourceStore`]
//! - the [`ProvisioningConnector`] that opens Prism Central sessions
//! - the [`DetailStore`] holding cluster and network detail records
//! - an HTTP client for the availability zone feed
//!
//! Nothing in the context is mutated by a reconcile.

use crate::constants::DEFAULT_PROVIDER_CONFIG_NAME;
use crate::details::DetailStore;
use crate::nutanix::ProvisioningConnector;
use crate::store::ResourceStore;
use std::sync::Arc;

/// Shared context passed to the controller.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes reads and writes
    pub store: Arc<dyn ResourceStore>,

    /// Opens Prism Central sessions for a routed endpoint
    pub connector: Arc<dyn ProvisioningConnector>,

    /// Cluster and network detail records
    pub details: Arc<dyn DetailStore>,

    /// HTTP client for the availability zone feed
    pub http_client: reqwest::Client,

    /// Name of the `ProviderConfig` every VM is reconciled against
    pub provider_config_name: String,
}

impl Context {
    /// Create a context using the `default` `ProviderConfig`.
    #[must_use]
    pub fn new(
        store: Arc<dyn ResourceStore>,
        connector: Arc<dyn ProvisioningConnector>,
        details: Arc<dyn DetailStore>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            store,
            connector,
            details,
            http_client,
            provider_config_name: DEFAULT_PROVIDER_CONFIG_NAME.to_string(),
        }
    }

    /// Use a different `ProviderConfig`.
    #[must_use]
    pub fn with_provider_config_name(mut self, name: impl Into<String>) -> Self {
        self.provider_config_name = name.into();
        self
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
