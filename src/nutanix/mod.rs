// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Nutanix Prism Central provisioning API.
//!
//! The reconciler depends only on the [`ProvisioningApi`] contract. A
//! [`ProvisioningConnector`] builds an API handle for the endpoint and
//! credentials selected for a VM; in production that is [`PrismConnector`],
//! which talks to the Prism Central v3 REST API through [`client::PrismClient`].
//!
//! # Example
//!
//! ```rust,no_run
//! use nutanix_provider::nutanix::{PrismConnector, ProvisioningConnector};
//! use nutanix_provider::nutanix::types::CredentialPayload;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = CredentialPayload {
//!     username: "admin".into(),
//!     password: "secret".into(),
//!     ..Default::default()
//! };
//! let api = PrismConnector.connect("https://pc.example.com:9440", &credentials)?;
//! for image in api.list_images().await? {
//!     println!("{} {}", image.name, image.uuid);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod types;

use crate::errors::ProviderApiError;
use async_trait::async_trait;
use types::{ClusterInfo, CredentialPayload, ImageInfo, SubnetInfo, VmCreateRequest, VmInfo};

/// Operations the reconciler issues against the provisioning backend.
///
/// Implementations neither retry nor cache; every call goes to the backend and
/// any failure is returned as-is.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    async fn list_clusters(&self) -> Result<Vec<ClusterInfo>, ProviderApiError>;

    async fn list_images(&self) -> Result<Vec<ImageInfo>, ProviderApiError>;

    async fn list_subnets(&self) -> Result<Vec<SubnetInfo>, ProviderApiError>;

    /// Create a VM and return its backend identifier.
    async fn create_vm(&self, request: &VmCreateRequest) -> Result<String, ProviderApiError>;

    async fn get_vm(&self, vm_id: &str) -> Result<VmInfo, ProviderApiError>;

    /// Delete a VM. Deleting an empty or unknown identifier succeeds.
    async fn delete_vm(&self, vm_id: &str) -> Result<(), ProviderApiError>;
}

/// Builds a [`ProvisioningApi`] for an endpoint and credential pair.
pub trait ProvisioningConnector: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ProviderApiError::InvalidEndpoint`] if no client can be built
    /// for the endpoint.
    fn connect(
        &self,
        endpoint: &str,
        credentials: &CredentialPayload,
    ) -> Result<Box<dyn ProvisioningApi>, ProviderApiError>;
}

/// Connector producing [`client::PrismClient`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrismConnector;

impl ProvisioningConnector for PrismConnector {
    fn connect(
        &self,
        endpoint: &str,
        credentials: &CredentialPayload,
    ) -> Result<Box<dyn ProvisioningApi>, ProviderApiError> {
        Ok(Box::new(client::PrismClient::new(endpoint, credentials)?))
    }
}
