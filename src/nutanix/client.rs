// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prism Central v3 REST client.
//!
//! All requests use HTTP basic authentication. List endpoints are paged with
//! `offset`/`length` until `metadata.total_matches` entities have been read.

use super::types::{
    ClusterInfo, CredentialPayload, DiskSpec, ImageInfo, SubnetInfo, VmCreateRequest, VmInfo,
};
use super::ProvisioningApi;
use crate::constants::{PRISM_API_BASE_PATH, PRISM_DEFAULT_PORT, PRISM_LIST_PAGE_LENGTH};
use crate::errors::ProviderApiError;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

/// Build the v3 API base URL from an endpoint.
///
/// Accepts `https://host:port`, `host:port` or a bare `host`. A missing scheme
/// defaults to `https` and a bare host gets the Prism Central port 9440.
///
/// # Errors
///
/// Returns [`ProviderApiError::InvalidEndpoint`] if the endpoint is empty or
/// does not parse as a URL.
pub fn build_base_url(endpoint: &str) -> Result<Url, ProviderApiError> {
    let invalid = |reason: String| ProviderApiError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("endpoint is empty".to_string()));
    }

    let has_scheme = trimmed.contains("://");
    let candidate = if has_scheme {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    if !has_scheme && url.port().is_none() && !trimmed.ends_with(":443") {
        url.set_port(Some(PRISM_DEFAULT_PORT))
            .map_err(|()| invalid("cannot set port".to_string()))?;
    }
    url.set_path(&format!("{PRISM_API_BASE_PATH}/"));

    Ok(url)
}

/// Parse a Prism RFC3339 timestamp into Unix seconds. Unparseable or missing
/// values sort as oldest.
fn unix_seconds(timestamp: Option<&str>) -> i64 {
    timestamp
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map_or(0, |t| t.timestamp())
}

#[derive(Debug, Default, Deserialize)]
struct ListResponse {
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    metadata: ListMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct ListMetadata {
    #[serde(default)]
    total_matches: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct Entity {
    #[serde(default)]
    metadata: EntityMetadata,
    #[serde(default)]
    spec: Option<NamedSection>,
    #[serde(default)]
    status: Option<NamedSection>,
}

#[derive(Debug, Default, Deserialize)]
struct EntityMetadata {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    creation_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NamedSection {
    #[serde(default)]
    name: Option<String>,
}

impl Entity {
    fn name(&self) -> String {
        self.status
            .as_ref()
            .and_then(|s| s.name.clone())
            .or_else(|| self.spec.as_ref().and_then(|s| s.name.clone()))
            .unwrap_or_default()
    }

    fn created_time(&self) -> i64 {
        unix_seconds(self.metadata.creation_time.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
struct VmResponse {
    #[serde(default)]
    metadata: EntityMetadata,
    #[serde(default)]
    status: Option<VmStatusSection>,
}

#[derive(Debug, Default, Deserialize)]
struct VmStatusSection {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    resources: Option<VmResources>,
}

#[derive(Debug, Default, Deserialize)]
struct VmResources {
    #[serde(default)]
    power_state: Option<String>,
}

fn disk_body(disk: &DiskSpec) -> Result<Value, ProviderApiError> {
    let mut body = json!({
        "device_properties": {
            "device_type": "DISK",
            "disk_address": {
                "adapter_type": "SCSI",
                "device_index": disk.device_index,
            },
        },
    });
    if let Some(size_gb) = disk.size_gb {
        let size_mib = size_gb
            .checked_mul(1024)
            .ok_or_else(|| ProviderApiError::InvalidRequest {
                operation: "create VM".to_string(),
                reason: format!(
                    "disk {} size {size_gb} GiB is out of range",
                    disk.device_index
                ),
            })?;
        body["disk_size_mib"] = json!(size_mib);
    }
    if let Some(image_uuid) = &disk.image_uuid {
        body["data_source_reference"] = json!({"kind": "image", "uuid": image_uuid});
    }
    Ok(body)
}

/// Render the v3 create-VM body.
///
/// # Errors
///
/// Returns [`ProviderApiError::InvalidRequest`] if a disk size does not fit in
/// MiB.
pub fn create_vm_body(request: &VmCreateRequest) -> Result<Value, ProviderApiError> {
    let disks = request
        .disks
        .iter()
        .map(disk_body)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "api_version": "3.1.0",
        "metadata": {
            "kind": "vm",
            "categories": request.external_facts,
        },
        "spec": {
            "name": request.name,
            "cluster_reference": {"kind": "cluster", "uuid": request.cluster_uuid},
            "resources": {
                "num_sockets": request.num_vcpus,
                "num_vcpus_per_socket": 1,
                "memory_size_mib": request.memory_size_mib,
                "disk_list": disks,
                "nic_list": [
                    {"subnet_reference": {"kind": "subnet", "uuid": request.subnet_uuid}}
                ],
            },
        },
    }))
}

/// Prism Central v3 client bound to one endpoint and credential set.
#[derive(Clone)]
pub struct PrismClient {
    http: HttpClient,
    base_url: Url,
    username: String,
    password: String,
}

impl std::fmt::Debug for PrismClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrismClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl PrismClient {
    /// Create a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderApiError::InvalidEndpoint`] if the endpoint does not
    /// parse or the HTTP client cannot be built.
    pub fn new(endpoint: &str, credentials: &CredentialPayload) -> Result<Self, ProviderApiError> {
        let base_url = build_base_url(endpoint)?;
        let http = HttpClient::builder()
            .danger_accept_invalid_certs(credentials.insecure)
            .build()
            .map_err(|e| ProviderApiError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, operation: &str, relative: &str) -> Result<Url, ProviderApiError> {
        self.base_url
            .join(relative)
            .map_err(|e| ProviderApiError::Transport {
                operation: operation.to_string(),
                reason: e.to_string(),
            })
    }

    async fn send(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<Response, ProviderApiError> {
        request
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| {
                error!(operation = %operation, error = %e, "Prism Central request failed");
                ProviderApiError::Transport {
                    operation: operation.to_string(),
                    reason: e.to_string(),
                }
            })
    }

    async fn expect_success(
        operation: &str,
        response: Response,
    ) -> Result<Response, ProviderApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(
            operation = %operation,
            status = %status,
            error = %body,
            "Prism Central returned an error"
        );
        Err(ProviderApiError::UnexpectedStatus {
            operation: operation.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<T, ProviderApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderApiError::Decode {
                operation: operation.to_string(),
                reason: e.to_string(),
            })
    }

    /// List every entity of `kind`, following pagination.
    async fn list_entities(&self, kind: &str) -> Result<Vec<Entity>, ProviderApiError> {
        let operation = format!("list {kind}s");
        let url = self.url(&operation, &format!("{kind}s/list"))?;

        let mut entities = Vec::new();
        let mut page_count = 0;
        loop {
            page_count += 1;
            let body = json!({
                "kind": kind,
                "offset": entities.len(),
                "length": PRISM_LIST_PAGE_LENGTH,
            });
            let response = self
                .send(&operation, self.http.post(url.clone()).json(&body))
                .await?;
            let response = Self::expect_success(&operation, response).await?;
            let page: ListResponse = Self::decode(&operation, response).await?;

            let page_len = page.entities.len();
            entities.extend(page.entities);

            debug!(
                kind = %kind,
                page = page_count,
                items_in_page = page_len,
                total_items = entities.len(),
                "Fetched page from Prism Central"
            );

            let total = page.metadata.total_matches.unwrap_or(0);
            if page_len == 0 || entities.len() >= total {
                break;
            }
        }

        Ok(entities)
    }
}

#[async_trait]
impl ProvisioningApi for PrismClient {
    async fn list_clusters(&self) -> Result<Vec<ClusterInfo>, ProviderApiError> {
        Ok(self
            .list_entities("cluster")
            .await?
            .into_iter()
            .map(|e| ClusterInfo {
                name: e.name(),
                uuid: e.metadata.uuid,
            })
            .collect())
    }

    async fn list_images(&self) -> Result<Vec<ImageInfo>, ProviderApiError> {
        Ok(self
            .list_entities("image")
            .await?
            .into_iter()
            .map(|e| ImageInfo {
                name: e.name(),
                created_time: e.created_time(),
                uuid: e.metadata.uuid,
            })
            .collect())
    }

    async fn list_subnets(&self) -> Result<Vec<SubnetInfo>, ProviderApiError> {
        Ok(self
            .list_entities("subnet")
            .await?
            .into_iter()
            .map(|e| SubnetInfo {
                name: e.name(),
                created_time: e.created_time(),
                uuid: e.metadata.uuid,
            })
            .collect())
    }

    async fn create_vm(&self, request: &VmCreateRequest) -> Result<String, ProviderApiError> {
        let operation = "create VM";
        let url = self.url(operation, "vms")?;

        info!(
            vm_name = %request.name,
            cluster_uuid = %request.cluster_uuid,
            subnet_uuid = %request.subnet_uuid,
            disks = request.disks.len(),
            "Creating VM on Prism Central"
        );

        let body = create_vm_body(request)?;
        let response = self
            .send(operation, self.http.post(url).json(&body))
            .await?;
        let response = Self::expect_success(operation, response).await?;
        let created: VmResponse = Self::decode(operation, response).await?;

        if created.metadata.uuid.is_empty() {
            return Err(ProviderApiError::Decode {
                operation: operation.to_string(),
                reason: "response carries no metadata.uuid".to_string(),
            });
        }
        Ok(created.metadata.uuid)
    }

    async fn get_vm(&self, vm_id: &str) -> Result<VmInfo, ProviderApiError> {
        let operation = "get VM";
        let url = self.url(operation, &format!("vms/{vm_id}"))?;

        let response = self.send(operation, self.http.get(url)).await?;
        let response = Self::expect_success(operation, response).await?;
        let vm: VmResponse = Self::decode(operation, response).await?;

        let status = vm.status.unwrap_or_default();
        Ok(VmInfo {
            uuid: vm.metadata.uuid,
            name: status.name.unwrap_or_default(),
            state: status.state,
            power_state: status.resources.and_then(|r| r.power_state),
        })
    }

    async fn delete_vm(&self, vm_id: &str) -> Result<(), ProviderApiError> {
        if vm_id.is_empty() {
            debug!("No VM identifier recorded, nothing to delete");
            return Ok(());
        }

        let operation = "delete VM";
        let url = self.url(operation, &format!("vms/{vm_id}"))?;
        let response = self.send(operation, self.http.delete(url)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            info!(vm_id = %vm_id, "VM already absent from Prism Central");
            return Ok(());
        }
        Self::expect_success(operation, response).await?;

        info!(vm_id = %vm_id, "Deleted VM on Prism Central");
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
