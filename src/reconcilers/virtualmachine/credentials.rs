// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential and endpoint routing.
//!
//! Credentials and endpoint are chosen independently:
//! - credentials come from `datacenterCredentials[dc]` when present, otherwise
//!   from the default `credentials`
//! - the endpoint is `prismCentralEndpoints[dc]` when a datacenter is named,
//!   otherwise the `endpoint` embedded in the decoded secret payload
//!
//! Only the `Secret` credentials source is implemented.

use super::types::RoutedConnection;
use crate::crd::{CredentialsSource, ProviderConfigSpec, ProviderCredentials, SecretKeySelector};
use crate::errors::{CredentialError, ReconcileError};
use crate::nutanix::types::CredentialPayload;
use crate::store::ResourceStore;
use k8s_openapi::api::core::v1::Secret;
use tracing::debug;

/// Pick the credentials for a datacenter, falling back to the default set.
#[must_use]
pub fn select_credentials<'a>(
    policy: &'a ProviderConfigSpec,
    datacenter: Option<&str>,
) -> &'a ProviderCredentials {
    datacenter
        .and_then(|dc| policy.datacenter_credentials.get(dc))
        .unwrap_or(&policy.credentials)
}

/// The secret reference of a `Secret`-sourced credential set.
///
/// # Errors
///
/// Rejects every other source, and a `Secret` source without `secretRef`.
pub fn secret_reference(
    credentials: &ProviderCredentials,
) -> Result<&SecretKeySelector, CredentialError> {
    match credentials.source {
        CredentialsSource::Secret => credentials
            .secret_ref
            .as_ref()
            .ok_or(CredentialError::MissingSecretRef),
        other => Err(CredentialError::UnsupportedCredentialSource {
            credential_source: other,
        }),
    }
}

/// Decode the JSON credential payload stored under the selector's key.
///
/// # Errors
///
/// Returns [`CredentialError::SecretKeyMissing`] when the key is absent and
/// [`CredentialError::SecretDecodeError`] when the value is not a valid payload.
pub fn decode_secret_payload(
    secret: &Secret,
    selector: &SecretKeySelector,
) -> Result<CredentialPayload, CredentialError> {
    let raw = secret
        .data
        .as_ref()
        .and_then(|data| data.get(&selector.key))
        .ok_or_else(|| CredentialError::SecretKeyMissing {
            namespace: selector.namespace.clone(),
            name: selector.name.clone(),
            key: selector.key.clone(),
        })?;

    serde_json::from_slice(&raw.0).map_err(|e| CredentialError::SecretDecodeError {
        namespace: selector.namespace.clone(),
        name: selector.name.clone(),
        key: selector.key.clone(),
        reason: e.to_string(),
    })
}

/// Pick the Prism Central endpoint.
///
/// # Errors
///
/// Returns [`CredentialError::DatacenterEndpointMissing`] if the datacenter has no
/// endpoint, or [`CredentialError::NoEndpointResolvable`] if no datacenter was
/// named and the payload carries no endpoint either.
pub fn select_endpoint(
    policy: &ProviderConfigSpec,
    datacenter: Option<&str>,
    payload: &CredentialPayload,
) -> Result<String, CredentialError> {
    match datacenter {
        Some(dc) => policy
            .prism_central_endpoints
            .get(dc)
            .cloned()
            .ok_or_else(|| CredentialError::DatacenterEndpointMissing {
                datacenter: dc.to_string(),
            }),
        None if !payload.endpoint.trim().is_empty() => Ok(payload.endpoint.clone()),
        None => Err(CredentialError::NoEndpointResolvable),
    }
}

/// Resolve the endpoint and decoded credentials for a validated datacenter.
///
/// # Errors
///
/// Returns a [`CredentialError`] for routing failures, or a Kubernetes error if
/// the secret could not be read.
pub async fn route(
    store: &dyn ResourceStore,
    policy: &ProviderConfigSpec,
    datacenter: Option<&str>,
) -> Result<RoutedConnection, ReconcileError> {
    let selector = secret_reference(select_credentials(policy, datacenter))?;

    let secret = store
        .get_secret(&selector.namespace, &selector.name)
        .await?
        .ok_or_else(|| CredentialError::SecretNotFound {
            namespace: selector.namespace.clone(),
            name: selector.name.clone(),
        })?;

    let credentials = decode_secret_payload(&secret, selector)?;
    let endpoint = select_endpoint(policy, datacenter, &credentials)?;

    debug!(
        datacenter = ?datacenter,
        secret = %format!("{}/{}", selector.namespace, selector.name),
        endpoint = %endpoint,
        "Routed Prism Central connection"
    );

    Ok(RoutedConnection {
        endpoint,
        credentials,
    })
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod credentials_tests;
