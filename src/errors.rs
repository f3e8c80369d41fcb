// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for VM reconciliation.
//!
//! Errors are grouped by the stage of the reconcile pass that raises them:
//! - Provider configuration problems ([`ConfigurationError`])
//! - Business-unit, datacenter, zone and subnet policy violations ([`PolicyError`])
//! - Availability zone feed failures ([`ZoneMappingError`])
//! - Name to UUID resolution failures ([`ResolutionError`])
//! - Credential selection and secret decoding ([`CredentialError`])
//! - Prism Central API failures ([`ProviderApiError`])
//!
//! [`ReconcileError`] is the umbrella type returned by the reconciler. Nothing in
//! the reconcile pass retries; every error aborts the pass and is handed back to
//! the controller, which owns requeue scheduling.

use crate::crd::CredentialsSource;
use crate::status_reasons;
use std::fmt;
use thiserror::Error;

/// The three identifier kinds resolved before a VM can be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Cluster,
    Image,
    Subnet,
}

impl IdentifierKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Cluster => "cluster",
            IdentifierKind::Image => "image",
            IdentifierKind::Subnet => "subnet",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problems with the provider configuration itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The `ProviderConfig` every reconcile depends on does not exist.
    #[error("ProviderConfig '{name}' not found")]
    MissingProviderConfig {
        /// Name of the missing `ProviderConfig`
        name: String,
    },

    /// Zone mapping is switched on but no feed URL was configured.
    #[error("availability zone mapping is enabled but availabilityZoneMappingURL is empty")]
    MissingZoneFeedUrl,
}

/// Organizational policy violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("line of business is mandatory but not specified")]
    MissingBusinessUnit,

    #[error("line of business '{lob}' is not allowed. Allowed values: {allowed:?}")]
    BusinessUnitNotAllowed { lob: String, allowed: Vec<String> },

    /// A datacenter was requested but the provider lists no datacenters at all.
    #[error("datacenter '{datacenter}' requested but no Prism Central endpoints are configured")]
    NoDatacentersConfigured { datacenter: String },

    #[error("datacenter '{datacenter}' is not allowed. Allowed values: {allowed:?}")]
    DatacenterNotAllowed {
        datacenter: String,
        allowed: Vec<String>,
    },

    /// The zone does not appear in the feed. `known` lists every zone the feed carries.
    #[error("availability zone '{zone}' not recognized. Allowed values: {known:?}")]
    UnknownZone { zone: String, known: Vec<String> },

    #[error("availability zone '{zone}' is disabled")]
    ZoneDisabled { zone: String },

    /// The subnet's detail record restricts it to a set of repos.
    #[error("repo '{repo}' is not authorized to use subnet '{subnet}'. Allowed repos: {allowed:?}")]
    SubnetNotAuthorized {
        subnet: String,
        repo: String,
        allowed: Vec<String>,
    },
}

/// Failures while loading the availability zone feed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZoneMappingError {
    #[error("failed to fetch availability zone mapping from {url}: {reason}")]
    FeedError { url: String, reason: String },

    #[error("invalid availability zone mapping: {reason}")]
    SchemaError { reason: String },

    /// Zone is enabled in the feed yet has no cluster. Not reachable for
    /// mappings built by `parse_zone_mapping`.
    #[error("availability zone '{zone}' is enabled but has no cluster mapping")]
    InternalInconsistency { zone: String },
}

/// Name to UUID resolution failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("no {kind} found matching name '{name}'")]
    NotFound { kind: IdentifierKind, name: String },

    /// Neither a UUID nor a resolvable name was given.
    #[error("{kind} UUID is required to create the VM but neither a UUID nor a name was given")]
    MissingIdentifier { kind: IdentifierKind },
}

/// Credential selection, secret retrieval and endpoint routing failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CredentialError {
    #[error("credentials source '{credential_source}' is not supported, only 'Secret' is")]
    UnsupportedCredentialSource { credential_source: CredentialsSource },

    #[error("credentials source is 'Secret' but no secretRef is set")]
    MissingSecretRef,

    #[error("secret {namespace}/{name} not found")]
    SecretNotFound { namespace: String, name: String },

    #[error("secret {namespace}/{name} has no key '{key}'")]
    SecretKeyMissing {
        namespace: String,
        name: String,
        key: String,
    },

    #[error("failed to decode key '{key}' of secret {namespace}/{name}: {reason}")]
    SecretDecodeError {
        namespace: String,
        name: String,
        key: String,
        reason: String,
    },

    #[error("no Prism Central endpoint configured for datacenter '{datacenter}'")]
    DatacenterEndpointMissing { datacenter: String },

    #[error("no datacenter specified and the credentials carry no endpoint")]
    NoEndpointResolvable,
}

/// Failures reported by, or while talking to, Prism Central.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderApiError {
    /// The client could not be built for the endpoint.
    #[error("invalid Prism Central endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("{operation} request failed: {reason}")]
    Transport { operation: String, reason: String },

    #[error("{operation} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode {operation} response: {reason}")]
    Decode { operation: String, reason: String },

    /// The request could not be rendered for the API.
    #[error("invalid {operation} request: {reason}")]
    InvalidRequest { operation: String, reason: String },
}

/// Detail record lookup failures. These never abort a reconcile: cluster
/// lookups fall back to listing and subnet policy lookups fail open.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetailError {
    #[error("no {kind} detail record for '{name}'")]
    NotFound { kind: String, name: String },

    #[error("failed to read detail record {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse detail record {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("detail record has no field '{field}'")]
    MissingField { field: String },

    #[error("detail record field '{field}' is not a string")]
    NotAString { field: String },
}

/// Umbrella error returned by a reconcile pass.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    ZoneMapping(#[from] ZoneMappingError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    ProviderApi(#[from] ProviderApiError),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

impl ReconcileError {
    /// Short category label, used as the `category` metric label.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Policy(_) => "policy",
            Self::ZoneMapping(_) => "zone_mapping",
            Self::Resolution(_) => "resolution",
            Self::Credential(_) => "credential",
            Self::ProviderApi(_) => "provider_api",
            Self::Kube(_) => "kubernetes",
        }
    }

    /// Condition reason reported on the `Ready=False` condition.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Configuration(_) => status_reasons::REASON_CONFIGURATION_INVALID,
            Self::Policy(PolicyError::UnknownZone { .. } | PolicyError::ZoneDisabled { .. }) => {
                status_reasons::REASON_ZONE_NOT_ALLOWED
            }
            Self::Policy(PolicyError::SubnetNotAuthorized { .. }) => {
                status_reasons::REASON_SUBNET_NOT_AUTHORIZED
            }
            Self::Policy(_) => status_reasons::REASON_POLICY_VIOLATION,
            Self::ZoneMapping(_) => status_reasons::REASON_ZONE_MAPPING_FAILED,
            Self::Resolution(_) => status_reasons::REASON_RESOLUTION_FAILED,
            Self::Credential(_) => status_reasons::REASON_CREDENTIALS_INVALID,
            Self::ProviderApi(_) => status_reasons::REASON_PROVIDER_API_ERROR,
            Self::Kube(_) => status_reasons::REASON_KUBERNETES_API_ERROR,
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
