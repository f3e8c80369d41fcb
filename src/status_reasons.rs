// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition reasons for `VirtualMachine` resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition
//! has a particular status. Every `VirtualMachine` carries a single encompassing
//! `type: Ready` condition.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   vmId: 6a1f0b3e-2c4d-4b8a-9f11-0d2e5c7a9b10
//!   state: Created
//!   conditions:
//!     - type: Ready
//!       status: "False"
//!       reason: PolicyViolation
//!       message: "line of business 'ops' is not allowed. Allowed values: [\"eng\", \"qa\"]"
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// Encompassing readiness condition type.
pub const CONDITION_TYPE_READY: &str = "Ready";

// ============================================================================
// Success Reasons
// ============================================================================

/// The VM was just created on Prism Central.
pub const REASON_CREATED: &str = "Created";

/// The VM exists on Prism Central and answered the last observe call.
pub const REASON_AVAILABLE: &str = "Available";

// ============================================================================
// Failure Reasons
// ============================================================================

/// The `ProviderConfig` is missing or incomplete.
pub const REASON_CONFIGURATION_INVALID: &str = "ConfigurationInvalid";

/// Business-unit or datacenter allow-list violation.
pub const REASON_POLICY_VIOLATION: &str = "PolicyViolation";

/// The requested availability zone is unknown or disabled.
pub const REASON_ZONE_NOT_ALLOWED: &str = "ZoneNotAllowed";

/// The VM's repo is not allowed on the resolved subnet.
pub const REASON_SUBNET_NOT_AUTHORIZED: &str = "SubnetNotAuthorized";

/// The availability zone feed could not be fetched or parsed.
pub const REASON_ZONE_MAPPING_FAILED: &str = "ZoneMappingFailed";

/// A cluster, image or subnet name did not resolve to a UUID.
pub const REASON_RESOLUTION_FAILED: &str = "ResolutionFailed";

/// Credentials could not be selected, fetched or decoded.
pub const REASON_CREDENTIALS_INVALID: &str = "CredentialsInvalid";

/// Prism Central rejected a request or could not be reached.
pub const REASON_PROVIDER_API_ERROR: &str = "ProviderApiError";

/// Reading or writing a Kubernetes object failed.
pub const REASON_KUBERNETES_API_ERROR: &str = "KubernetesApiError";

#[cfg(test)]
#[path = "status_reasons_tests.rs"]
mod status_reasons_tests;
