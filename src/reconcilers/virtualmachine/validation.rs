// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Business-unit and datacenter admission checks.
//!
//! Rules run in order and the first violation wins:
//! 1. A mandatory line of business must be present.
//! 2. A present line of business must be in `allowedLobs`.
//! 3. A present datacenter must be a key of `prismCentralEndpoints`.
//!
//! Availability zone and subnet checks live with zone mapping and identifier
//! resolution since they depend on external data.

use super::types::ValidatedRequest;
use crate::crd::{ProviderConfigSpec, VirtualMachineSpec};
use crate::errors::PolicyError;
use tracing::debug;

/// Check a VM request against the provider policy.
///
/// # Errors
///
/// Returns the first [`PolicyError`] the request violates.
pub fn validate(
    spec: &VirtualMachineSpec,
    policy: &ProviderConfigSpec,
) -> Result<ValidatedRequest, PolicyError> {
    let lob = spec.lob();

    if policy.is_lob_mandatory && lob.is_none() {
        return Err(PolicyError::MissingBusinessUnit);
    }

    if let Some(lob) = lob {
        if !policy.allowed_lobs.iter().any(|allowed| allowed == lob) {
            return Err(PolicyError::BusinessUnitNotAllowed {
                lob: lob.to_string(),
                allowed: policy.allowed_lobs.clone(),
            });
        }
    }

    let datacenter = spec.datacenter();
    if let Some(datacenter) = datacenter {
        validate_datacenter(datacenter, policy)?;
    }

    debug!(lob = ?lob, datacenter = ?datacenter, "VM request passed policy validation");

    Ok(ValidatedRequest {
        lob: lob.map(str::to_string),
        datacenter: datacenter.map(str::to_string),
    })
}

fn validate_datacenter(datacenter: &str, policy: &ProviderConfigSpec) -> Result<(), PolicyError> {
    if policy.prism_central_endpoints.is_empty() {
        return Err(PolicyError::NoDatacentersConfigured {
            datacenter: datacenter.to_string(),
        });
    }

    if !policy.prism_central_endpoints.contains_key(datacenter) {
        return Err(PolicyError::DatacenterNotAllowed {
            datacenter: datacenter.to_string(),
            allowed: policy.prism_central_endpoints.keys().cloned().collect(),
        });
    }

    Ok(())
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;
