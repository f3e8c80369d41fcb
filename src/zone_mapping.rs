// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Availability zone to cluster mapping.
//!
//! The mapping is loaded from a CSV feed served over HTTP. The header row must
//! name the columns `Cluster Name`, `AvailabilityZone` and `Enabled` (exact,
//! case-sensitive, any order). Extra columns are ignored.
//!
//! ```text
//! Cluster Name,AvailabilityZone,Enabled,Owner
//! ch01-aza-ntnx-01,aza,enabled,infra
//! ch02-azb-ntnx-01,azb,disabled,infra
//! ```
//!
//! The feed is fetched on every reconcile that needs it and never cached.

use crate::constants::{
    ZONE_FEED_CLUSTER_COLUMN, ZONE_FEED_ENABLED_COLUMN, ZONE_FEED_ENABLED_VALUE,
    ZONE_FEED_ZONE_COLUMN,
};
use crate::errors::{PolicyError, ReconcileError, ZoneMappingError};
use reqwest::Client as HttpClient;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Zone mapping derived from one feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneMapping {
    /// Enabled zones only, zone to cluster name.
    pub zone_to_cluster: BTreeMap<String, String>,
    /// Every zone in the feed, zone to enabled flag.
    pub zone_enabled: BTreeMap<String, bool>,
}

impl ZoneMapping {
    /// Look up the cluster for `zone`.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::UnknownZone`] if the feed does not list the zone
    /// - [`PolicyError::ZoneDisabled`] if the zone is listed but not enabled
    /// - [`ZoneMappingError::InternalInconsistency`] if the zone is enabled but has no cluster
    pub fn cluster_for_zone(&self, zone: &str) -> Result<&str, ReconcileError> {
        match self.zone_enabled.get(zone) {
            None => Err(PolicyError::UnknownZone {
                zone: zone.to_string(),
                known: self.zone_enabled.keys().cloned().collect(),
            }
            .into()),
            Some(false) => Err(PolicyError::ZoneDisabled {
                zone: zone.to_string(),
            }
            .into()),
            Some(true) => self
                .zone_to_cluster
                .get(zone)
                .map(String::as_str)
                .ok_or_else(|| {
                    ZoneMappingError::InternalInconsistency {
                        zone: zone.to_string(),
                    }
                    .into()
                }),
        }
    }
}

/// Parse a CSV zone feed.
///
/// Rows too short to hold the `Enabled` cell, and rows with an empty cluster
/// name or zone, are skipped. A zone is enabled only when its `Enabled` cell is
/// exactly `enabled`.
///
/// # Errors
///
/// Returns [`ZoneMappingError::SchemaError`] if a required column is missing
/// from the header row or the CSV is malformed.
pub fn parse_zone_mapping(data: &[u8]) -> Result<ZoneMapping, ZoneMappingError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| ZoneMappingError::SchemaError {
            reason: format!("failed to read header row: {e}"),
        })?
        .clone();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let (Some(idx_cluster), Some(idx_zone), Some(idx_enabled)) = (
        column(ZONE_FEED_CLUSTER_COLUMN),
        column(ZONE_FEED_ZONE_COLUMN),
        column(ZONE_FEED_ENABLED_COLUMN),
    ) else {
        return Err(ZoneMappingError::SchemaError {
            reason: format!(
                "CSV must have '{ZONE_FEED_CLUSTER_COLUMN}', '{ZONE_FEED_ZONE_COLUMN}', and '{ZONE_FEED_ENABLED_COLUMN}' columns"
            ),
        });
    };

    let mut mapping = ZoneMapping::default();
    for record in reader.records() {
        let record = record.map_err(|e| ZoneMappingError::SchemaError {
            reason: format!("malformed row: {e}"),
        })?;

        if record.len() <= idx_enabled {
            continue;
        }
        let (Some(cluster), Some(zone), Some(enabled)) = (
            record.get(idx_cluster),
            record.get(idx_zone),
            record.get(idx_enabled),
        ) else {
            continue;
        };
        if cluster.is_empty() || zone.is_empty() {
            continue;
        }

        let is_enabled = enabled == ZONE_FEED_ENABLED_VALUE;
        mapping.zone_enabled.insert(zone.to_string(), is_enabled);
        if is_enabled {
            mapping
                .zone_to_cluster
                .insert(zone.to_string(), cluster.to_string());
        }
    }

    debug!(
        zones = mapping.zone_enabled.len(),
        enabled_zones = mapping.zone_to_cluster.len(),
        "Parsed availability zone mapping"
    );

    Ok(mapping)
}

/// Fetch and parse the zone feed at `url`.
///
/// # Errors
///
/// Returns [`ZoneMappingError::FeedError`] on transport failures or non-success
/// HTTP status, and [`ZoneMappingError::SchemaError`] if the feed is malformed.
pub async fn fetch_zone_mapping(
    http: &HttpClient,
    url: &str,
) -> Result<ZoneMapping, ZoneMappingError> {
    let feed_error = |e: reqwest::Error| {
        error!(url = %url, error = %e, "Failed to fetch availability zone mapping");
        ZoneMappingError::FeedError {
            url: url.to_string(),
            reason: e.to_string(),
        }
    };

    let body = http
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(feed_error)?
        .bytes()
        .await
        .map_err(feed_error)?;

    parse_zone_mapping(&body)
}

#[cfg(test)]
#[path = "zone_mapping_tests.rs"]
mod zone_mapping_tests;
