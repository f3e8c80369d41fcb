// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Nutanix provider.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all provider CRDs
pub const API_GROUP: &str = "nutanix.crossplane.io";

/// API version of the `VirtualMachine` resource
pub const VM_API_VERSION: &str = "v1alpha1";

/// API version of the `ProviderConfig` resource
pub const PROVIDER_CONFIG_API_VERSION: &str = "v1beta1";

/// Kind name for `VirtualMachine` resource
pub const KIND_VIRTUAL_MACHINE: &str = "VirtualMachine";

/// Kind name for `ProviderConfig` resource
pub const KIND_PROVIDER_CONFIG: &str = "ProviderConfig";

/// Name of the singleton `ProviderConfig` every reconcile reads
pub const DEFAULT_PROVIDER_CONFIG_NAME: &str = "default";

// ============================================================================
// Availability Zone Feed Constants
// ============================================================================

/// Feed column holding the cluster name
pub const ZONE_FEED_CLUSTER_COLUMN: &str = "Cluster Name";

/// Feed column holding the availability zone label
pub const ZONE_FEED_ZONE_COLUMN: &str = "AvailabilityZone";

/// Feed column holding the enablement flag
pub const ZONE_FEED_ENABLED_COLUMN: &str = "Enabled";

/// Only this exact cell value marks a zone as usable
pub const ZONE_FEED_ENABLED_VALUE: &str = "enabled";

// ============================================================================
// Detail Store Constants
// ============================================================================

/// Default directory holding `<kind>-<name>.json` detail records
pub const DEFAULT_DETAILS_DIR: &str = "/etc/provider";

/// Detail record kind for clusters
pub const DETAIL_KIND_CLUSTER: &str = "cluster";

/// Detail record kind for subnets
pub const DETAIL_KIND_NETWORK: &str = "network";

/// Field of a cluster detail record carrying the cluster UUID
pub const DETAIL_FIELD_UUID: &str = "uuid";

/// Field of a network detail record listing the repos allowed to use it
pub const DETAIL_FIELD_ALLOWED_REPOS: &str = "allowed_repos";

// ============================================================================
// Prism Central Constants
// ============================================================================

/// Base path of the Prism Central v3 REST API
pub const PRISM_API_BASE_PATH: &str = "api/nutanix/v3";

/// Page size requested from list endpoints
pub const PRISM_LIST_PAGE_LENGTH: u32 = 500;

/// Default Prism Central port when the endpoint omits one
pub const PRISM_DEFAULT_PORT: u16 = 9440;

/// Device index of the boot disk
pub const BOOT_DISK_DEVICE_INDEX: i32 = 0;

// ============================================================================
// VM State Labels
// ============================================================================

/// State label written after a successful create
pub const VM_STATE_CREATED: &str = "Created";

// ============================================================================
// Controller Requeue Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration right after a VM was created (30 seconds)
pub const CREATED_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration for VMs in steady state (5 minutes)
pub const STEADY_STATE_REQUEUE_DURATION_SECS: u64 = 300;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
