// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for epicctl.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all EPIC custom resources
pub const API_GROUP: &str = "epic.acnodal.io";

/// API version for all EPIC custom resources
pub const API_VERSION: &str = "v1";

/// Product name, used as the user namespace prefix and in `part-of` labels
pub const PRODUCT_NAME: &str = "epic";

// ============================================================================
// Naming Constants
// ============================================================================

/// Separator between the service group and display name in a load balancer's canonical name
pub const NAME_SEPARATOR: char = '-';

/// Length of the random suffix appended to remote endpoint names
pub const ENDPOINT_SUFFIX_LEN: usize = 5;

/// Maximum length of a Kubernetes object name (DNS-1123 subdomain)
pub const MAX_OBJECT_NAME_LEN: usize = 253;

// ============================================================================
// Cluster Constants
// ============================================================================

/// Upstream cluster name this tool registers on the load balancers it manages
pub const DEFAULT_CLUSTER_NAME: &str = "epicctl";

/// Backend cluster that ad-hoc gateway routes and endpoint slices attach to
pub const ADHOC_CLUSTER_NAME: &str = "linux-nodes";

/// Default service group for ad-hoc gateways
pub const DEFAULT_GATEWAY_SERVICE_GROUP: &str = "gatewayhttp";

/// Client namespace recorded on ad-hoc gateway proxies (appears in their DNS names)
pub const ADHOC_CLIENT_NAMESPACE: &str = "adhoc";

/// Listener name on ad-hoc gateway proxies
pub const ADHOC_LISTENER_NAME: &str = "http";

// ============================================================================
// Secret Constants
// ============================================================================

/// Name of the registry pull secret in every user namespace
pub const REGISTRY_SECRET_NAME: &str = "gitlab";

/// Registry host the pull secret authenticates against
pub const REGISTRY_HOSTNAME: &str = "registry.gitlab.com";

/// Name of the web-service basic-auth secret in every user namespace
pub const WEB_SERVICE_SECRET_NAME: &str = "password";

/// Basic-auth realm for the web-service secret
pub const WEB_SERVICE_REALM: &str = "epicauth";

/// Data key that holds the `user:hash` records in the web-service secret
pub const WEB_SERVICE_AUTH_KEY: &str = "auth";

/// Minimum accepted API user password length
pub const MIN_PASSWORD_LEN: usize = 6;

// ============================================================================
// Polling and Retry Constants
// ============================================================================

/// Interval between reads while waiting for a gateway address (1 second)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Upper bound on waiting for a gateway address (2 minutes)
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 120;

/// Number of attempts for a read-modify-write that keeps hitting conflicts
pub const MAX_CONFLICT_RETRIES: u32 = 5;

/// Page size for Kubernetes list calls
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default config file name, resolved against `$HOME`
pub const CONFIG_FILE_NAME: &str = ".epicctl.yaml";
