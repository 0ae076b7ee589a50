// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label and annotation constants used across all lifecycle operations.
//!
//! Every ownership relationship is recorded as a label with one of the keys below.
//! Creation paths and queries both go through [`crate::index`], which only accepts
//! these keys, so the two sides cannot drift apart.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture (e.g., "user-namespace")
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

/// Component value for user namespaces
pub const COMPONENT_USER_NAMESPACE: &str = "user-namespace";

// ============================================================================
// EPIC Ownership Labels
// ============================================================================

/// Label naming the account (tenant) that owns a resource
pub const OWNING_ACCOUNT_LABEL: &str = "epic.acnodal.io/owning-account";

/// Label naming the service group that owns a load balancer or gateway proxy
pub const OWNING_LB_SERVICE_GROUP_LABEL: &str = "epic.acnodal.io/owning-lbservicegroup";

/// Label naming the service prefix (address pool) a load balancer allocates from
pub const OWNING_SERVICE_PREFIX_LABEL: &str = "epic.acnodal.io/owning-serviceprefix";

/// Label naming the load balancer that owns a remote endpoint
pub const OWNING_LOAD_BALANCER_LABEL: &str = "epic.acnodal.io/owning-loadbalancer";

/// Label naming the cluster that registered a remote endpoint or endpoint slice
pub const OWNING_CLUSTER_LABEL: &str = "epic.acnodal.io/owning-cluster";

// ============================================================================
// Annotations
// ============================================================================

/// Contour annotation selecting the authentication type of a secret
pub const CONTOUR_AUTH_TYPE_ANNOTATION: &str = "projectcontour.io/auth-type";

/// Contour annotation naming the basic-auth realm of a secret
pub const CONTOUR_AUTH_REALM_ANNOTATION: &str = "projectcontour.io/auth-realm";

/// Auth type value for basic authentication
pub const AUTH_TYPE_BASIC: &str = "basic";
