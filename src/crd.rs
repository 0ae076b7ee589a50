// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom resource types for the EPIC resource model.
//!
//! These are the objects epicctl reads and writes in the resource store. They mirror the
//! EPIC control plane's own resource model closely enough to round-trip through it.
//!
//! # Resource Types
//!
//! - [`LoadBalancer`] - Public ports plus the upstream clusters that feed them
//! - [`RemoteEndpoint`] - One backend address/port registered on a load balancer
//! - [`LBServiceGroup`] - Address-allocation group; read only, consumed for its labels
//! - [`GWProxy`] - Gateway proxy whose address and DNS name are assigned asynchronously
//! - [`GWRoute`] - Binds a gateway proxy to a backend cluster
//! - [`GWEndpointSlice`] - Ad-hoc backend endpoints of a cluster
//! - [`Account`] - One per user namespace
//!
//! # Example
//!
//! ```rust
//! use epicctl::crd::{LoadBalancer, LoadBalancerSpec};
//! use epicctl::ports::{PortSpec, Protocol};
//!
//! let lb = LoadBalancer::new(
//!     "gatewayhttp-web",
//!     LoadBalancerSpec {
//!         display_name: "web".to_string(),
//!         public_address: None,
//!         public_ports: vec![PortSpec::new(Protocol::Tcp, 80)],
//!         upstream_clusters: vec!["epicctl".to_string()],
//!         true_ingress: false,
//!     },
//! );
//! assert_eq!(lb.spec.public_ports.len(), 1);
//! ```

use crate::ports::PortSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `LoadBalancer` exposes a set of public ports and forwards them to upstream clusters.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "epic.acnodal.io",
    version = "v1",
    kind = "LoadBalancer",
    namespaced,
    derive = "PartialEq",
    doc = "LoadBalancer exposes public ports on an address from its service group's prefix."
)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    /// Human-facing name; the object name is derived from it and the service group.
    pub display_name: String,

    /// Address allocated by the control plane once the load balancer is admitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_address: Option<String>,

    /// Ports the load balancer listens on.
    #[serde(default)]
    pub public_ports: Vec<PortSpec>,

    /// Clusters that currently send traffic through this load balancer.
    #[serde(default)]
    pub upstream_clusters: Vec<String>,

    /// Whether the load balancer uses TrueIngress tunnels (never for ad-hoc load balancers).
    #[serde(default)]
    pub true_ingress: bool,
}

impl LoadBalancer {
    /// Add an upstream cluster. Returns `false` if it was already present.
    pub fn add_upstream(&mut self, cluster: &str) -> bool {
        if self.spec.upstream_clusters.iter().any(|c| c == cluster) {
            return false;
        }
        self.spec.upstream_clusters.push(cluster.to_string());
        true
    }

    /// Remove an upstream cluster. Returns `false` if it was not present.
    pub fn remove_upstream(&mut self, cluster: &str) -> bool {
        let before = self.spec.upstream_clusters.len();
        self.spec.upstream_clusters.retain(|c| c != cluster);
        self.spec.upstream_clusters.len() != before
    }
}

/// `RemoteEndpoint` is one backend target of a load balancer.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "epic.acnodal.io",
    version = "v1",
    kind = "RemoteEndpoint",
    namespaced,
    derive = "PartialEq",
    doc = "RemoteEndpoint is a backend address and port that receives a load balancer's traffic."
)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEndpointSpec {
    /// Cluster that registered this endpoint.
    pub cluster: String,

    /// Backend IP address.
    pub address: String,

    /// Node address for TrueIngress endpoints; absent for ad-hoc endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_address: Option<String>,

    /// Backend port and protocol.
    pub port: PortSpec,
}

/// `LBServiceGroup` groups load balancers that allocate from the same service prefix.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[kube(
    group = "epic.acnodal.io",
    version = "v1",
    kind = "LBServiceGroup",
    namespaced,
    derive = "PartialEq",
    doc = "LBServiceGroup names a policy and address pool within a user namespace."
)]
#[serde(rename_all = "camelCase")]
pub struct LBServiceGroupSpec {
    /// Whether load balancers in this group may be shared across clusters.
    #[serde(default)]
    pub can_be_shared: bool,
}

/// Reference from a gateway object back to the client that owns it.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    /// Client-side namespace (appears in the proxy's DNS name).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// Client-side identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
}

/// One listener on a gateway proxy.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    pub name: String,
    pub protocol: String,
    pub port: i32,
}

/// Address and DNS name assigned to a gateway proxy.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEndpoint {
    #[serde(default)]
    pub dns_name: String,
    #[serde(default)]
    pub targets: Vec<String>,
}

/// `GWProxy` is a gateway whose external address is assigned by the control plane.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "epic.acnodal.io",
    version = "v1",
    kind = "GWProxy",
    namespaced,
    derive = "PartialEq",
    doc = "GWProxy requests an external address and DNS name for a gateway."
)]
#[serde(rename_all = "camelCase")]
pub struct GWProxySpec {
    /// Human-facing name (used in the DNS name).
    pub display_name: String,

    /// Client that owns this proxy.
    #[serde(default)]
    pub client_ref: ClientRef,

    /// Listeners the gateway exposes.
    #[serde(default)]
    pub listeners: Vec<Listener>,

    /// Filled in by the control plane; empty until the address is assigned.
    #[serde(default)]
    pub endpoints: Vec<ProxyEndpoint>,
}

impl GWProxy {
    /// The first assigned `(address, DNS name)`, if the control plane has assigned one.
    #[must_use]
    pub fn assignment(&self) -> Option<(String, String)> {
        self.spec.endpoints.iter().find_map(|endpoint| {
            endpoint
                .targets
                .first()
                .map(|target| (target.clone(), endpoint.dns_name.clone()))
        })
    }
}

/// Reference from a route to its parent gateway proxy.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParentReference {
    pub name: String,
}

/// Reference from a route rule to a backend cluster.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackendRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

/// One route rule.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    #[serde(default)]
    pub backend_refs: Vec<BackendRef>,
}

/// HTTP routing rules.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteSpec {
    #[serde(default)]
    pub parent_refs: Vec<ParentReference>,
    #[serde(default)]
    pub rules: Vec<RouteRule>,
}

/// `GWRoute` sends a gateway proxy's traffic to a backend cluster.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "epic.acnodal.io",
    version = "v1",
    kind = "GWRoute",
    namespaced,
    derive = "PartialEq",
    doc = "GWRoute binds a gateway proxy to a backend cluster."
)]
#[serde(rename_all = "camelCase")]
pub struct GWRouteSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpRouteSpec>,
}

/// One endpoint of an endpoint slice.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SliceEndpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    pub addresses: Vec<String>,
}

/// `GWEndpointSlice` lists ad-hoc backend endpoints of one cluster.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "epic.acnodal.io",
    version = "v1",
    kind = "GWEndpointSlice",
    namespaced,
    derive = "PartialEq",
    doc = "GWEndpointSlice registers ad-hoc (non-Kubernetes) backend endpoints of a cluster."
)]
#[serde(rename_all = "camelCase")]
pub struct GWEndpointSliceSpec {
    /// Cluster the endpoints belong to.
    pub parent_ref: ClientRef,

    /// `IPv4` or `IPv6`.
    pub address_type: String,

    pub endpoints: Vec<SliceEndpoint>,

    pub ports: Vec<PortSpec>,

    /// Node name to node address.
    #[serde(default)]
    pub node_addresses: BTreeMap<String, String>,
}

/// `Account` marks a user namespace as belonging to an EPIC tenant.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[kube(
    group = "epic.acnodal.io",
    version = "v1",
    kind = "Account",
    namespaced,
    derive = "PartialEq",
    doc = "Account is the per-tenant root object inside a user namespace."
)]
#[serde(rename_all = "camelCase")]
pub struct AccountSpec {}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
