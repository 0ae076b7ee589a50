// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Multi-step lifecycle operations against the resource store.
//!
//! Every operation takes a [`Context`](crate::context::Context), validates and parses
//! its arguments before the first store call, and returns an
//! [`EpicError`](crate::errors::EpicError) to its caller. Nothing here prints.
//!
//! # Operations
//!
//! ## Load balancers
//!
//! - [`create_load_balancer`] - Inherits the service prefix from its service group
//! - [`add_upstream_cluster`] / [`remove_upstream_cluster`] - Conflict-retried edits
//! - [`delete_load_balancer`] - Detach-then-delete, or forced
//! - [`get_load_balancer`], [`list_load_balancers`], [`describe_load_balancer`]
//!
//! ## Remote endpoints
//!
//! - [`add_remote_endpoint`] - Labeled with the owning load balancer and cluster
//! - [`delete_remote_endpoint`] - Matched by `(address, port, protocol, cluster)`
//! - [`list_remote_endpoints`]
//!
//! ## Ad-hoc gateways
//!
//! - [`create_adhoc_gateway`] - Proxy, bounded wait for an address, route
//! - [`create_adhoc_endpoint`] - Endpoint slice for one host
//!
//! ## User namespaces and API users
//!
//! - [`bootstrap_user_namespace`] - Resumable four-step tenant setup
//! - [`list_user_namespaces`], [`describe_user_namespace`], [`count_pods`]
//! - [`create_api_user`], [`delete_api_user`], [`list_api_users`]
//!
//! # Example
//!
//! ```rust,no_run
//! use epicctl::context::Context;
//! use epicctl::lifecycle::{create_load_balancer, LoadBalancerRef};
//! use epicctl::memory_store::InMemoryStore;
//!
//! async fn make_web(ctx: &Context<InMemoryStore>) -> epicctl::errors::Result<()> {
//!     let lb = LoadBalancerRef::new("acme", "gatewayhttp", "web");
//!     create_load_balancer(ctx, &lb, "TCP/80,TCP/443").await?;
//!     Ok(())
//! }
//! ```

pub mod api_users;
pub mod gateway;
pub mod load_balancer;
pub mod namespace;
pub mod remote_endpoint;

#[cfg(test)]
mod api_users_tests;

pub use api_users::{check_password, create_api_user, delete_api_user, list_api_users};
pub use gateway::{create_adhoc_endpoint, create_adhoc_gateway, GatewayAssignment};
pub use load_balancer::{
    add_upstream_cluster, create_load_balancer, delete_load_balancer, describe_load_balancer,
    get_load_balancer, list_load_balancers, remove_upstream_cluster, LoadBalancerDeletion,
    LoadBalancerDescription, LoadBalancerRef,
};
pub use namespace::{
    bootstrap_user_namespace, count_pods, describe_user_namespace, list_user_namespaces,
    BootstrapReport, StepOutcome, UserNamespaceDescription, UserNamespaceRequest,
    UserNamespaceSummary,
};
pub use remote_endpoint::{
    add_remote_endpoint, delete_remote_endpoint, list_remote_endpoints, parse_address,
};
