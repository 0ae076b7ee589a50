// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # epicctl - operator tool for the EPIC load-balancing control plane
//!
//! epicctl creates, inspects and tears down EPIC's tenant-scoped resources: load balancers,
//! their remote endpoints and upstream clusters, ad-hoc gateways, user namespaces and API
//! users. Every object lives in an external resource store (a Kubernetes API server in
//! production); this crate keeps no state of its own and re-reads what it needs before
//! every write.
//!
//! ## Modules
//!
//! - [`ports`] - Port-spec parsing (`TCP/80,UDP/53`)
//! - [`names`] - Canonical, reconstructible object names
//! - [`labels`] / [`index`] - Ownership labels and owner lookups
//! - [`store`] - The [`store::ResourceStore`] seam, with [`kube_store`] and [`memory_store`]
//! - [`lifecycle`] - Multi-step create/delete protocols
//! - [`credentials`] - `user:hash` credential sets and tenant secrets
//! - [`manifest`] - PureLB `ServiceGroup` manifest rendering
//! - [`cli`], [`commands`], [`output`], [`config`] - The command-line surface
//!
//! ## Example
//!
//! ```rust
//! use epicctl::names::load_balancer_name;
//! use epicctl::ports::{parse_ports, PortSpec, Protocol};
//!
//! let ports = parse_ports("TCP/80,udp/53").unwrap();
//! assert_eq!(ports[1], PortSpec::new(Protocol::Udp, 53));
//! assert_eq!(load_balancer_name("gatewayhttp", "web").unwrap(), "gatewayhttp-web");
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod credentials;
pub mod errors;
pub mod index;
pub mod kube_store;
pub mod labels;
pub mod lifecycle;
pub mod manifest;
pub mod memory_store;
pub mod names;
pub mod output;
pub mod ports;
pub mod retry;
pub mod store;

