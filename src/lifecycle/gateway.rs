// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Ad-hoc gateways and endpoints.
//!
//! Ad-hoc gateways route traffic to Linux hosts that are not managed by Kubernetes.
//! Building one takes two commands:
//!
//! 1. [`create_adhoc_gateway`] creates a `GWProxy`, waits for the control plane to assign
//!    it an address and DNS name, and binds it to the `linux-nodes` backend cluster with
//!    a `GWRoute`.
//! 2. [`create_adhoc_endpoint`] registers a host in that backend cluster with a
//!    `GWEndpointSlice`.
//!
//! Proxy state: `absent -> created -> address-pending -> address-assigned`. The wait is
//! bounded by the context's poll settings.

use crate::constants::{ADHOC_CLIENT_NAMESPACE, ADHOC_CLUSTER_NAME, ADHOC_LISTENER_NAME};
use crate::context::Context;
use crate::crd::{
    BackendRef, ClientRef, GWEndpointSlice, GWEndpointSliceSpec, GWProxy, GWProxySpec, GWRoute,
    GWRouteSpec, HttpRouteSpec, Listener, ParentReference, RouteRule, SliceEndpoint,
};
use crate::errors::{EpicError, Result};
use crate::index::{Owner, OwnerLabels};
use crate::lifecycle::remote_endpoint::parse_address;
use crate::names::{account_namespace, validate_component, validate_service_group};
use crate::ports::{parse_port_number, PortSpec, Protocol};
use crate::retry::poll_until;
use crate::store::{qualified_name, ResourceStore};
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::{info, warn};

/// Listener protocol of ad-hoc gateways
const HTTP_PROTOCOL: &str = "HTTP";

/// What an ad-hoc gateway ended up with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayAssignment {
    /// Proxy (and route) object name
    pub name: String,
    /// Externally reachable address
    pub address: String,
    /// Assigned DNS name
    pub dns_name: String,
}

/// Create an ad-hoc gateway: proxy, wait for its address, then route.
///
/// # Errors
///
/// - [`EpicError::PortParse`] / [`EpicError::Name`] for bad arguments
/// - [`EpicError::AlreadyExists`] if a proxy with the name exists
/// - [`EpicError::Timeout`] if no address is assigned in time (the proxy is left in place)
/// - [`EpicError::NotFound`] if the proxy disappears while waiting, or the read error that
///   ended the wait
/// - [`EpicError::PartialFailure`] if the route cannot be created after the proxy was
pub async fn create_adhoc_gateway<S: ResourceStore>(
    ctx: &Context<S>,
    account: &str,
    service_group: &str,
    name: &str,
    port: &str,
) -> Result<GatewayAssignment> {
    let port = parse_port_number(port)?;
    validate_component("gateway", name)?;
    validate_service_group(service_group)?;
    let namespace = account_namespace(account)?;

    let proxy = GWProxy {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.clone()),
            labels: Some(
                OwnerLabels::new()
                    .with(Owner::Account, account)
                    .with(Owner::ServiceGroup, service_group)
                    .into_labels(),
            ),
            ..Default::default()
        },
        spec: GWProxySpec {
            display_name: name.to_string(),
            client_ref: ClientRef {
                namespace: ADHOC_CLIENT_NAMESPACE.to_string(),
                uid: String::new(),
            },
            listeners: vec![Listener {
                name: ADHOC_LISTENER_NAME.to_string(),
                protocol: HTTP_PROTOCOL.to_string(),
                port,
            }],
            endpoints: Vec::new(),
        },
    };
    ctx.store.create(&proxy).await?;
    let proxy_name = qualified_name(Some(&namespace), name);
    info!(proxy = %proxy_name, "Gateway proxy created, waiting for address");

    let store = &ctx.store;
    let ns = namespace.as_str();
    let (address, dns_name) = poll_until(
        &format!("address of GWProxy {proxy_name}"),
        ctx.poll,
        move || async move {
            let current: GWProxy = store.get(Some(ns), name).await?;
            Ok::<_, EpicError>(current.assignment())
        },
    )
    .await
    .inspect_err(|e| {
        warn!(proxy = %proxy_name, error = %e, "Gave up waiting for an address");
    })?;

    let route = GWRoute {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.clone()),
            labels: Some(OwnerLabels::new().with(Owner::Account, account).into_labels()),
            ..Default::default()
        },
        spec: GWRouteSpec {
            http: Some(HttpRouteSpec {
                parent_refs: vec![ParentReference {
                    name: name.to_string(),
                }],
                rules: vec![RouteRule {
                    backend_refs: vec![BackendRef {
                        name: ADHOC_CLUSTER_NAME.to_string(),
                        port: Some(port),
                    }],
                }],
            }),
        },
    };
    if let Err(e) = ctx.store.create(&route).await {
        return Err(EpicError::PartialFailure {
            completed: vec![
                format!("create GWProxy {proxy_name}"),
                format!("address {address} assigned"),
            ],
            failed_step: format!("create GWRoute {proxy_name}"),
            source: Box::new(e.into()),
        });
    }
    info!(proxy = %proxy_name, address = %address, dns_name = %dns_name, "Ad-hoc gateway ready");

    Ok(GatewayAssignment {
        name: name.to_string(),
        address,
        dns_name,
    })
}

/// Register this host as an ad-hoc endpoint of `cluster`.
///
/// The slice is named after the host and labeled with the account and cluster.
///
/// # Errors
///
/// - [`EpicError::InvalidArgument`] / [`EpicError::PortParse`] / [`EpicError::Name`] for
///   bad arguments
/// - [`EpicError::AlreadyExists`] if this host already has a slice
pub async fn create_adhoc_endpoint<S: ResourceStore>(
    ctx: &Context<S>,
    account: &str,
    cluster: &str,
    host_name: &str,
    address: &str,
    port: &str,
) -> Result<GWEndpointSlice> {
    let address = parse_address(address)?;
    let port = parse_port_number(port)?;
    validate_host_name(host_name)?;
    validate_component("cluster", cluster)?;
    let namespace = account_namespace(account)?;

    let address_type = match address {
        IpAddr::V4(_) => "IPv4",
        IpAddr::V6(_) => "IPv6",
    };

    let slice = GWEndpointSlice {
        metadata: ObjectMeta {
            name: Some(host_name.to_string()),
            namespace: Some(namespace.clone()),
            labels: Some(
                OwnerLabels::new()
                    .with(Owner::Account, account)
                    .with(Owner::Cluster, cluster)
                    .into_labels(),
            ),
            ..Default::default()
        },
        spec: GWEndpointSliceSpec {
            parent_ref: ClientRef {
                namespace: String::new(),
                uid: cluster.to_string(),
            },
            address_type: address_type.to_string(),
            endpoints: vec![SliceEndpoint {
                node_name: Some(host_name.to_string()),
                addresses: vec![address.to_string()],
            }],
            ports: vec![PortSpec::new(Protocol::Tcp, port)],
            node_addresses: BTreeMap::from([(host_name.to_string(), address.to_string())]),
        },
    };

    let created = ctx.store.create(&slice).await?;
    info!(
        namespace = %namespace,
        host = %host_name,
        cluster = %cluster,
        address = %address,
        "Ad-hoc endpoint created"
    );
    Ok(created)
}

/// Host names become object names, so each dot-separated label must be a valid name
/// component.
fn validate_host_name(host_name: &str) -> Result<()> {
    if host_name.is_empty() {
        return Err(crate::errors::NameError::Empty { component: "host" }.into());
    }
    for label in host_name.split('.') {
        validate_component("host", label)?;
    }
    Ok(())
}
