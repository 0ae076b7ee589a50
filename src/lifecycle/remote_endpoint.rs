// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Remote endpoint lifecycle: `absent -> created -> absent`.
//!
//! Endpoint names carry a random suffix, so they are never used to find an endpoint.
//! Deletion scans the endpoints owned by the load balancer and matches on
//! `(address, port, protocol, cluster)`.

use super::load_balancer::LoadBalancerRef;
use crate::context::Context;
use crate::crd::{LoadBalancer, RemoteEndpoint, RemoteEndpointSpec};
use crate::errors::{EpicError, Result};
use crate::index::{find_by_owner, Owner, OwnerLabels};
use crate::names::remote_endpoint_name;
use crate::ports::{parse_single_port, PortSpec};
use crate::store::{object_name, ResourceStore};
use kube::api::ObjectMeta;
use std::net::IpAddr;
use tracing::{info, warn};

/// Parse an IP address argument.
///
/// # Errors
///
/// [`EpicError::InvalidArgument`] if `address` is not an IPv4 or IPv6 address.
pub fn parse_address(address: &str) -> Result<IpAddr> {
    address
        .trim()
        .parse()
        .map_err(|e: std::net::AddrParseError| EpicError::InvalidArgument {
            what: "IP address",
            value: address.to_string(),
            reason: e.to_string(),
        })
}

/// Register a remote endpoint on a load balancer.
///
/// The endpoint is labeled with the owning load balancer and this tool's cluster.
///
/// # Errors
///
/// - [`EpicError::InvalidArgument`] / [`EpicError::PortParse`] for bad arguments, before
///   any store call
/// - [`EpicError::NotFound`] if the load balancer does not exist
pub async fn add_remote_endpoint<S: ResourceStore>(
    ctx: &Context<S>,
    lb: &LoadBalancerRef,
    address: &str,
    port: &str,
) -> Result<RemoteEndpoint> {
    let address = parse_address(address)?;
    let port = parse_single_port(port)?;
    let namespace = lb.namespace()?;

    let owner: LoadBalancer = ctx.store.get(Some(&namespace), &lb.name()?).await?;
    let owner_name = object_name(&owner)?;

    let labels = OwnerLabels::new()
        .with(Owner::LoadBalancer, owner_name.as_str())
        .with(Owner::Cluster, ctx.cluster_name.as_str())
        .into_labels();

    let endpoint = RemoteEndpoint {
        metadata: ObjectMeta {
            name: Some(remote_endpoint_name(&address, port.port, port.protocol)),
            namespace: Some(namespace.clone()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: RemoteEndpointSpec {
            cluster: ctx.cluster_name.clone(),
            address: address.to_string(),
            node_address: None,
            port,
        },
    };

    let created = ctx.store.create(&endpoint).await?;
    info!(
        namespace = %namespace,
        load_balancer = %owner_name,
        address = %address,
        port = %port,
        "Remote endpoint created"
    );
    Ok(created)
}

/// Remote endpoints owned by a load balancer, in store order.
///
/// # Errors
///
/// Name errors for the arguments and store backend failures. An unknown load balancer
/// simply has no endpoints.
pub async fn list_remote_endpoints<S: ResourceStore>(
    ctx: &Context<S>,
    lb: &LoadBalancerRef,
) -> Result<Vec<RemoteEndpoint>> {
    let namespace = lb.namespace()?;
    let name = lb.name()?;
    Ok(find_by_owner(&ctx.store, &namespace, Owner::LoadBalancer, Some(&name)).await?)
}

/// Delete the remote endpoint that matches `(address, port, protocol)` for this tool's
/// cluster on the load balancer.
///
/// If more than one endpoint matches, the first in store order is deleted and the
/// others are left in place.
///
/// # Errors
///
/// - [`EpicError::InvalidArgument`] / [`EpicError::PortParse`] for bad arguments
/// - [`EpicError::NotFound`] if no endpoint matches
pub async fn delete_remote_endpoint<S: ResourceStore>(
    ctx: &Context<S>,
    lb: &LoadBalancerRef,
    address: &str,
    port: &str,
) -> Result<RemoteEndpoint> {
    let address = parse_address(address)?;
    let port = parse_single_port(port)?;
    let lb_name = lb.name()?;

    let mut matches: Vec<RemoteEndpoint> = list_remote_endpoints(ctx, lb)
        .await?
        .into_iter()
        .filter(|endpoint| endpoint_matches(endpoint, &address, port, &ctx.cluster_name))
        .collect();

    if matches.is_empty() {
        return Err(EpicError::NotFound {
            kind: "RemoteEndpoint".to_string(),
            name: format!("{address} {port} on {lb_name}"),
        });
    }
    if matches.len() > 1 {
        warn!(
            load_balancer = %lb_name,
            address = %address,
            port = %port,
            duplicates = matches.len(),
            "Several remote endpoints match, deleting the first"
        );
    }

    let target = matches.remove(0);
    ctx.store.delete(&target).await?;
    info!(
        load_balancer = %lb_name,
        name = %target.metadata.name.as_deref().unwrap_or_default(),
        "Remote endpoint deleted"
    );
    Ok(target)
}

/// Whether an endpoint is the `(address, port, protocol, cluster)` registration.
///
/// Addresses compare as parsed IPs so `::1` and `0:0:0:0:0:0:0:1` match.
fn endpoint_matches(
    endpoint: &RemoteEndpoint,
    address: &IpAddr,
    port: PortSpec,
    cluster: &str,
) -> bool {
    endpoint.spec.port == port
        && endpoint.spec.cluster == cluster
        && endpoint
            .spec
            .address
            .parse::<IpAddr>()
            .is_ok_and(|stored| stored == *address)
}
