// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Load balancer lifecycle: `absent -> created -> (mutated*) -> detached -> absent`.
//!
//! A load balancer is addressed by `(account, service group, display name)`. Its object
//! name and namespace are derived from those with [`crate::names`], so no lookup table is
//! needed to find it again.
//!
//! Deletion is two-phase. This tool's cluster is first removed from the upstream list and
//! that change is persisted; only then, and only if no other cluster still feeds the load
//! balancer, is the object deleted. `force` skips the detach step entirely.

use crate::context::Context;
use crate::crd::{LBServiceGroup, LoadBalancer, LoadBalancerSpec, RemoteEndpoint};
use crate::errors::{EpicError, Result};
use crate::index::{find_by_owner, owner_of, Owner, OwnerLabels};
use crate::names::{account_namespace, load_balancer_name, validate_service_group};
use crate::ports::parse_ports;
use crate::retry::retry_on_conflict;
use crate::store::ResourceStore;
use kube::api::ObjectMeta;
use tracing::{debug, info, warn};

/// Human-facing address of a load balancer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadBalancerRef {
    pub account: String,
    pub service_group: String,
    pub display_name: String,
}

impl LoadBalancerRef {
    #[must_use]
    pub fn new(
        account: impl Into<String>,
        service_group: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            service_group: service_group.into(),
            display_name: display_name.into(),
        }
    }

    /// Namespace of the owning account.
    ///
    /// # Errors
    ///
    /// [`EpicError::Name`] if the account is not a valid name.
    pub fn namespace(&self) -> Result<String> {
        Ok(account_namespace(&self.account)?)
    }

    /// Canonical object name.
    ///
    /// # Errors
    ///
    /// [`EpicError::Name`] if either component is invalid.
    pub fn name(&self) -> Result<String> {
        Ok(load_balancer_name(&self.service_group, &self.display_name)?)
    }
}

/// Outcome of a load balancer delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadBalancerDeletion {
    /// The object is gone.
    Deleted,
    /// This tool's cluster was detached, but other clusters still use the load balancer,
    /// so it was kept.
    Retained {
        /// Upstream clusters left on the load balancer
        remaining: Vec<String>,
    },
}

/// A load balancer and the remote endpoints it owns.
#[derive(Clone, Debug)]
pub struct LoadBalancerDescription {
    pub load_balancer: LoadBalancer,
    pub endpoints: Vec<RemoteEndpoint>,
}

/// Create a load balancer.
///
/// The service prefix label is read from the named service group and copied forward.
/// Nothing is created if the ports do not parse, the service group cannot be read, or
/// it lacks the prefix label.
///
/// # Errors
///
/// - [`EpicError::PortParse`] / [`EpicError::Name`] for bad arguments (before any store call)
/// - [`EpicError::NotFound`] if the service group does not exist
/// - [`EpicError::MissingOwnerLabel`] if the service group has no service prefix label
/// - [`EpicError::AlreadyExists`] if a load balancer with the same canonical name exists
pub async fn create_load_balancer<S: ResourceStore>(
    ctx: &Context<S>,
    lb: &LoadBalancerRef,
    ports: &str,
) -> Result<LoadBalancer> {
    let public_ports = parse_ports(ports)?;
    let namespace = lb.namespace()?;
    let name = lb.name()?;

    let group: LBServiceGroup = ctx
        .store
        .get(Some(&namespace), &lb.service_group)
        .await?;
    let prefix =
        owner_of(&group, Owner::ServicePrefix).ok_or_else(|| EpicError::MissingOwnerLabel {
            kind: "LBServiceGroup".to_string(),
            name: lb.service_group.clone(),
            label: Owner::ServicePrefix.label_key(),
        })?;

    let labels = OwnerLabels::new()
        .with(Owner::ServiceGroup, lb.service_group.as_str())
        .with(Owner::ServicePrefix, prefix)
        .into_labels();

    let object = LoadBalancer {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(namespace.clone()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: LoadBalancerSpec {
            display_name: lb.display_name.clone(),
            public_address: None,
            public_ports,
            upstream_clusters: vec![ctx.cluster_name.clone()],
            true_ingress: false,
        },
    };

    let created = ctx.store.create(&object).await?;
    info!(namespace = %namespace, name = %name, "Load balancer created");
    Ok(created)
}

/// Read one load balancer.
///
/// # Errors
///
/// [`EpicError::NotFound`] if it does not exist.
pub async fn get_load_balancer<S: ResourceStore>(
    ctx: &Context<S>,
    lb: &LoadBalancerRef,
) -> Result<LoadBalancer> {
    let namespace = lb.namespace()?;
    let name = lb.name()?;
    Ok(ctx.store.get(Some(&namespace), &name).await?)
}

/// Load balancers of an account, optionally limited to one service group.
///
/// # Errors
///
/// Name errors for the arguments and store backend failures.
pub async fn list_load_balancers<S: ResourceStore>(
    ctx: &Context<S>,
    account: &str,
    service_group: Option<&str>,
) -> Result<Vec<LoadBalancer>> {
    let namespace = account_namespace(account)?;
    if let Some(group) = service_group {
        validate_service_group(group)?;
    }
    Ok(find_by_owner(&ctx.store, &namespace, Owner::ServiceGroup, service_group).await?)
}

/// A load balancer together with its remote endpoints.
///
/// # Errors
///
/// [`EpicError::NotFound`] if the load balancer does not exist.
pub async fn describe_load_balancer<S: ResourceStore>(
    ctx: &Context<S>,
    lb: &LoadBalancerRef,
) -> Result<LoadBalancerDescription> {
    let load_balancer = get_load_balancer(ctx, lb).await?;
    let namespace = lb.namespace()?;
    let endpoints = find_by_owner(
        &ctx.store,
        &namespace,
        Owner::LoadBalancer,
        Some(&lb.name()?),
    )
    .await?;
    Ok(LoadBalancerDescription {
        load_balancer,
        endpoints,
    })
}

/// Add `cluster` to the upstream list. Returns `false` (and writes nothing) if present.
///
/// # Errors
///
/// [`EpicError::NotFound`] if the load balancer does not exist, [`EpicError::Conflict`]
/// if concurrent writers kept winning.
pub async fn add_upstream_cluster<S: ResourceStore>(
    ctx: &Context<S>,
    lb: &LoadBalancerRef,
    cluster: &str,
) -> Result<bool> {
    let (_, changed) =
        update_upstreams(ctx, lb, "add upstream cluster", |object| object.add_upstream(cluster))
            .await?;
    Ok(changed)
}

/// Remove `cluster` from the upstream list. Returns `false` (and writes nothing) if absent.
///
/// # Errors
///
/// [`EpicError::NotFound`] if the load balancer does not exist, [`EpicError::Conflict`]
/// if concurrent writers kept winning.
pub async fn remove_upstream_cluster<S: ResourceStore>(
    ctx: &Context<S>,
    lb: &LoadBalancerRef,
    cluster: &str,
) -> Result<bool> {
    let (_, changed) = update_upstreams(ctx, lb, "remove upstream cluster", |object| {
        object.remove_upstream(cluster)
    })
    .await?;
    Ok(changed)
}

/// Delete a load balancer.
///
/// Without `force`: detach this tool's cluster and persist, then delete if no upstream
/// cluster remains. If the detach write fails, no delete is attempted.
///
/// With `force`: delete regardless of remaining upstream clusters.
///
/// # Errors
///
/// [`EpicError::NotFound`] if the load balancer does not exist, plus any failure of the
/// detach write or the delete.
pub async fn delete_load_balancer<S: ResourceStore>(
    ctx: &Context<S>,
    lb: &LoadBalancerRef,
    force: bool,
) -> Result<LoadBalancerDeletion> {
    let namespace = lb.namespace()?;
    let name = lb.name()?;

    let current = if force {
        let current: LoadBalancer = ctx.store.get(Some(&namespace), &name).await?;
        if !current.spec.upstream_clusters.is_empty() {
            warn!(
                namespace = %namespace,
                name = %name,
                upstream_clusters = ?current.spec.upstream_clusters,
                "Force-deleting load balancer that still has upstream clusters"
            );
        }
        current
    } else {
        let cluster = ctx.cluster_name.as_str();
        let (detached, changed) = update_upstreams(ctx, lb, "detach before delete", |object| {
            object.remove_upstream(cluster)
        })
        .await?;
        debug!(namespace = %namespace, name = %name, changed = changed, "Detached cluster");

        if !detached.spec.upstream_clusters.is_empty() {
            info!(
                namespace = %namespace,
                name = %name,
                remaining = ?detached.spec.upstream_clusters,
                "Load balancer still in use by other clusters, not deleting"
            );
            return Ok(LoadBalancerDeletion::Retained {
                remaining: detached.spec.upstream_clusters,
            });
        }
        detached
    };

    ctx.store.delete(&current).await?;
    info!(namespace = %namespace, name = %name, force = force, "Load balancer deleted");
    Ok(LoadBalancerDeletion::Deleted)
}

/// Read-modify-write of the upstream list with conflict retry.
///
/// `change` returns whether it modified the object; an unmodified object is not written.
async fn update_upstreams<S, F>(
    ctx: &Context<S>,
    lb: &LoadBalancerRef,
    operation: &str,
    change: F,
) -> Result<(LoadBalancer, bool)>
where
    S: ResourceStore,
    F: Fn(&mut LoadBalancer) -> bool,
{
    let namespace = lb.namespace()?;
    let name = lb.name()?;
    let store = &ctx.store;
    let (namespace, name, change) = (namespace.as_str(), name.as_str(), &change);

    retry_on_conflict(operation, move || async move {
        let mut object: LoadBalancer = store.get(Some(namespace), name).await?;
        if !change(&mut object) {
            return Ok::<_, EpicError>((object, false));
        }
        let updated = store.update(&object).await?;
        debug!(
            namespace = %namespace,
            name = %name,
            upstream_clusters = ?updated.spec.upstream_clusters,
            "Upstream clusters updated"
        );
        Ok((updated, true))
    })
    .await
}
