// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Ownership index built on labels.
//!
//! Ownership ("this remote endpoint belongs to that load balancer") is never stored in a
//! separate structure. It is a set of labels attached when a resource is created, and it
//! is queried with label selectors. The index is therefore only as good as the creation
//! paths: every create in [`crate::lifecycle`] builds its labels with [`OwnerLabels`],
//! and every lookup goes through [`find_by_owner`] or [`Selector`], both keyed by [`Owner`].
//!
//! # Example
//!
//! ```rust
//! use epicctl::index::{Owner, OwnerLabels, Selector};
//!
//! let labels = OwnerLabels::new()
//!     .with(Owner::LoadBalancer, "gatewayhttp-web")
//!     .with(Owner::Cluster, "epicctl")
//!     .into_labels();
//!
//! let selector = Selector::owned_by(Owner::LoadBalancer, "gatewayhttp-web");
//! assert!(selector.matches(&labels));
//! ```

use crate::errors::StoreError;
use crate::labels::{
    OWNING_ACCOUNT_LABEL, OWNING_CLUSTER_LABEL, OWNING_LB_SERVICE_GROUP_LABEL,
    OWNING_LOAD_BALANCER_LABEL, OWNING_SERVICE_PREFIX_LABEL,
};
use crate::store::{ResourceStore, StoreResource};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Kinds of owner an ownership label can point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Owner {
    /// The account (tenant)
    Account,
    /// The load balancer service group
    ServiceGroup,
    /// The service prefix (address pool)
    ServicePrefix,
    /// The load balancer
    LoadBalancer,
    /// The cluster that registered the resource
    Cluster,
}

impl Owner {
    /// Label key that records this kind of owner.
    #[must_use]
    pub fn label_key(self) -> &'static str {
        match self {
            Owner::Account => OWNING_ACCOUNT_LABEL,
            Owner::ServiceGroup => OWNING_LB_SERVICE_GROUP_LABEL,
            Owner::ServicePrefix => OWNING_SERVICE_PREFIX_LABEL,
            Owner::LoadBalancer => OWNING_LOAD_BALANCER_LABEL,
            Owner::Cluster => OWNING_CLUSTER_LABEL,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label_key())
    }
}

/// Builder for the ownership labels of a new resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnerLabels {
    labels: BTreeMap<String, String>,
}

impl OwnerLabels {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `owner` as the owner of kind `kind`.
    #[must_use]
    pub fn with(mut self, kind: Owner, owner: impl Into<String>) -> Self {
        self.labels.insert(kind.label_key().to_string(), owner.into());
        self
    }

    /// Add a non-ownership label (e.g. `app.kubernetes.io/part-of`).
    #[must_use]
    pub fn with_label(mut self, key: &str, value: impl Into<String>) -> Self {
        self.labels.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn into_labels(self) -> BTreeMap<String, String> {
        self.labels
    }
}

/// Equality-based label selector. An empty selector matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    match_labels: BTreeMap<String, String>,
}

impl Selector {
    /// Selector that matches every object.
    #[must_use]
    pub fn everything() -> Self {
        Self::default()
    }

    /// Selector for objects owned by `owner` through the `kind` relationship.
    #[must_use]
    pub fn owned_by(kind: Owner, owner: impl Into<String>) -> Self {
        Self::everything().and(kind, owner)
    }

    /// Add an ownership requirement.
    #[must_use]
    pub fn and(self, kind: Owner, owner: impl Into<String>) -> Self {
        self.and_label(kind.label_key(), owner)
    }

    /// Add an arbitrary label requirement.
    #[must_use]
    pub fn and_label(mut self, key: &str, value: impl Into<String>) -> Self {
        self.match_labels.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty()
    }

    /// Check a label set against this selector.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }

    /// Render as a Kubernetes label query (`k1=v1,k2=v2`), or `None` when empty.
    #[must_use]
    pub fn to_query(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.match_labels
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_query().as_deref().unwrap_or("<all>"))
    }
}

/// All resources of kind `K` in `namespace` owned by `owner`.
///
/// With `owner` set to `None` every resource of the kind in the namespace is returned.
/// Zero matches is an empty list, not an error.
///
/// # Errors
///
/// Only backend failures from the store.
pub async fn find_by_owner<K, S>(
    store: &S,
    namespace: &str,
    kind: Owner,
    owner: Option<&str>,
) -> Result<Vec<K>, StoreError>
where
    K: StoreResource,
    S: ResourceStore,
{
    let selector = match owner {
        Some(owner) => Selector::owned_by(kind, owner),
        None => Selector::everything(),
    };

    let found: Vec<K> = store.list(Some(namespace), &selector).await?;
    debug!(
        namespace = %namespace,
        kind = %K::kind_name(),
        selector = %selector,
        count = found.len(),
        "Ownership index lookup"
    );
    Ok(found)
}

/// Value of an ownership label on an object, if present.
#[must_use]
pub fn owner_of<K: StoreResource>(object: &K, kind: Owner) -> Option<String> {
    object
        .meta()
        .labels
        .as_ref()
        .and_then(|labels| labels.get(kind.label_key()))
        .cloned()
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod index_tests;
