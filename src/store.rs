// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The resource store contract.
//!
//! Lifecycle operations never talk to Kubernetes directly. They go through
//! [`ResourceStore`], which has two implementations:
//!
//! - [`crate::kube_store::KubeStore`] - the real control plane, via `kube::Api`
//! - [`crate::memory_store::InMemoryStore`] - an in-process store for tests
//!
//! Every call is a full round trip; nothing is cached between calls.

use crate::crd::{
    Account, GWEndpointSlice, GWProxy, GWRoute, LBServiceGroup, LoadBalancer, RemoteEndpoint,
};
use crate::errors::StoreError;
use crate::index::Selector;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Pod, Secret};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A typed object that can be kept in a [`ResourceStore`].
pub trait StoreResource:
    Resource<DynamicType = ()>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Whether objects of this kind live inside a namespace.
    const NAMESPACED: bool;

    /// Build a `kube::Api` for this kind, scoped to `namespace` when given.
    fn api(client: Client, namespace: Option<&str>) -> Api<Self>;

    /// Kind name used in errors and logs.
    #[must_use]
    fn kind_name() -> String {
        Self::kind(&()).into_owned()
    }
}

macro_rules! namespaced_store_resource {
    ($($kind:ty),* $(,)?) => {
        $(
            impl StoreResource for $kind {
                const NAMESPACED: bool = true;

                fn api(client: Client, namespace: Option<&str>) -> Api<Self> {
                    match namespace {
                        Some(ns) => Api::namespaced(client, ns),
                        None => Api::all(client),
                    }
                }
            }
        )*
    };
}

namespaced_store_resource!(
    LoadBalancer,
    RemoteEndpoint,
    LBServiceGroup,
    GWProxy,
    GWRoute,
    GWEndpointSlice,
    Account,
    Secret,
    Pod,
);

impl StoreResource for Namespace {
    const NAMESPACED: bool = false;

    fn api(client: Client, _namespace: Option<&str>) -> Api<Self> {
        Api::all(client)
    }
}

/// The operations the lifecycle layer needs from the external resource store.
///
/// Names and namespaces come from the object's own metadata for `create`, `update` and
/// `delete`. `namespace` is ignored for cluster-scoped kinds.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Persist a new object.
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyExists`] if an object with the same name exists.
    async fn create<K: StoreResource>(&self, object: &K) -> Result<K, StoreError>;

    /// Read one object.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if it does not exist.
    async fn get<K: StoreResource>(&self, namespace: Option<&str>, name: &str)
        -> Result<K, StoreError>;

    /// List objects of a kind, optionally filtered by labels.
    ///
    /// Returns an empty list, never `NotFound`, when nothing matches. `None` for the
    /// namespace lists across all namespaces.
    ///
    /// # Errors
    ///
    /// Only backend failures.
    async fn list<K: StoreResource>(
        &self,
        namespace: Option<&str>,
        selector: &Selector,
    ) -> Result<Vec<K>, StoreError>;

    /// Replace an existing object.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] if the object's resource version is stale,
    /// [`StoreError::NotFound`] if it no longer exists.
    async fn update<K: StoreResource>(&self, object: &K) -> Result<K, StoreError>;

    /// Delete an object.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if it is already gone.
    async fn delete<K: StoreResource>(&self, object: &K) -> Result<(), StoreError>;
}

/// `namespace/name` (or just `name` for cluster-scoped objects) for errors and logs.
#[must_use]
pub fn qualified_name(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{ns}/{name}"),
        _ => name.to_string(),
    }
}

/// Name of an object, or a backend error if it has none.
///
/// # Errors
///
/// [`StoreError::Backend`] when `metadata.name` is unset.
pub fn object_name<K: StoreResource>(object: &K) -> Result<String, StoreError> {
    object.meta().name.clone().ok_or_else(|| StoreError::Backend {
        kind: K::kind_name(),
        message: "object has no name".to_string(),
    })
}

/// Namespace of an object for a namespaced kind, `None` for cluster-scoped kinds.
///
/// # Errors
///
/// [`StoreError::Backend`] when a namespaced object has no namespace.
pub fn object_namespace<K: StoreResource>(object: &K) -> Result<Option<String>, StoreError> {
    if !K::NAMESPACED {
        return Ok(None);
    }
    object
        .meta()
        .namespace
        .clone()
        .map(Some)
        .ok_or_else(|| StoreError::Backend {
            kind: K::kind_name(),
            message: format!(
                "object '{}' has no namespace",
                object.meta().name.as_deref().unwrap_or_default()
            ),
        })
}
