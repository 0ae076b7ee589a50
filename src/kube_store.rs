// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! [`ResourceStore`] backed by the Kubernetes API server.
//!
//! Each call builds a typed `kube::Api` for the resource kind and maps API errors onto
//! [`StoreError`]:
//!
//! | API response | Store error |
//! |--------------|-------------|
//! | 404 | `NotFound` |
//! | 409, reason `AlreadyExists` | `AlreadyExists` |
//! | 409, any other reason | `Conflict` |
//! | anything else | `Backend` |
//!
//! Transient failures (429, 5xx, transport) are retried with exponential backoff by
//! [`retry_api_call`] before they reach the caller.

use crate::constants::KUBE_LIST_PAGE_SIZE;
use crate::errors::StoreError;
use crate::index::Selector;
use crate::retry::retry_api_call;
use crate::store::{object_name, object_namespace, qualified_name, ResourceStore, StoreResource};
use async_trait::async_trait;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::Client;
use tracing::debug;

/// Resource store that talks to a Kubernetes API server.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying Kubernetes client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Map a `kube::Error` for `kind`/`name` onto a [`StoreError`].
#[must_use]
pub fn map_kube_error(err: &kube::Error, kind: &str, name: &str) -> StoreError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => StoreError::NotFound {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
            StoreError::AlreadyExists {
                kind: kind.to_string(),
                name: name.to_string(),
            }
        }
        kube::Error::Api(ae) if ae.code == 409 => StoreError::Conflict {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        other => StoreError::Backend {
            kind: kind.to_string(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    async fn create<K: StoreResource>(&self, object: &K) -> Result<K, StoreError> {
        let kind = K::kind_name();
        let namespace = object_namespace(object)?;
        let target = qualified_name(namespace.as_deref(), &object_name(object)?);
        let api = K::api(self.client.clone(), namespace.as_deref());

        let params = PostParams::default();

        debug!(kind = %kind, name = %target, "Creating resource");
        retry_api_call(
            || api.create(&params, object),
            &format!("create {kind} {target}"),
        )
        .await
        .map_err(|e| map_kube_error(&e, &kind, &target))
    }

    async fn get<K: StoreResource>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<K, StoreError> {
        let kind = K::kind_name();
        let namespace = namespace.filter(|_| K::NAMESPACED);
        let target = qualified_name(namespace, name);
        let api = K::api(self.client.clone(), namespace);

        retry_api_call(|| api.get(name), &format!("get {kind} {target}"))
            .await
            .map_err(|e| map_kube_error(&e, &kind, &target))
    }

    async fn list<K: StoreResource>(
        &self,
        namespace: Option<&str>,
        selector: &Selector,
    ) -> Result<Vec<K>, StoreError> {
        let kind = K::kind_name();
        let namespace = namespace.filter(|_| K::NAMESPACED);
        let api = K::api(self.client.clone(), namespace);

        let mut params = ListParams::default().limit(KUBE_LIST_PAGE_SIZE);
        if let Some(query) = selector.to_query() {
            params = params.labels(&query);
        }

        let mut items = Vec::new();
        let mut page_count = 0;
        loop {
            page_count += 1;
            let page = retry_api_call(
                || api.list(&params),
                &format!("list {kind} in {}", namespace.unwrap_or("<all>")),
            )
            .await
            .map_err(|e| map_kube_error(&e, &kind, namespace.unwrap_or_default()))?;

            items.extend(page.items);
            debug!(
                kind = %kind,
                page = page_count,
                total_items = items.len(),
                "Fetched page from Kubernetes API"
            );

            match page.metadata.continue_ {
                Some(token) if !token.is_empty() => params = params.continue_token(&token),
                _ => break,
            }
        }
        Ok(items)
    }

    async fn update<K: StoreResource>(&self, object: &K) -> Result<K, StoreError> {
        let kind = K::kind_name();
        let namespace = object_namespace(object)?;
        let name = object_name(object)?;
        let target = qualified_name(namespace.as_deref(), &name);
        let api = K::api(self.client.clone(), namespace.as_deref());

        let params = PostParams::default();

        debug!(kind = %kind, name = %target, "Replacing resource");
        retry_api_call(
            || api.replace(&name, &params, object),
            &format!("replace {kind} {target}"),
        )
        .await
        .map_err(|e| map_kube_error(&e, &kind, &target))
    }

    async fn delete<K: StoreResource>(&self, object: &K) -> Result<(), StoreError> {
        let kind = K::kind_name();
        let namespace = object_namespace(object)?;
        let name = object_name(object)?;
        let target = qualified_name(namespace.as_deref(), &name);
        let api = K::api(self.client.clone(), namespace.as_deref());

        let params = DeleteParams::default();

        debug!(kind = %kind, name = %target, "Deleting resource");
        retry_api_call(
            || api.delete(&name, &params),
            &format!("delete {kind} {target}"),
        )
        .await
        .map(|_| ())
        .map_err(|e| map_kube_error(&e, &kind, &target))
    }
}

#[cfg(test)]
#[path = "kube_store_tests.rs"]
mod kube_store_tests;
