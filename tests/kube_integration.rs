// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integration tests for the Kubernetes-backed resource store.
//!
//! These need a reachable API server. Only core kinds are used, so the EPIC CRDs do not
//! have to be installed.
//!
//! Run with: cargo test --test kube_integration -- --ignored

mod common;

use common::{get_kube_client_or_skip, unique_suffix};
use epicctl::context::Context;
use epicctl::credentials::{web_service_secret, CredentialSet};
use epicctl::errors::StoreError;
use epicctl::index::Selector;
use epicctl::kube_store::KubeStore;
use epicctl::lifecycle::{create_api_user, delete_api_user, list_api_users};
use epicctl::store::ResourceStore;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

fn test_namespace(name: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([
                ("test".to_string(), "integration".to_string()),
                ("managed-by".to_string(), "epicctl-test".to_string()),
            ])),
            ..Default::default()
        },
        ..Default::default()
    }
}

async fn cleanup(store: &KubeStore, name: &str) {
    let ns = test_namespace(name);
    match store.delete(&ns).await {
        Ok(()) | Err(StoreError::NotFound { .. }) => println!("Deleted test namespace: {name}"),
        Err(e) => eprintln!("Failed to delete test namespace {name}: {e}"),
    }
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster"]
async fn test_namespace_create_get_list() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    let store = KubeStore::new(client);
    let name = format!("epicctl-it-{}", unique_suffix());

    store.create(&test_namespace(&name)).await.unwrap();

    let fetched: Namespace = store.get(None, &name).await.unwrap();
    assert_eq!(fetched.metadata.name.as_deref(), Some(name.as_str()));

    let again = store.create(&test_namespace(&name)).await;
    assert!(matches!(again, Err(StoreError::AlreadyExists { .. })));

    let selector = Selector::everything().and_label("managed-by", "epicctl-test");
    let listed: Vec<Namespace> = store.list(None, &selector).await.unwrap();
    assert!(listed
        .iter()
        .any(|ns| ns.metadata.name.as_deref() == Some(name.as_str())));

    cleanup(&store, &name).await;
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster"]
async fn test_missing_object_is_not_found() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    let store = KubeStore::new(client);

    let result: Result<Namespace, StoreError> =
        store.get(None, "epicctl-it-does-not-exist").await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster"]
async fn test_stale_update_is_a_conflict() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    let store = KubeStore::new(client);
    let name = format!("epicctl-it-{}", unique_suffix());
    store.create(&test_namespace(&name)).await.unwrap();

    let secret = web_service_secret(&name, &CredentialSet::default());
    let first = store.create(&secret).await.unwrap();

    let mut newer = first.clone();
    CredentialSet::parse(b"alice:h1\n").write_to(&mut newer);
    store.update(&newer).await.unwrap();

    let mut stale = first;
    CredentialSet::parse(b"bob:h2\n").write_to(&mut stale);
    let result = store.update(&stale).await;
    assert!(matches!(result, Err(StoreError::Conflict { .. })), "{result:?}");

    cleanup(&store, &name).await;
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster"]
async fn test_api_users_through_kube_store() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    let account = format!("it{}", unique_suffix());
    let namespace = format!("epic-{account}");
    let ctx = Context::new(KubeStore::new(client)).with_hash_cost(4);

    ctx.store.create(&test_namespace(&namespace)).await.unwrap();
    ctx.store
        .create(&web_service_secret(&namespace, &CredentialSet::default()))
        .await
        .unwrap();

    create_api_user(&ctx, &account, "alice", "s3cret!").await.unwrap();
    create_api_user(&ctx, &account, "bob", "s3cret!").await.unwrap();
    assert_eq!(list_api_users(&ctx, &account).await.unwrap(), vec!["alice", "bob"]);

    delete_api_user(&ctx, &account, "alice").await.unwrap();
    let secret: Secret = ctx.store.get(Some(&namespace), "password").await.unwrap();
    assert_eq!(CredentialSet::from_secret(&secret).usernames(), vec!["bob"]);

    cleanup(&ctx.store, &namespace).await;
}
