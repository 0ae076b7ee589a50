// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use epicctl::context::Context;
use epicctl::crd::{LBServiceGroup, LBServiceGroupSpec};
use epicctl::index::{Owner, OwnerLabels};
use epicctl::memory_store::InMemoryStore;
use kube::client::Client;

/// Account used by the in-memory scenarios
pub const ACCOUNT: &str = "acme";

/// Namespace of [`ACCOUNT`]
pub const NAMESPACE: &str = "epic-acme";

/// Service group used by the in-memory scenarios
pub const SERVICE_GROUP: &str = "gatewayhttp";

/// Fresh in-memory context with fast hashing and short polls.
pub fn memory_context() -> Context<InMemoryStore> {
    Context::new(InMemoryStore::new())
        .with_hash_cost(4)
        .with_poll(
            std::time::Duration::from_millis(10),
            std::time::Duration::from_secs(2),
        )
}

/// Seed the service group that load balancers inherit their prefix from.
pub fn seed_service_group(ctx: &Context<InMemoryStore>, group: &str, prefix: &str) {
    let mut sg = LBServiceGroup::new(group, LBServiceGroupSpec::default());
    sg.metadata.namespace = Some(NAMESPACE.to_string());
    sg.metadata.labels = Some(
        OwnerLabels::new()
            .with(Owner::ServicePrefix, prefix)
            .into_labels(),
    );
    ctx.store
        .put(&sg)
        .expect("seeding the service group should succeed");
}

/// Get a Kubernetes client or skip the test if no cluster is reachable
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: no usable kubeconfig: {e}");
            None
        }
    }
}

/// Unique-enough suffix so repeated runs do not collide
pub fn unique_suffix() -> String {
    epicctl::names::random_suffix(5)
}
