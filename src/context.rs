// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all lifecycle operations.
//!
//! Every operation in [`crate::lifecycle`] receives a `&Context<S>` that carries:
//! - the resource store (`KubeStore` in the binary, `InMemoryStore` in tests)
//! - the name of the cluster this invocation acts for
//! - polling bounds for asynchronous assignments
//! - the bcrypt cost used when hashing API user passwords
//!
//! The context holds no cached resource state. Every operation re-reads what it needs.

use crate::constants::{DEFAULT_CLUSTER_NAME, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_TIMEOUT_SECS};
use crate::retry::PollSettings;
use crate::store::ResourceStore;
use std::time::Duration;

/// Shared context passed to all lifecycle operations.
pub struct Context<S: ResourceStore> {
    /// Resource store all reads and writes go through
    pub store: S,

    /// Cluster recorded on remote endpoints and added to/removed from upstream lists
    pub cluster_name: String,

    /// Bounds for polling asynchronous assignments
    pub poll: PollSettings,

    /// bcrypt work factor for new API user passwords
    pub hash_cost: u32,
}

impl<S: ResourceStore> Context<S> {
    /// Context with the built-in defaults.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            poll: PollSettings {
                interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
                timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
            },
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    #[must_use]
    pub fn with_cluster_name(mut self, cluster_name: impl Into<String>) -> Self {
        self.cluster_name = cluster_name.into();
        self
    }

    #[must_use]
    pub fn with_poll(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll = PollSettings { interval, timeout };
        self
    }

    /// Override the bcrypt cost. Tests use the minimum (4) to stay fast.
    #[must_use]
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
