// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-process [`ResourceStore`] used by tests and dry runs.
//!
//! The store behaves like the API server in the ways the lifecycle code depends on:
//!
//! - objects are keyed by `(kind, namespace, name)` and listed in name order
//! - every write bumps a global resource version; an update carrying a stale
//!   version fails with [`StoreError::Conflict`]
//! - create of an existing name fails with [`StoreError::AlreadyExists`]; a new object
//!   gets a creation timestamp unless it already carries one
//! - objects are kept as JSON, so what a write returns is what a later read returns
//!
//! It also records every call and accepts one-shot injected failures, so tests can check
//! the order of operations and what happens when one step fails.

use crate::errors::StoreError;
use crate::index::Selector;
use crate::store::{object_name, object_namespace, qualified_name, ResourceStore, StoreResource};
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::jiff::Timestamp;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Store operations, used for the call log and for failure injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Get,
    List,
    Update,
    Delete,
}

/// One entry of the call log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub kind: String,
    /// Qualified object name, or the namespace for list calls.
    pub target: String,
}

#[derive(Clone, Debug)]
struct InjectedFailure {
    op: StoreOp,
    kind: String,
    error: StoreError,
}

type ObjectKey = (String, String, String);

#[derive(Default)]
struct State {
    objects: BTreeMap<ObjectKey, serde_json::Value>,
    next_version: u64,
    calls: Vec<StoreCall>,
    failures: Vec<InjectedFailure>,
}

/// Thread-safe in-memory resource store.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `op` on `kind` fail with `error`. Failures fire once, in the order added.
    pub fn fail_next(&self, op: StoreOp, kind: &str, error: StoreError) {
        self.lock().failures.push(InjectedFailure {
            op,
            kind: kind.to_string(),
            error,
        });
    }

    /// Every call made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Calls of one operation type, oldest first.
    #[must_use]
    pub fn calls_of(&self, op: StoreOp) -> Vec<StoreCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.op == op)
            .cloned()
            .collect()
    }

    /// Forget the call log.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Number of stored objects of kind `K`.
    #[must_use]
    pub fn count<K: StoreResource>(&self) -> usize {
        let kind = K::kind_name();
        self.lock()
            .objects
            .keys()
            .filter(|(k, _, _)| *k == kind)
            .count()
    }

    /// Insert or overwrite an object directly, bypassing create semantics and the call log.
    ///
    /// Used to seed fixtures and to play the part of an external reconciler.
    ///
    /// # Errors
    ///
    /// [`StoreError::Backend`] if the object has no name or cannot be serialized.
    pub fn put<K: StoreResource>(&self, object: &K) -> Result<K, StoreError> {
        let mut state = self.lock();
        let key = key_of(object)?;
        let stored = to_value(&state.stamp(object.clone()))?;
        let round_tripped = from_value(&stored);
        state.objects.insert(key, stored);
        round_tripped
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked; the data is still usable.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl State {
    fn record(&mut self, op: StoreOp, kind: &str, target: String) -> Result<(), StoreError> {
        self.calls.push(StoreCall {
            op,
            kind: kind.to_string(),
            target,
        });
        if let Some(pos) = self
            .failures
            .iter()
            .position(|failure| failure.op == op && failure.kind == kind)
        {
            let failure = self.failures.remove(pos);
            debug!(op = ?op, kind = %kind, "Injected store failure");
            return Err(failure.error);
        }
        Ok(())
    }

    fn stamp<K: StoreResource>(&mut self, mut object: K) -> K {
        self.next_version += 1;
        object.meta_mut().resource_version = Some(self.next_version.to_string());
        object
    }
}

fn key_of<K: StoreResource>(object: &K) -> Result<ObjectKey, StoreError> {
    Ok((
        K::kind_name(),
        object_namespace(object)?.unwrap_or_default(),
        object_name(object)?,
    ))
}

fn to_value<K: StoreResource>(object: &K) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(object).map_err(|e| StoreError::Backend {
        kind: K::kind_name(),
        message: e.to_string(),
    })
}

fn from_value<K: StoreResource>(value: &serde_json::Value) -> Result<K, StoreError> {
    serde_json::from_value(value.clone()).map_err(|e| StoreError::Backend {
        kind: K::kind_name(),
        message: e.to_string(),
    })
}

fn labels_of(value: &serde_json::Value) -> BTreeMap<String, String> {
    value
        .pointer("/metadata/labels")
        .and_then(serde_json::Value::as_object)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn create<K: StoreResource>(&self, object: &K) -> Result<K, StoreError> {
        let kind = K::kind_name();
        let mut state = self.lock();
        let key = key_of(object)?;
        let target = qualified_name(Some(&key.1), &key.2);
        state.record(StoreOp::Create, &kind, target.clone())?;

        if state.objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists { kind, name: target });
        }
        let mut object = object.clone();
        object
            .meta_mut()
            .creation_timestamp
            .get_or_insert_with(|| Time(Timestamp::now()));
        let stored = to_value(&state.stamp(object))?;
        let round_tripped = from_value(&stored);
        state.objects.insert(key, stored);
        round_tripped
    }

    async fn get<K: StoreResource>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<K, StoreError> {
        let kind = K::kind_name();
        let namespace = if K::NAMESPACED { namespace.unwrap_or_default() } else { "" };
        let mut state = self.lock();
        let target = qualified_name(Some(namespace), name);
        state.record(StoreOp::Get, &kind, target.clone())?;

        let key = (kind.clone(), namespace.to_string(), name.to_string());
        match state.objects.get(&key) {
            Some(value) => from_value(value),
            None => Err(StoreError::NotFound { kind, name: target }),
        }
    }

    async fn list<K: StoreResource>(
        &self,
        namespace: Option<&str>,
        selector: &Selector,
    ) -> Result<Vec<K>, StoreError> {
        let kind = K::kind_name();
        let mut state = self.lock();
        state.record(
            StoreOp::List,
            &kind,
            namespace.unwrap_or_default().to_string(),
        )?;

        state
            .objects
            .iter()
            .filter(|((k, ns, _), _)| {
                *k == kind && (!K::NAMESPACED || namespace.is_none_or(|wanted| ns == wanted))
            })
            .filter(|(_, value)| selector.matches(&labels_of(value)))
            .map(|(_, value)| from_value(value))
            .collect()
    }

    async fn update<K: StoreResource>(&self, object: &K) -> Result<K, StoreError> {
        let kind = K::kind_name();
        let mut state = self.lock();
        let key = key_of(object)?;
        let target = qualified_name(Some(&key.1), &key.2);
        state.record(StoreOp::Update, &kind, target.clone())?;

        let Some(current) = state.objects.get(&key) else {
            return Err(StoreError::NotFound { kind, name: target });
        };
        let current_version = current
            .pointer("/metadata/resourceVersion")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        if let Some(version) = object.meta().resource_version.as_ref() {
            if current_version.as_ref() != Some(version) {
                return Err(StoreError::Conflict { kind, name: target });
            }
        }

        let stored = to_value(&state.stamp(object.clone()))?;
        let round_tripped = from_value(&stored);
        state.objects.insert(key, stored);
        round_tripped
    }

    async fn delete<K: StoreResource>(&self, object: &K) -> Result<(), StoreError> {
        let kind = K::kind_name();
        let mut state = self.lock();
        let key = key_of(object)?;
        let target = qualified_name(Some(&key.1), &key.2);
        state.record(StoreOp::Delete, &kind, target.clone())?;

        match state.objects.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { kind, name: target }),
        }
    }
}

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod memory_store_tests;
