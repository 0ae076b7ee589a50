// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! API users of a user namespace.
//!
//! API users live in the web-service secret as `user:hash` records (see
//! [`crate::credentials`]). Adds and deletes are read-modify-writes of that one secret,
//! retried when another writer got there first.

use crate::constants::{MIN_PASSWORD_LEN, WEB_SERVICE_SECRET_NAME};
use crate::context::Context;
use crate::credentials::CredentialSet;
use crate::errors::{EpicError, Result};
use crate::names::account_namespace;
use crate::retry::retry_on_conflict;
use crate::store::ResourceStore;
use k8s_openapi::api::core::v1::Secret;
use tracing::info;

/// Reject passwords shorter than the minimum length.
///
/// # Errors
///
/// [`EpicError::InvalidArgument`] for a short password. The value is never echoed.
pub fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EpicError::InvalidArgument {
            what: "password",
            value: "<redacted>".to_string(),
            reason: format!("minimum password length is {MIN_PASSWORD_LEN} characters"),
        });
    }
    Ok(())
}

/// Add an API user to a user namespace.
///
/// # Errors
///
/// - [`EpicError::InvalidArgument`] for a short password (before any store call)
/// - [`EpicError::NotFound`] if the user namespace has no web-service secret
/// - [`EpicError::DuplicateUser`] if the username exists; nothing is written
pub async fn create_api_user<S: ResourceStore>(
    ctx: &Context<S>,
    account: &str,
    username: &str,
    password: &str,
) -> Result<()> {
    check_password(password)?;
    let namespace = account_namespace(account)?;
    let store = &ctx.store;
    let (ns, cost) = (namespace.as_str(), ctx.hash_cost);

    retry_on_conflict("create api-user", move || async move {
        let mut secret: Secret = store.get(Some(ns), WEB_SERVICE_SECRET_NAME).await?;
        let mut credentials = CredentialSet::from_secret(&secret);
        credentials.add(account, username, password, cost)?;
        credentials.write_to(&mut secret);
        store.update(&secret).await?;
        Ok::<_, EpicError>(())
    })
    .await?;

    info!(namespace = %namespace, username = %username, "API user created");
    Ok(())
}

/// Remove an API user from a user namespace, keeping the other records in order.
///
/// # Errors
///
/// [`EpicError::NotFound`] if the secret or the user does not exist.
pub async fn delete_api_user<S: ResourceStore>(
    ctx: &Context<S>,
    account: &str,
    username: &str,
) -> Result<()> {
    let namespace = account_namespace(account)?;
    let store = &ctx.store;
    let ns = namespace.as_str();

    retry_on_conflict("delete api-user", move || async move {
        let mut secret: Secret = store.get(Some(ns), WEB_SERVICE_SECRET_NAME).await?;
        let mut credentials = CredentialSet::from_secret(&secret);
        if !credentials.remove(username) {
            return Err(EpicError::NotFound {
                kind: "api-user".to_string(),
                name: format!("{username} in user namespace {account}"),
            });
        }
        credentials.write_to(&mut secret);
        store.update(&secret).await?;
        Ok(())
    })
    .await?;

    info!(namespace = %namespace, username = %username, "API user deleted");
    Ok(())
}

/// Usernames of a user namespace, in store order.
///
/// # Errors
///
/// [`EpicError::NotFound`] if the user namespace has no web-service secret.
pub async fn list_api_users<S: ResourceStore>(
    ctx: &Context<S>,
    account: &str,
) -> Result<Vec<String>> {
    let namespace = account_namespace(account)?;
    let secret: Secret = ctx.store.get(Some(&namespace), WEB_SERVICE_SECRET_NAME).await?;
    Ok(CredentialSet::from_secret(&secret)
        .usernames()
        .into_iter()
        .map(str::to_string)
        .collect())
}
