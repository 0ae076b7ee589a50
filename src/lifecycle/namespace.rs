// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! User namespaces (tenants).
//!
//! Bootstrap is four sequential creates:
//!
//! 1. the namespace `epic-<account>`
//! 2. the `Account` object inside it
//! 3. the registry pull secret
//! 4. the web-service basic-auth secret with the first API user
//!
//! The sequence is resumable rather than transactional. A step whose object already
//! exists is adopted as is, so re-running a bootstrap that stopped part way creates only
//! what is missing. A failure after at least one step is reported as
//! [`EpicError::PartialFailure`] naming the completed steps.

use super::api_users::check_password;
use crate::constants::{PRODUCT_NAME, WEB_SERVICE_SECRET_NAME};
use crate::context::Context;
use crate::credentials::{registry_secret, web_service_secret, CredentialSet};
use crate::crd::{Account, AccountSpec, GWProxy};
use crate::errors::{EpicError, Result, StoreError};
use crate::index::{OwnerLabels, Selector};
use crate::labels::{COMPONENT_USER_NAMESPACE, K8S_COMPONENT, K8S_PART_OF};
use crate::names::{account_from_namespace, account_namespace};
use crate::store::{qualified_name, ResourceStore, StoreResource};
use k8s_openapi::api::core::v1::{Namespace, Pod, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::ObjectMeta;
use tracing::{debug, info, warn};

/// Arguments of a user namespace bootstrap.
#[derive(Clone, Debug)]
pub struct UserNamespaceRequest {
    pub account: String,
    pub registry_user: String,
    pub registry_password: String,
    pub web_service_user: String,
    pub web_service_password: String,
}

/// What a finished bootstrap step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The object was created by this run.
    Created,
    /// The object already existed and was left as is.
    Adopted,
}

/// Finished bootstrap steps, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub namespace: String,
    pub steps: Vec<(String, StepOutcome)>,
}

impl BootstrapReport {
    /// Every finished step, in order.
    #[must_use]
    pub fn completed(&self) -> Vec<String> {
        self.steps.iter().map(|(step, _)| step.clone()).collect()
    }

    /// Steps with the given outcome, in order.
    #[must_use]
    pub fn with_outcome(&self, outcome: StepOutcome) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|(_, o)| *o == outcome)
            .map(|(step, _)| step.as_str())
            .collect()
    }
}

/// One row of the user namespace listing.
#[derive(Clone, Debug, PartialEq)]
pub struct UserNamespaceSummary {
    pub account: String,
    pub namespace: String,
    pub created: Option<Time>,
    pub proxies: usize,
}

/// Account, API users and gateway proxies of one user namespace.
#[derive(Clone, Debug)]
pub struct UserNamespaceDescription {
    pub account: Account,
    pub api_users: Vec<String>,
    pub proxies: Vec<GWProxy>,
}

/// Labels every user namespace carries.
fn user_namespace_selector() -> Selector {
    Selector::everything()
        .and_label(K8S_PART_OF, PRODUCT_NAME)
        .and_label(K8S_COMPONENT, COMPONENT_USER_NAMESPACE)
}

/// Create (or complete) a user namespace.
///
/// # Errors
///
/// - [`EpicError::Name`] / [`EpicError::InvalidArgument`] for bad arguments (before any
///   store call)
/// - the first step's own error if nothing was completed
/// - [`EpicError::PartialFailure`] if a later step failed
pub async fn bootstrap_user_namespace<S: ResourceStore>(
    ctx: &Context<S>,
    request: &UserNamespaceRequest,
) -> Result<BootstrapReport> {
    let namespace = account_namespace(&request.account)?;
    check_password(&request.web_service_password)?;

    let mut credentials = CredentialSet::default();
    credentials.add(
        &request.account,
        &request.web_service_user,
        &request.web_service_password,
        ctx.hash_cost,
    )?;

    let mut report = BootstrapReport {
        namespace: namespace.clone(),
        ..Default::default()
    };

    let ns_object = Namespace {
        metadata: ObjectMeta {
            name: Some(namespace.clone()),
            labels: Some(
                OwnerLabels::new()
                    .with_label(K8S_PART_OF, PRODUCT_NAME)
                    .with_label(K8S_COMPONENT, COMPONENT_USER_NAMESPACE)
                    .into_labels(),
            ),
            ..Default::default()
        },
        ..Default::default()
    };
    ensure(ctx, &ns_object, format!("Namespace {namespace}"), &mut report).await?;

    let account = Account {
        metadata: ObjectMeta {
            name: Some(request.account.clone()),
            namespace: Some(namespace.clone()),
            ..Default::default()
        },
        spec: AccountSpec::default(),
    };
    ensure(
        ctx,
        &account,
        format!("Account {}", qualified_name(Some(&namespace), &request.account)),
        &mut report,
    )
    .await?;

    let pull_secret =
        registry_secret(&namespace, &request.registry_user, &request.registry_password);
    ensure(
        ctx,
        &pull_secret,
        format!("registry Secret {namespace}"),
        &mut report,
    )
    .await?;

    let auth_secret = web_service_secret(&namespace, &credentials);
    ensure(
        ctx,
        &auth_secret,
        format!("web-service Secret {namespace}"),
        &mut report,
    )
    .await?;

    info!(
        namespace = %namespace,
        created = report.with_outcome(StepOutcome::Created).len(),
        adopted = report.with_outcome(StepOutcome::Adopted).len(),
        "User namespace ready"
    );
    Ok(report)
}

/// Create `object`, or adopt it if it already exists.
///
/// On failure the error is wrapped in a partial failure when earlier steps finished.
async fn ensure<S: ResourceStore, K: StoreResource>(
    ctx: &Context<S>,
    object: &K,
    step: String,
    report: &mut BootstrapReport,
) -> Result<()> {
    match ctx.store.create(object).await {
        Ok(_) => {
            debug!(step = %step, "Bootstrap step created");
            report.steps.push((step, StepOutcome::Created));
            Ok(())
        }
        Err(StoreError::AlreadyExists { .. }) => {
            info!(step = %step, "Bootstrap step already done, adopting existing object");
            report.steps.push((step, StepOutcome::Adopted));
            Ok(())
        }
        Err(e) => {
            let completed = report.completed();
            if completed.is_empty() {
                return Err(e.into());
            }
            warn!(
                failed_step = %step,
                completed = ?completed,
                error = %e,
                "User namespace bootstrap stopped part way; re-run to complete it"
            );
            Err(EpicError::PartialFailure {
                completed,
                failed_step: step,
                source: Box::new(e.into()),
            })
        }
    }
}

/// All user namespaces, newest first, with their gateway proxy counts.
///
/// # Errors
///
/// Store backend failures.
pub async fn list_user_namespaces<S: ResourceStore>(
    ctx: &Context<S>,
) -> Result<Vec<UserNamespaceSummary>> {
    let namespaces: Vec<Namespace> = ctx.store.list(None, &user_namespace_selector()).await?;

    let mut rows = Vec::with_capacity(namespaces.len());
    for ns in namespaces {
        let Some(name) = ns.metadata.name.clone() else {
            continue;
        };
        let Some(account) = account_from_namespace(&name).map(str::to_string) else {
            debug!(namespace = %name, "Skipping namespace without the product prefix");
            continue;
        };
        let proxies: Vec<GWProxy> = ctx.store.list(Some(&name), &Selector::everything()).await?;
        rows.push(UserNamespaceSummary {
            account,
            namespace: name,
            created: ns.metadata.creation_timestamp.clone(),
            proxies: proxies.len(),
        });
    }

    rows.sort_by(|a, b| {
        b.created
            .cmp(&a.created)
            .then_with(|| a.namespace.cmp(&b.namespace))
    });
    Ok(rows)
}

/// Account, API users and gateway proxies of a user namespace.
///
/// A missing web-service secret is reported as no API users.
///
/// # Errors
///
/// [`EpicError::NotFound`] if the account does not exist.
pub async fn describe_user_namespace<S: ResourceStore>(
    ctx: &Context<S>,
    account: &str,
) -> Result<UserNamespaceDescription> {
    let namespace = account_namespace(account)?;
    let account_object: Account = ctx.store.get(Some(&namespace), account).await?;

    let secret: std::result::Result<Secret, StoreError> =
        ctx.store.get(Some(&namespace), WEB_SERVICE_SECRET_NAME).await;
    let api_users = match secret {
        Ok(secret) => CredentialSet::from_secret(&secret)
            .usernames()
            .into_iter()
            .map(str::to_string)
            .collect(),
        Err(StoreError::NotFound { .. }) => {
            warn!(namespace = %namespace, "User namespace has no web-service secret");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    let proxies = ctx.store.list(Some(&namespace), &Selector::everything()).await?;

    Ok(UserNamespaceDescription {
        account: account_object,
        api_users,
        proxies,
    })
}

/// Number of pods visible across all namespaces.
///
/// # Errors
///
/// Store backend failures.
pub async fn count_pods<S: ResourceStore>(ctx: &Context<S>) -> Result<usize> {
    let pods: Vec<Pod> = ctx.store.list(None, &Selector::everything()).await?;
    Ok(pods.len())
}
