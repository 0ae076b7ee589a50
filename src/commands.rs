// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command dispatch.
//!
//! Resolves each parsed command's settings against the config file, calls the matching
//! lifecycle operation and renders its result. The binary only prints what comes back.

use crate::cli::{
    Command, CreateCommand, DeleteCommand, DescribeCommand, GetCommand, ManifestArgs, ScopeArgs,
};
use crate::config::FileConfig;
use crate::context::Context;
use crate::lifecycle::{
    add_remote_endpoint, add_upstream_cluster, bootstrap_user_namespace, count_pods,
    create_adhoc_endpoint, create_adhoc_gateway, create_api_user, create_load_balancer,
    delete_api_user, delete_load_balancer, delete_remote_endpoint, describe_load_balancer,
    describe_user_namespace, list_api_users, list_load_balancers, list_remote_endpoints,
    list_user_namespaces, remove_upstream_cluster, LoadBalancerRef, UserNamespaceRequest,
};
use crate::manifest::ServiceGroupManifest;
use crate::output;
use crate::store::ResourceStore;
use anyhow::{anyhow, Result};
use kube::ResourceExt;
use tracing::debug;

/// `epicctl <version>`
#[must_use]
pub fn version() -> String {
    format!("{} {}\n", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Run a command that needs no cluster. `None` for every other command.
pub fn execute_local(command: &Command) -> Option<Result<String>> {
    match command {
        Command::Version => Some(Ok(version())),
        Command::Create(CreateCommand::ServicegroupManifest(args)) => Some(render_manifest(args)),
        _ => None,
    }
}

/// Run `command` against the store in `ctx` and render its result.
///
/// # Errors
///
/// Missing settings, or whatever the lifecycle operation returns.
pub async fn execute<S: ResourceStore>(
    ctx: &Context<S>,
    config: &FileConfig,
    command: Command,
) -> Result<String> {
    debug!(cluster = %ctx.cluster_name, "Executing command");

    match command {
        Command::Create(create) => execute_create(ctx, config, create).await,
        Command::Delete(delete) => execute_delete(ctx, config, delete).await,
        Command::Get(get) => execute_get(ctx, config, get).await,
        Command::Describe(describe) => execute_describe(ctx, config, describe).await,
        Command::Status => {
            let pods = count_pods(ctx).await?;
            Ok(format!("{pods} pods\n"))
        }
        Command::Version => Ok(version()),
    }
}

fn render_manifest(args: &ManifestArgs) -> Result<String> {
    let manifest = ServiceGroupManifest {
        lb_service_group: args.lb_service_group.clone(),
        host: args.host.clone(),
        user_namespace: args.user_namespace.clone(),
        group: args.group.clone(),
        web_service_user: args.ws_user.clone(),
        web_service_password: args.ws_password.clone(),
    };
    Ok(manifest.render()?)
}

fn lb_ref(config: &FileConfig, scope: ScopeArgs, display_name: String) -> Result<LoadBalancerRef> {
    Ok(LoadBalancerRef::new(
        config.account(scope.account)?,
        config.service_group(scope.service_group)?,
        display_name,
    ))
}

async fn execute_create<S: ResourceStore>(
    ctx: &Context<S>,
    config: &FileConfig,
    command: CreateCommand,
) -> Result<String> {
    match command {
        CreateCommand::LoadBalancer {
            name, ports, scope, ..
        } => {
            let lb = lb_ref(config, scope, name)?;
            let created = create_load_balancer(ctx, &lb, &ports).await?;
            Ok(format!(
                "load balancer {} created as {}\n",
                lb.display_name,
                created.name_any()
            ))
        }
        CreateCommand::RemoteEndpoint {
            load_balancer,
            address,
            port,
            scope,
            ..
        } => {
            let lb = lb_ref(config, scope, load_balancer)?;
            let created = add_remote_endpoint(ctx, &lb, &address, &port).await?;
            Ok(format!("remote endpoint {} created\n", created.name_any()))
        }
        CreateCommand::UpstreamCluster {
            load_balancer,
            cluster,
            scope,
        } => {
            let lb = lb_ref(config, scope, load_balancer)?;
            if add_upstream_cluster(ctx, &lb, &cluster).await? {
                Ok(format!("cluster {cluster} added to {}\n", lb.display_name))
            } else {
                Ok(format!("cluster {cluster} already upstream of {}\n", lb.display_name))
            }
        }
        CreateCommand::UserNamespace {
            name,
            registry_user,
            registry_password,
            ws_user,
            ws_password,
        } => {
            let request = UserNamespaceRequest {
                account: name,
                registry_user,
                registry_password,
                web_service_user: ws_user,
                web_service_password: ws_password,
            };
            let report = bootstrap_user_namespace(ctx, &request).await?;
            Ok(output::bootstrap_report(&report))
        }
        CreateCommand::ApiUser {
            username,
            user_namespace,
            password,
        } => {
            let password =
                password.ok_or_else(|| anyhow!("a password is required for api-user {username}"))?;
            create_api_user(ctx, &user_namespace, &username, &password).await?;
            Ok(format!("api-user {username} created in {user_namespace}\n"))
        }
        CreateCommand::AdHocGateway {
            name,
            port,
            account,
            service_group,
            ..
        } => {
            let account = config.account(account.account)?;
            let assignment =
                create_adhoc_gateway(ctx, &account, &service_group, &name, &port).await?;
            Ok(output::gateway_assignment(&assignment))
        }
        CreateCommand::AdHocEndpoint {
            address,
            port,
            account,
            cluster_name,
            host_name,
        } => {
            let account = config.account(account.account)?;
            let host_name = host_name.ok_or_else(|| anyhow!("a host name is required"))?;
            let slice =
                create_adhoc_endpoint(ctx, &account, &cluster_name, &host_name, &address, &port)
                    .await?;
            Ok(format!(
                "endpoint {} joined cluster {cluster_name}\n",
                slice.name_any()
            ))
        }
        CreateCommand::ServicegroupManifest(args) => render_manifest(&args),
    }
}

async fn execute_delete<S: ResourceStore>(
    ctx: &Context<S>,
    config: &FileConfig,
    command: DeleteCommand,
) -> Result<String> {
    match command {
        DeleteCommand::LoadBalancer {
            name, force, scope, ..
        } => {
            let lb = lb_ref(config, scope, name)?;
            let outcome = delete_load_balancer(ctx, &lb, force).await?;
            Ok(format!(
                "{}\n",
                output::load_balancer_deletion(&lb.display_name, &outcome)
            ))
        }
        DeleteCommand::RemoteEndpoint {
            load_balancer,
            address,
            port,
            scope,
            ..
        } => {
            let lb = lb_ref(config, scope, load_balancer)?;
            let deleted = delete_remote_endpoint(ctx, &lb, &address, &port).await?;
            Ok(format!("remote endpoint {} deleted\n", deleted.name_any()))
        }
        DeleteCommand::UpstreamCluster {
            load_balancer,
            cluster,
            scope,
        } => {
            let lb = lb_ref(config, scope, load_balancer)?;
            if remove_upstream_cluster(ctx, &lb, &cluster).await? {
                Ok(format!("cluster {cluster} removed from {}\n", lb.display_name))
            } else {
                Ok(format!("cluster {cluster} was not upstream of {}\n", lb.display_name))
            }
        }
        DeleteCommand::ApiUser {
            username,
            user_namespace,
        } => {
            delete_api_user(ctx, &user_namespace, &username).await?;
            Ok(format!("api-user {username} deleted from {user_namespace}\n"))
        }
    }
}

async fn execute_get<S: ResourceStore>(
    ctx: &Context<S>,
    config: &FileConfig,
    command: GetCommand,
) -> Result<String> {
    match command {
        GetCommand::LoadBalancers { scope } => {
            let account = config.account(scope.account)?;
            let group = config.optional_service_group(scope.service_group);
            let lbs = list_load_balancers(ctx, &account, group.as_deref()).await?;
            Ok(output::load_balancers(&lbs))
        }
        GetCommand::RemoteEndpoints {
            load_balancer,
            scope,
        } => {
            let lb = lb_ref(config, scope, load_balancer)?;
            let endpoints = list_remote_endpoints(ctx, &lb).await?;
            Ok(output::remote_endpoints(&endpoints))
        }
        GetCommand::ApiUsers { user_namespace } => {
            let users = list_api_users(ctx, &user_namespace).await?;
            Ok(output::api_users(&users))
        }
        GetCommand::UserNamespaces => {
            let summaries = list_user_namespaces(ctx).await?;
            Ok(output::user_namespaces(&summaries))
        }
    }
}

async fn execute_describe<S: ResourceStore>(
    ctx: &Context<S>,
    config: &FileConfig,
    command: DescribeCommand,
) -> Result<String> {
    match command {
        DescribeCommand::LoadBalancer { name, scope } => {
            let lb = lb_ref(config, scope, name)?;
            let description = describe_load_balancer(ctx, &lb).await?;
            Ok(output::load_balancer_description(&description))
        }
        DescribeCommand::UserNamespace { name } => {
            let description = describe_user_namespace(ctx, &name).await?;
            Ok(output::user_namespace_description(&description))
        }
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod commands_tests;
