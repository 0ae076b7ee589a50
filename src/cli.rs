// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line surface.
//!
//! Commands group as `create`, `delete`, `get`, `describe`, `status` and `version`.
//! Identifiers are positional; scope comes from named flags, which can also be set in the
//! environment (`EPICCTL_ACCOUNT`, `EPICCTL_SERVICE_GROUP`, `EPICCTL_CLUSTER_NAME`) or
//! in the config file.

use crate::constants::{ADHOC_CLUSTER_NAME, DEFAULT_GATEWAY_SERVICE_GROUP};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Manage EPIC load balancers, gateways and user namespaces.
#[derive(Debug, Parser)]
#[command(name = "epicctl", version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file (default: $HOME/.epicctl.yaml)
    #[arg(long, global = true, env = "EPICCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kubeconfig of the EPIC cluster (default: in-cluster or $KUBECONFIG)
    #[arg(long, global = true, env = "EPICCTL_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create resources
    #[command(subcommand)]
    Create(CreateCommand),

    /// Delete resources
    #[command(subcommand)]
    Delete(DeleteCommand),

    /// List resources
    #[command(subcommand, alias = "list")]
    Get(GetCommand),

    /// Show one resource in detail
    #[command(subcommand)]
    Describe(DescribeCommand),

    /// Show cluster status
    Status,

    /// Print the version
    Version,
}

/// Account (user namespace) a command acts in.
#[derive(Debug, Clone, Args)]
pub struct AccountArgs {
    /// Account (user namespace name without the `epic-` prefix)
    #[arg(short = 'a', long, env = "EPICCTL_ACCOUNT")]
    pub account: Option<String>,
}

/// Account and service group of a load balancer.
#[derive(Debug, Clone, Args)]
pub struct ScopeArgs {
    /// Account (user namespace name without the `epic-` prefix)
    #[arg(short = 'a', long, env = "EPICCTL_ACCOUNT")]
    pub account: Option<String>,

    /// Service group the load balancer belongs to
    #[arg(short = 'g', long, env = "EPICCTL_SERVICE_GROUP")]
    pub service_group: Option<String>,
}

/// Cluster this invocation acts for.
#[derive(Debug, Clone, Args)]
pub struct ClusterArgs {
    /// Cluster name recorded on endpoints and upstream lists (default: epicctl)
    #[arg(long, env = "EPICCTL_CLUSTER_NAME")]
    pub cluster_name: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CreateCommand {
    /// Create a load balancer, e.g. `create load-balancer web TCP/80,TCP/443`
    #[command(alias = "lb")]
    LoadBalancer {
        /// Display name
        name: String,
        /// Ports: comma-separated PORT or PROTOCOL/PORT (TCP or UDP)
        ports: String,
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Register a remote endpoint on a load balancer
    #[command(alias = "rep", alias = "remoteendpoint")]
    RemoteEndpoint {
        /// Load balancer display name
        load_balancer: String,
        /// Endpoint IP address
        address: String,
        /// Endpoint port, e.g. TCP/8080 or UDP/123
        port: String,
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Add an upstream cluster to a load balancer
    #[command(alias = "upstream")]
    UpstreamCluster {
        /// Load balancer display name
        load_balancer: String,
        /// Cluster to add
        cluster: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Create a user namespace with its account and secrets
    #[command(alias = "ns", alias = "user-ns")]
    UserNamespace {
        /// Account name
        name: String,
        /// Registry user name
        registry_user: String,
        /// Registry password
        registry_password: String,
        /// Web service user name
        ws_user: String,
        /// Web service password
        ws_password: String,
    },

    /// Add an API user to a user namespace
    #[command(alias = "api-users")]
    ApiUser {
        /// New user name
        username: String,
        /// User namespace (account) name
        user_namespace: String,
        /// Password (otherwise read as one line from stdin)
        #[arg(long, env = "EPICCTL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an ad-hoc gateway and wait for its address
    #[command(alias = "ad-hoc-gw")]
    AdHocGateway {
        /// Gateway name (unique within the account)
        name: String,
        /// Port on which the gateway receives traffic
        port: String,
        #[command(flatten)]
        account: AccountArgs,
        /// Service group the gateway belongs to
        #[arg(long, default_value = DEFAULT_GATEWAY_SERVICE_GROUP)]
        service_group: String,
        /// Give up waiting for an address after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Register this host as an ad-hoc endpoint
    #[command(alias = "ad-hoc")]
    AdHocEndpoint {
        /// Address EPIC sends traffic to
        address: String,
        /// Port EPIC sends traffic to
        port: String,
        #[command(flatten)]
        account: AccountArgs,
        /// Endpoint cluster this host joins
        #[arg(long, default_value = ADHOC_CLUSTER_NAME)]
        cluster_name: String,
        /// This host's name
        #[arg(long, env = "HOSTNAME")]
        host_name: Option<String>,
    },

    /// Print a PureLB ServiceGroup manifest
    #[command(alias = "sg")]
    ServicegroupManifest(ManifestArgs),
}

/// Positional inputs of `create servicegroup-manifest`.
#[derive(Debug, Clone, Args)]
pub struct ManifestArgs {
    /// EPIC LBServiceGroup the PureLB group references
    pub lb_service_group: String,
    /// Host name of the EPIC web service
    pub host: String,
    /// EPIC user namespace (account) name
    pub user_namespace: String,
    /// Name of the new PureLB ServiceGroup
    pub group: String,
    /// Web service user name
    pub ws_user: String,
    /// Web service password
    pub ws_password: String,
}

#[derive(Debug, Subcommand)]
pub enum DeleteCommand {
    /// Detach this cluster from a load balancer and delete it once unused
    #[command(alias = "lb")]
    LoadBalancer {
        /// Load balancer display name
        name: String,
        /// Delete even if other clusters still use the load balancer
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Delete the remote endpoint matching address and port
    #[command(alias = "rep", alias = "remoteendpoint")]
    RemoteEndpoint {
        /// Load balancer display name
        load_balancer: String,
        /// Endpoint IP address
        address: String,
        /// Endpoint port, e.g. TCP/8080
        port: String,
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Remove an upstream cluster from a load balancer
    #[command(alias = "upstream")]
    UpstreamCluster {
        /// Load balancer display name
        load_balancer: String,
        /// Cluster to remove
        cluster: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Remove an API user from a user namespace
    #[command(alias = "api-users")]
    ApiUser {
        /// User name
        username: String,
        /// User namespace (account) name
        user_namespace: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum GetCommand {
    /// List load balancers of an account
    #[command(alias = "lb", alias = "lbs", alias = "load-balancer")]
    LoadBalancers {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// List remote endpoints of a load balancer
    #[command(alias = "rep", alias = "reps", alias = "remote-endpoint")]
    RemoteEndpoints {
        /// Load balancer display name
        load_balancer: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// List API users of a user namespace
    #[command(alias = "api-user")]
    ApiUsers {
        /// User namespace (account) name
        user_namespace: String,
    },

    /// List user namespaces
    #[command(alias = "ns", alias = "user-namespace")]
    UserNamespaces,
}

#[derive(Debug, Subcommand)]
pub enum DescribeCommand {
    /// Describe a load balancer and its endpoints
    #[command(alias = "lb")]
    LoadBalancer {
        /// Load balancer display name
        name: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Describe a user namespace
    #[command(alias = "ns", alias = "user-ns")]
    UserNamespace {
        /// User namespace (account) name
        name: String,
    },
}

impl Command {
    /// Whether the command talks to the EPIC cluster at all.
    #[must_use]
    pub fn needs_cluster(&self) -> bool {
        !matches!(
            self,
            Command::Version | Command::Create(CreateCommand::ServicegroupManifest(_))
        )
    }

    /// The `--cluster-name` flag, for commands that take one.
    #[must_use]
    pub fn cluster_flag(&self) -> Option<String> {
        match self {
            Command::Create(
                CreateCommand::LoadBalancer { cluster, .. }
                | CreateCommand::RemoteEndpoint { cluster, .. },
            )
            | Command::Delete(
                DeleteCommand::LoadBalancer { cluster, .. }
                | DeleteCommand::RemoteEndpoint { cluster, .. },
            ) => cluster.cluster_name.clone(),
            _ => None,
        }
    }

    /// The `--timeout-secs` override of the address wait.
    #[must_use]
    pub fn poll_timeout(&self) -> Option<Duration> {
        match self {
            Command::Create(CreateCommand::AdHocGateway {
                timeout_secs: Some(secs),
                ..
            }) => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
