// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use clap::Parser;
use epicctl::{
    cli::{Cli, Command, CreateCommand},
    commands::{execute, execute_local},
    config::{default_config_path, FileConfig},
    context::Context,
    kube_store::KubeStore,
};
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client,
};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A one-shot command does not need many workers
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("epicctl")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging(cli.debug);

    if let Some(output) = execute_local(&cli.command) {
        print!("{}", output?);
        return Ok(());
    }

    let config_path = cli.config.clone().or_else(default_config_path);
    let config = match &config_path {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let client = kube_client(config.kubeconfig(cli.kubeconfig.clone()).as_deref()).await?;

    let mut ctx = Context::new(KubeStore::new(client))
        .with_cluster_name(config.cluster_name(cli.command.cluster_flag()));
    ctx.poll = config.poll_settings()?;
    if let Some(timeout) = cli.command.poll_timeout() {
        ctx.poll.timeout = timeout;
    }

    let command = fill_from_environment(cli.command).await?;

    tokio::select! {
        result = execute(&ctx, &config, command) => {
            print!("{}", result?);
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; steps already completed are not rolled back");
            anyhow::bail!("interrupted")
        }
    }
}

/// Logging goes to stderr so command output stays clean.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--debug`.
/// `RUST_LOG_FORMAT=json` switches to JSON lines.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .init();
        }
    }

    debug!("Logging initialized");
}

async fn kube_client(kubeconfig: Option<&Path>) -> Result<Client> {
    let Some(path) = kubeconfig else {
        debug!("Using the default Kubernetes client configuration");
        return Ok(Client::try_default().await?);
    };

    debug!(path = %path.display(), "Loading kubeconfig");
    let kubeconfig = Kubeconfig::read_from(path)
        .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
    let config =
        kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
    Ok(Client::try_from(config)?)
}

/// Fill in inputs that come from the terminal or the host rather than from flags.
async fn fill_from_environment(command: Command) -> Result<Command> {
    match command {
        Command::Create(CreateCommand::ApiUser {
            username,
            user_namespace,
            password: None,
        }) => {
            let password = read_password_line().await?;
            Ok(Command::Create(CreateCommand::ApiUser {
                username,
                user_namespace,
                password: Some(password),
            }))
        }
        Command::Create(CreateCommand::AdHocEndpoint {
            address,
            port,
            account,
            cluster_name,
            host_name: None,
        }) => {
            let host_name = read_host_name()?;
            Ok(Command::Create(CreateCommand::AdHocEndpoint {
                address,
                port,
                account,
                cluster_name,
                host_name: Some(host_name),
            }))
        }
        other => Ok(other),
    }
}

async fn read_password_line() -> Result<String> {
    eprint!("Password: ");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines
        .next_line()
        .await
        .context("failed to read password from stdin")?
        .unwrap_or_default();
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn read_host_name() -> Result<String> {
    let path = PathBuf::from("/etc/hostname");
    let name = std::fs::read_to_string(&path)
        .with_context(|| format!("no --host-name given and {} is unreadable", path.display()))?;
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "no --host-name given and {} is empty", path.display());
    Ok(name.to_string())
}
