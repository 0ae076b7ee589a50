// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for commands.rs

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::cli::Cli;
    use crate::crd::{LBServiceGroup, LBServiceGroupSpec, LoadBalancer};
    use crate::index::{Owner, OwnerLabels};
    use crate::memory_store::InMemoryStore;
    use clap::Parser;

    fn command(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("epicctl").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    fn ctx() -> Context<InMemoryStore> {
        let ctx = Context::new(InMemoryStore::new()).with_hash_cost(4);
        let mut sg = LBServiceGroup::new("gatewayhttp", LBServiceGroupSpec::default());
        sg.metadata.namespace = Some("epic-acme".to_string());
        sg.metadata.labels = Some(
            OwnerLabels::new()
                .with(Owner::ServicePrefix, "default")
                .into_labels(),
        );
        ctx.store.put(&sg).unwrap();
        ctx
    }

    /// Account and service group come from the config file in these tests.
    fn config() -> FileConfig {
        FileConfig {
            account: Some("acme".to_string()),
            service_group: Some("gatewayhttp".to_string()),
            ..Default::default()
        }
    }

    async fn run(ctx: &Context<InMemoryStore>, args: &[&str]) -> Result<String> {
        execute(ctx, &config(), command(args)).await
    }

    #[test]
    fn test_version_line() {
        let text = execute_local(&command(&["version"])).unwrap().unwrap();
        assert_eq!(text, format!("epicctl {}\n", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_manifest_runs_locally() {
        let text = execute_local(&command(&[
            "create",
            "servicegroup-manifest",
            "gatewayhttp",
            "epic.example.net",
            "acme",
            "default",
            "acme",
            "ws-pass",
        ]))
        .unwrap()
        .unwrap();
        assert!(text.starts_with("---\n"));
        assert!(text.contains("kind: ServiceGroup"));
    }

    #[test]
    fn test_manifest_rejects_separator_in_group() {
        let result = execute_local(&command(&[
            "create", "sg", "gateway-http", "h", "acme", "default", "u", "p",
        ]))
        .unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_cluster_commands_are_not_local() {
        assert!(execute_local(&command(&["status"])).is_none());
        assert!(execute_local(&command(&["get", "user-namespaces"])).is_none());
    }

    #[tokio::test]
    async fn test_load_balancer_round() {
        let ctx = ctx();

        let created = run(&ctx, &["create", "load-balancer", "web", "TCP/80,TCP/443"])
            .await
            .unwrap();
        assert_eq!(created, "load balancer web created as gatewayhttp-web\n");

        let listed = run(&ctx, &["get", "load-balancers"]).await.unwrap();
        assert!(listed.contains("web"));
        assert!(listed.contains("TCP/80,TCP/443"));

        let added = run(&ctx, &["create", "upstream-cluster", "web", "edge-1"]).await.unwrap();
        assert_eq!(added, "cluster edge-1 added to web\n");
        let again = run(&ctx, &["create", "upstream-cluster", "web", "edge-1"]).await.unwrap();
        assert_eq!(again, "cluster edge-1 already upstream of web\n");

        let retained = run(&ctx, &["delete", "load-balancer", "web"]).await.unwrap();
        assert_eq!(retained, "load balancer web detached, still used by edge-1\n");

        let removed = run(&ctx, &["delete", "upstream-cluster", "web", "edge-1"]).await.unwrap();
        assert_eq!(removed, "cluster edge-1 removed from web\n");
        assert_eq!(ctx.store.count::<LoadBalancer>(), 1);

        let deleted = run(&ctx, &["delete", "load-balancer", "web"]).await.unwrap();
        assert_eq!(deleted, "load balancer web deleted\n");
        assert_eq!(ctx.store.count::<LoadBalancer>(), 0);
    }

    #[tokio::test]
    async fn test_remote_endpoint_round() {
        let ctx = ctx();
        run(&ctx, &["create", "lb", "web", "80"]).await.unwrap();

        let created = run(&ctx, &["create", "rep", "web", "10.0.0.5", "TCP/8080"])
            .await
            .unwrap();
        assert!(created.starts_with("remote endpoint 10-0-0-5-8080-tcp-"));

        let listed = run(&ctx, &["get", "remote-endpoints", "web"]).await.unwrap();
        assert!(listed.contains("10.0.0.5"));
        assert!(listed.contains("8080"));

        let described = run(&ctx, &["describe", "lb", "web"]).await.unwrap();
        assert!(described.contains("Object:    gatewayhttp-web"));
        assert!(described.contains("10.0.0.5"));

        let deleted = run(&ctx, &["delete", "rep", "web", "10.0.0.5", "TCP/8080"])
            .await
            .unwrap();
        assert!(deleted.ends_with(" deleted\n"));
    }

    #[tokio::test]
    async fn test_flags_win_over_config() {
        let ctx = ctx();
        let err = run(&ctx, &["create", "lb", "web", "80", "-a", "other"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"), "{err}");
    }

    #[tokio::test]
    async fn test_missing_account_is_reported() {
        let ctx = ctx();
        let empty = FileConfig::default();
        let err = execute(&ctx, &empty, command(&["get", "load-balancers"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("account is required"), "{err}");
        assert!(ctx.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_user_namespace_and_api_users() {
        let ctx = ctx();

        let report = run(
            &ctx,
            &["create", "user-namespace", "acme", "puller", "pull-pass", "acme", "ws-pass"],
        )
        .await
        .unwrap();
        assert_eq!(report.lines().count(), 4);
        assert!(report.lines().all(|l| l.ends_with(": created")));

        let created = run(
            &ctx,
            &["create", "api-user", "alice", "acme", "--password", "s3cret!"],
        )
        .await
        .unwrap();
        assert_eq!(created, "api-user alice created in acme\n");

        let users = run(&ctx, &["get", "api-users", "acme"]).await.unwrap();
        assert_eq!(users, "acme\nalice\n");

        let described = run(&ctx, &["describe", "user-namespace", "acme"]).await.unwrap();
        assert!(described.contains("API users: acme, alice"));

        let deleted = run(&ctx, &["delete", "api-user", "alice", "acme"]).await.unwrap();
        assert_eq!(deleted, "api-user alice deleted from acme\n");

        let namespaces = run(&ctx, &["get", "user-namespaces"]).await.unwrap();
        assert!(namespaces.lines().nth(1).is_some_and(|l| l.contains("acme")));
    }

    #[tokio::test]
    async fn test_api_user_without_password_is_an_error() {
        let ctx = ctx();
        let mut cmd = command(&["create", "api-user", "alice", "acme", "--password", "x"]);
        if let Command::Create(CreateCommand::ApiUser { password, .. }) = &mut cmd {
            *password = None;
        }
        let err = execute(&ctx, &config(), cmd).await.unwrap_err();
        assert!(err.to_string().contains("password is required"), "{err}");
    }

    #[tokio::test]
    async fn test_status_counts_pods() {
        let ctx = ctx();
        assert_eq!(run(&ctx, &["status"]).await.unwrap(), "0 pods\n");
    }
}
