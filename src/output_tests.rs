// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for output.rs

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::{
        Account, GWProxy, GWProxySpec, LoadBalancerSpec, ProxyEndpoint, RemoteEndpointSpec,
    };
    use crate::ports::{PortSpec, Protocol};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
    use k8s_openapi::jiff::Timestamp;

    fn cells(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    fn lb(address: Option<&str>, upstreams: &[&str]) -> LoadBalancer {
        LoadBalancer::new(
            "gatewayhttp-web",
            LoadBalancerSpec {
                display_name: "web".to_string(),
                public_address: address.map(str::to_string),
                public_ports: vec![
                    PortSpec::new(Protocol::Tcp, 80),
                    PortSpec::new(Protocol::Tcp, 443),
                ],
                upstream_clusters: upstreams.iter().map(|c| (*c).to_string()).collect(),
                true_ingress: false,
            },
        )
    }

    fn endpoint(address: &str, port: PortSpec) -> RemoteEndpoint {
        RemoteEndpoint::new(
            "10-0-0-5-80-tcp-abcde",
            RemoteEndpointSpec {
                cluster: "epicctl".to_string(),
                address: address.to_string(),
                node_address: None,
                port,
            },
        )
    }

    fn proxy(name: &str, assigned: Option<(&str, &str)>) -> GWProxy {
        GWProxy::new(
            name,
            GWProxySpec {
                display_name: name.to_string(),
                client_ref: Default::default(),
                listeners: Vec::new(),
                endpoints: assigned
                    .map(|(address, dns)| {
                        vec![ProxyEndpoint {
                            dns_name: dns.to_string(),
                            targets: vec![address.to_string()],
                        }]
                    })
                    .unwrap_or_default(),
            },
        )
    }

    #[test]
    fn test_load_balancer_table() {
        let text = load_balancers(&[lb(None, &["epicctl", "edge-1"])]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(cells(lines[0]), vec!["NAME", "ADDRESS", "PORTS", "UPSTREAMS"]);
        assert_eq!(
            cells(lines[1]),
            vec!["web", "<none>", "TCP/80,TCP/443", "epicctl,edge-1"]
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_empty_load_balancer_table_has_only_the_header() {
        assert_eq!(load_balancers(&[]).lines().count(), 1);
    }

    #[test]
    fn test_remote_endpoint_table() {
        let text = remote_endpoints(&[endpoint("10.0.0.5", PortSpec::new(Protocol::Udp, 53))]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(cells(lines[0]), vec!["ADDRESS", "PORT", "PROTOCOL", "CLUSTER"]);
        assert_eq!(cells(lines[1]), vec!["10.0.0.5", "53", "UDP", "epicctl"]);
    }

    #[test]
    fn test_load_balancer_description() {
        let description = LoadBalancerDescription {
            load_balancer: lb(Some("192.0.2.1"), &[]),
            endpoints: vec![endpoint("10.0.0.5", PortSpec::new(Protocol::Tcp, 80))],
        };
        let text = load_balancer_description(&description);

        assert!(text.contains("Name:      web\n"));
        assert!(text.contains("Object:    gatewayhttp-web\n"));
        assert!(text.contains("Address:   192.0.2.1\n"));
        assert!(text.contains("Ports:     TCP/80,TCP/443\n"));
        assert!(text.contains("Upstreams: <none>\n"));
        assert!(text.contains("Endpoints:\n"));
        assert!(text.lines().any(|l| cells(l) == vec!["10.0.0.5", "80", "TCP", "epicctl"]));
    }

    #[test]
    fn test_load_balancer_description_without_endpoints() {
        let description = LoadBalancerDescription {
            load_balancer: lb(None, &["epicctl"]),
            endpoints: Vec::new(),
        };
        let text = load_balancer_description(&description);
        assert!(text.contains("Address:   <none>\n"));
        assert!(text.contains("Upstreams: epicctl\n"));
        assert!(text.ends_with("Endpoints: <none>\n"));
    }

    #[test]
    fn test_load_balancer_deletion_lines() {
        assert_eq!(
            load_balancer_deletion("web", &LoadBalancerDeletion::Deleted),
            "load balancer web deleted"
        );
        assert_eq!(
            load_balancer_deletion(
                "web",
                &LoadBalancerDeletion::Retained {
                    remaining: vec!["edge-1".to_string(), "edge-2".to_string()],
                }
            ),
            "load balancer web detached, still used by edge-1, edge-2"
        );
    }

    #[test]
    fn test_bootstrap_report_lines() {
        let report = BootstrapReport {
            namespace: "epic-acme".to_string(),
            steps: vec![
                ("Namespace epic-acme".to_string(), StepOutcome::Adopted),
                ("Account epic-acme/acme".to_string(), StepOutcome::Created),
            ],
        };
        assert_eq!(
            bootstrap_report(&report),
            "Namespace epic-acme: already present\nAccount epic-acme/acme: created\n"
        );
    }

    #[test]
    fn test_gateway_assignment_line() {
        let assignment = GatewayAssignment {
            name: "blog".to_string(),
            address: "192.0.2.10".to_string(),
            dns_name: "blog.example.net".to_string(),
        };
        assert_eq!(
            gateway_assignment(&assignment),
            "gateway blog address 192.0.2.10 dns blog.example.net\n"
        );
    }

    #[test]
    fn test_user_namespace_table() {
        let rows = [
            UserNamespaceSummary {
                account: "acme".to_string(),
                namespace: "epic-acme".to_string(),
                created: Some(Time(Timestamp::from_second(0).unwrap())),
                proxies: 2,
            },
            UserNamespaceSummary {
                account: "fresh".to_string(),
                namespace: "epic-fresh".to_string(),
                created: None,
                proxies: 0,
            },
        ];
        let text = user_namespaces(&rows);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(cells(lines[0]), vec!["NAME", "CREATED", "GATEWAYS"]);
        assert_eq!(cells(lines[1]), vec!["acme", "1970-01-01T00:00:00+00:00", "2"]);
        assert_eq!(cells(lines[2]), vec!["fresh", "<none>", "0"]);
    }

    #[test]
    fn test_user_namespace_description() {
        let mut account = Account::new("acme", Default::default());
        account.metadata.namespace = Some("epic-acme".to_string());
        let description = UserNamespaceDescription {
            account,
            api_users: vec!["acme".to_string(), "alice".to_string()],
            proxies: vec![
                proxy("blog", Some(("192.0.2.10", "blog.example.net"))),
                proxy("shop", None),
            ],
        };
        let text = user_namespace_description(&description);

        assert!(text.starts_with("Account:   acme\nNamespace: epic-acme\n"));
        assert!(text.contains("API users: acme, alice\n"));
        assert!(text.lines().any(|l| cells(l) == vec!["blog", "192.0.2.10", "blog.example.net"]));
        assert!(text.lines().any(|l| cells(l) == vec!["shop", "<none>", "<none>"]));
    }

    #[test]
    fn test_user_namespace_description_empty() {
        let description = UserNamespaceDescription {
            account: Account::new("acme", Default::default()),
            api_users: Vec::new(),
            proxies: Vec::new(),
        };
        let text = user_namespace_description(&description);
        assert!(text.contains("Namespace: <none>\n"));
        assert!(text.contains("API users: <none>\n"));
        assert!(text.ends_with("Gateways:  <none>\n"));
    }

    #[test]
    fn test_api_users_one_per_line() {
        assert_eq!(
            api_users(&["alice".to_string(), "bob".to_string()]),
            "alice\nbob\n"
        );
        assert_eq!(api_users(&[]), "");
    }
}
