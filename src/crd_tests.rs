// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for crd.rs

#[cfg(test)]
mod tests {
    use crate::constants::{API_GROUP, API_VERSION};
    use crate::crd::*;
    use crate::ports::{PortSpec, Protocol};
    use kube::Resource;

    fn load_balancer(upstreams: &[&str]) -> LoadBalancer {
        LoadBalancer::new(
            "gatewayhttp-web",
            LoadBalancerSpec {
                display_name: "web".to_string(),
                public_address: None,
                public_ports: vec![PortSpec::new(Protocol::Tcp, 80)],
                upstream_clusters: upstreams.iter().map(ToString::to_string).collect(),
                true_ingress: false,
            },
        )
    }

    fn proxy(endpoints: Vec<ProxyEndpoint>) -> GWProxy {
        GWProxy::new(
            "demo",
            GWProxySpec {
                display_name: "demo".to_string(),
                client_ref: ClientRef::default(),
                listeners: vec![],
                endpoints,
            },
        )
    }

    #[test]
    fn test_resource_kinds_and_group() {
        assert_eq!(LoadBalancer::kind(&()), "LoadBalancer");
        assert_eq!(RemoteEndpoint::kind(&()), "RemoteEndpoint");
        assert_eq!(LBServiceGroup::kind(&()), "LBServiceGroup");
        assert_eq!(GWProxy::kind(&()), "GWProxy");
        assert_eq!(GWRoute::kind(&()), "GWRoute");
        assert_eq!(GWEndpointSlice::kind(&()), "GWEndpointSlice");
        assert_eq!(Account::kind(&()), "Account");
        assert_eq!(LoadBalancer::api_version(&()), "epic.acnodal.io/v1");
        assert_eq!(Account::group(&()), API_GROUP);
        assert_eq!(GWProxy::version(&()), API_VERSION);
    }

    #[test]
    fn test_add_upstream_is_idempotent() {
        let mut lb = load_balancer(&["epicctl"]);

        assert!(lb.add_upstream("edge-1"));
        assert!(!lb.add_upstream("edge-1"));
        assert_eq!(lb.spec.upstream_clusters, vec!["epicctl", "edge-1"]);
    }

    #[test]
    fn test_remove_upstream_reports_absence() {
        let mut lb = load_balancer(&["epicctl", "edge-1"]);

        assert!(lb.remove_upstream("epicctl"));
        assert!(!lb.remove_upstream("epicctl"));
        assert_eq!(lb.spec.upstream_clusters, vec!["edge-1"]);
    }

    #[test]
    fn test_load_balancer_spec_wire_format() {
        let lb = load_balancer(&["epicctl"]);
        let json = serde_json::to_value(&lb.spec).unwrap();

        assert_eq!(json["displayName"], "web");
        assert_eq!(json["publicPorts"][0]["protocol"], "TCP");
        assert_eq!(json["upstreamClusters"][0], "epicctl");
        assert!(json.get("publicAddress").is_none());
    }

    #[test]
    fn test_load_balancer_spec_defaults_on_read() {
        let spec: LoadBalancerSpec =
            serde_json::from_value(serde_json::json!({"displayName": "web"})).unwrap();
        assert!(spec.public_ports.is_empty());
        assert!(spec.upstream_clusters.is_empty());
        assert!(!spec.true_ingress);
    }

    #[test]
    fn test_proxy_without_endpoints_has_no_assignment() {
        assert_eq!(proxy(vec![]).assignment(), None);
        assert_eq!(
            proxy(vec![ProxyEndpoint {
                dns_name: "demo.adhoc.example.net".to_string(),
                targets: vec![],
            }])
            .assignment(),
            None
        );
    }

    #[test]
    fn test_proxy_assignment_uses_first_target() {
        let p = proxy(vec![ProxyEndpoint {
            dns_name: "demo.adhoc.example.net".to_string(),
            targets: vec!["192.0.2.10".to_string(), "192.0.2.11".to_string()],
        }]);
        assert_eq!(
            p.assignment(),
            Some((
                "192.0.2.10".to_string(),
                "demo.adhoc.example.net".to_string()
            ))
        );
    }

    #[test]
    fn test_client_ref_omits_empty_fields() {
        let json = serde_json::to_value(ClientRef {
            namespace: "adhoc".to_string(),
            uid: String::new(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"namespace": "adhoc"}));
    }

    #[test]
    fn test_route_spec_wire_format() {
        let spec = GWRouteSpec {
            http: Some(HttpRouteSpec {
                parent_refs: vec![ParentReference {
                    name: "demo".to_string(),
                }],
                rules: vec![RouteRule {
                    backend_refs: vec![BackendRef {
                        name: "linux-nodes".to_string(),
                        port: Some(8080),
                    }],
                }],
            }),
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["http"]["parentRefs"][0]["name"], "demo");
        assert_eq!(json["http"]["rules"][0]["backendRefs"][0]["port"], 8080);
    }
}
