// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Text rendering of command results.
//!
//! Every function returns a `String` so the binary decides where it goes and tests can
//! assert on it. Lists are rendered as borderless `comfy-table` tables.

use crate::crd::{LoadBalancer, RemoteEndpoint};
use crate::lifecycle::{
    BootstrapReport, GatewayAssignment, LoadBalancerDeletion, LoadBalancerDescription,
    StepOutcome, UserNamespaceDescription, UserNamespaceSummary,
};
use crate::ports::format_ports;
use comfy_table::{presets, Row, Table};
use kube::ResourceExt;
use std::fmt::Write;

const NONE: &str = "<none>";

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_header(header.iter().copied());
    table
}

/// Render a table followed by a newline.
fn finish(table: &Table) -> String {
    format!("{table}\n")
}

fn or_none(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NONE)
}

/// `get load-balancers`: one row per load balancer.
#[must_use]
pub fn load_balancers(load_balancers: &[LoadBalancer]) -> String {
    let mut table = table(&["NAME", "ADDRESS", "PORTS", "UPSTREAMS"]);
    for lb in load_balancers {
        table.add_row(Row::from([
            lb.spec.display_name.clone(),
            or_none(lb.spec.public_address.as_deref()).to_string(),
            format_ports(&lb.spec.public_ports),
            lb.spec.upstream_clusters.join(","),
        ]));
    }
    finish(&table)
}

/// `get remote-endpoints`: one row per endpoint.
#[must_use]
pub fn remote_endpoints(endpoints: &[RemoteEndpoint]) -> String {
    let mut table = table(&["ADDRESS", "PORT", "PROTOCOL", "CLUSTER"]);
    for ep in endpoints {
        table.add_row(Row::from([
            ep.spec.address.clone(),
            ep.spec.port.port.to_string(),
            ep.spec.port.protocol.to_string(),
            ep.spec.cluster.clone(),
        ]));
    }
    finish(&table)
}

/// `describe load-balancer`.
#[must_use]
pub fn load_balancer_description(description: &LoadBalancerDescription) -> String {
    let lb = &description.load_balancer;
    let mut out = String::new();
    let _ = writeln!(out, "Name:      {}", lb.spec.display_name);
    let _ = writeln!(out, "Object:    {}", lb.name_any());
    let _ = writeln!(
        out,
        "Address:   {}",
        or_none(lb.spec.public_address.as_deref())
    );
    let _ = writeln!(out, "Ports:     {}", format_ports(&lb.spec.public_ports));
    let upstreams = if lb.spec.upstream_clusters.is_empty() {
        NONE.to_string()
    } else {
        lb.spec.upstream_clusters.join(", ")
    };
    let _ = writeln!(out, "Upstreams: {upstreams}");
    if description.endpoints.is_empty() {
        let _ = writeln!(out, "Endpoints: {NONE}");
    } else {
        let _ = writeln!(out, "Endpoints:");
        out.push_str(&remote_endpoints(&description.endpoints));
    }
    out
}

/// Result line of `delete load-balancer`.
#[must_use]
pub fn load_balancer_deletion(display_name: &str, outcome: &LoadBalancerDeletion) -> String {
    match outcome {
        LoadBalancerDeletion::Deleted => format!("load balancer {display_name} deleted"),
        LoadBalancerDeletion::Retained { remaining } => format!(
            "load balancer {display_name} detached, still used by {}",
            remaining.join(", ")
        ),
    }
}

/// Result of `create user-namespace`: one line per step.
#[must_use]
pub fn bootstrap_report(report: &BootstrapReport) -> String {
    let mut out = String::new();
    for (step, outcome) in &report.steps {
        let verb = match outcome {
            StepOutcome::Created => "created",
            StepOutcome::Adopted => "already present",
        };
        let _ = writeln!(out, "{step}: {verb}");
    }
    out
}

/// Result of `create ad-hoc-gateway`.
#[must_use]
pub fn gateway_assignment(assignment: &GatewayAssignment) -> String {
    format!(
        "gateway {} address {} dns {}\n",
        assignment.name, assignment.address, assignment.dns_name
    )
}

/// `get user-namespaces`, in the order given.
#[must_use]
pub fn user_namespaces(summaries: &[UserNamespaceSummary]) -> String {
    let mut table = table(&["NAME", "CREATED", "GATEWAYS"]);
    for summary in summaries {
        let created = summary
            .created
            .as_ref()
            .map(|t| t.0.display_with_offset(k8s_openapi::jiff::tz::Offset::UTC).to_string())
            .unwrap_or_else(|| NONE.to_string());
        table.add_row(Row::from([
            summary.account.clone(),
            created,
            summary.proxies.to_string(),
        ]));
    }
    finish(&table)
}

/// `describe user-namespace`.
#[must_use]
pub fn user_namespace_description(description: &UserNamespaceDescription) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Account:   {}", description.account.name_any());
    let _ = writeln!(
        out,
        "Namespace: {}",
        or_none(description.account.namespace().as_deref())
    );
    let users = if description.api_users.is_empty() {
        NONE.to_string()
    } else {
        description.api_users.join(", ")
    };
    let _ = writeln!(out, "API users: {users}");

    if description.proxies.is_empty() {
        let _ = writeln!(out, "Gateways:  {NONE}");
        return out;
    }

    let _ = writeln!(out, "Gateways:");
    let mut table = table(&["NAME", "ADDRESS", "DNS"]);
    for proxy in &description.proxies {
        let (address, dns) = proxy
            .assignment()
            .unwrap_or_else(|| (NONE.to_string(), NONE.to_string()));
        table.add_row(Row::from([proxy.spec.display_name.clone(), address, dns]));
    }
    out.push_str(&finish(&table));
    out
}

/// `get api-users`: one name per line.
#[must_use]
pub fn api_users(users: &[String]) -> String {
    users.iter().map(|u| format!("{u}\n")).collect()
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod output_tests;
