// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Port-spec parsing.
//!
//! Load balancers and remote endpoints take their ports as a compact list such as
//! `UDP/8888,TCP/9999,7777`. Each comma-separated token is either `PORT` or
//! `PROTOCOL/PORT`; a bare port defaults to TCP.
//!
//! # Example
//!
//! ```rust
//! use epicctl::ports::{parse_ports, PortSpec, Protocol};
//!
//! let ports = parse_ports("UDP/8888,TCP/9999,7777").unwrap();
//! assert_eq!(ports[0], PortSpec::new(Protocol::Udp, 8888));
//! assert_eq!(ports[2], PortSpec::new(Protocol::Tcp, 7777));
//! ```

use crate::errors::PortParseError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transport protocol of a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Protocol {
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
}

impl Protocol {
    /// Upper-case wire token (`TCP` or `UDP`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = PortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("TCP") {
            Ok(Protocol::Tcp)
        } else if s.eq_ignore_ascii_case("UDP") {
            Ok(Protocol::Udp)
        } else {
            Err(PortParseError::UnknownProtocol {
                token: s.to_string(),
            })
        }
    }
}

/// One protocol/port pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortSpec {
    pub protocol: Protocol,
    pub port: i32,
}

impl PortSpec {
    #[must_use]
    pub fn new(protocol: Protocol, port: i32) -> Self {
        Self { protocol, port }
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.protocol, self.port)
    }
}

impl FromStr for PortSpec {
    type Err = PortParseError;

    /// Parse a single `PORT` or `PROTOCOL/PORT` token.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        if token.is_empty() {
            return Err(PortParseError::EmptyToken);
        }

        let mut parts = token.split('/');
        let (protocol, number) = match (parts.next(), parts.next(), parts.next()) {
            (Some(number), None, None) => (Protocol::Tcp, number),
            (Some(protocol), Some(number), None) => (protocol.parse()?, number),
            _ => {
                return Err(PortParseError::MalformedToken {
                    token: token.to_string(),
                })
            }
        };

        Ok(PortSpec::new(protocol, parse_port_number(number)?))
    }
}

/// Parse a bare port number: a non-negative integer that fits in 32 signed bits.
///
/// # Errors
///
/// Returns [`PortParseError::InvalidPort`] when the token is not an integer in range and
/// [`PortParseError::NegativePort`] when it is below zero.
pub fn parse_port_number(token: &str) -> Result<i32, PortParseError> {
    let port: i32 = token.parse().map_err(|source| PortParseError::InvalidPort {
        token: token.to_string(),
        source,
    })?;
    if port < 0 {
        return Err(PortParseError::NegativePort { port });
    }
    Ok(port)
}

/// Parse a comma-separated port list, preserving input order.
///
/// The whole list fails on the first bad token; no partial list is returned.
///
/// # Errors
///
/// Returns [`PortParseError::Empty`] for an empty list, otherwise the error of the
/// first token that does not parse.
pub fn parse_ports(spec: &str) -> Result<Vec<PortSpec>, PortParseError> {
    if spec.trim().is_empty() {
        return Err(PortParseError::Empty);
    }
    spec.split(',').map(str::parse).collect()
}

/// Parse a port list that must hold exactly one entry (remote endpoint ports).
///
/// # Errors
///
/// Returns the parse error of the list, or [`PortParseError::ExpectedSinglePort`] when
/// the list holds more than one entry.
pub fn parse_single_port(spec: &str) -> Result<PortSpec, PortParseError> {
    let mut ports = parse_ports(spec)?;
    if ports.len() != 1 {
        return Err(PortParseError::ExpectedSinglePort {
            count: ports.len(),
        });
    }
    Ok(ports.remove(0))
}

/// Render a port list back into its textual form.
#[must_use]
pub fn format_ports(ports: &[PortSpec]) -> String {
    ports
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod ports_tests;
