// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical name derivation.
//!
//! Humans refer to load balancers by `(service group, display name)` and to tenants
//! by account name. These functions turn those identifiers into the object names and
//! namespaces used in the resource store, so a resource can always be located again
//! without a name registry.
//!
//! Load balancer names and namespaces are pure functions of their inputs. Remote endpoint
//! names carry a random suffix, so they are never used as lookup keys; endpoints are found
//! through [`crate::index`] instead.

use crate::constants::{ENDPOINT_SUFFIX_LEN, MAX_OBJECT_NAME_LEN, NAME_SEPARATOR, PRODUCT_NAME};
use crate::errors::NameError;
use crate::ports::Protocol;
use std::net::IpAddr;

/// Characters used for the random endpoint suffix.
const SUFFIX_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

/// Namespace that holds every resource of an account (tenant).
///
/// The namespace is the product prefix joined to the account name, so distinct accounts
/// always map to distinct namespaces.
///
/// # Errors
///
/// Returns a [`NameError`] if the account name is empty or not a valid object name.
pub fn account_namespace(account: &str) -> Result<String, NameError> {
    validate_component("account", account)?;
    Ok(format!("{PRODUCT_NAME}{NAME_SEPARATOR}{account}"))
}

/// Strip the product prefix from a namespace, returning the account name.
///
/// Returns `None` when the namespace does not belong to an account.
#[must_use]
pub fn account_from_namespace(namespace: &str) -> Option<&str> {
    namespace
        .strip_prefix(PRODUCT_NAME)
        .and_then(|rest| rest.strip_prefix(NAME_SEPARATOR))
        .filter(|account| !account.is_empty())
}

/// Canonical name of a load balancer: `servicegroup-displayname`.
///
/// Service group names may not contain the separator, so the first separator in a
/// canonical name always marks the boundary and the pair can be recovered unambiguously.
///
/// # Errors
///
/// Returns a [`NameError`] if either component is invalid, the service group contains
/// the separator, or the result is too long.
///
/// # Example
///
/// ```rust
/// use epicctl::names::load_balancer_name;
///
/// assert_eq!(load_balancer_name("gatewayhttp", "web").unwrap(), "gatewayhttp-web");
/// ```
pub fn load_balancer_name(service_group: &str, display_name: &str) -> Result<String, NameError> {
    validate_service_group(service_group)?;
    validate_component("load balancer", display_name)?;

    let name = format!("{service_group}{NAME_SEPARATOR}{display_name}");
    if name.len() > MAX_OBJECT_NAME_LEN {
        return Err(NameError::TooLong {
            name,
            max: MAX_OBJECT_NAME_LEN,
        });
    }
    Ok(name)
}

/// Split a canonical load balancer name back into `(service group, display name)`.
#[must_use]
pub fn split_load_balancer_name(name: &str) -> Option<(&str, &str)> {
    name.split_once(NAME_SEPARATOR)
        .filter(|(group, display)| !group.is_empty() && !display.is_empty())
}

/// Deterministic part of a remote endpoint name: `address-port-protocol`, lower-cased,
/// with `.` and `:` replaced so IPv4 and IPv6 addresses both yield valid object names.
#[must_use]
pub fn remote_endpoint_base_name(address: &IpAddr, port: i32, protocol: Protocol) -> String {
    let address = address.to_string().replace(['.', ':'], "-");
    format!(
        "{address}{NAME_SEPARATOR}{port}{NAME_SEPARATOR}{}",
        protocol.as_str().to_ascii_lowercase()
    )
}

/// Remote endpoint name: the deterministic base plus a random suffix.
///
/// The same `(address, port, protocol)` may legitimately be registered more than once
/// (from different clusters or load balancers), so the suffix keeps the names apart.
#[must_use]
pub fn remote_endpoint_name(address: &IpAddr, port: i32, protocol: Protocol) -> String {
    format!(
        "{}{NAME_SEPARATOR}{}",
        remote_endpoint_base_name(address, port, protocol),
        random_suffix(ENDPOINT_SUFFIX_LEN)
    )
}

/// Random lower-case alphanumeric string of `len` characters.
#[must_use]
pub fn random_suffix(len: usize) -> String {
    (0..len)
        .map(|_| {
            let index = rand::random_range(0..SUFFIX_ALPHABET.len());
            char::from(SUFFIX_ALPHABET[index])
        })
        .collect()
}

/// Check that a service group name is a valid component and free of the separator.
///
/// # Errors
///
/// Returns a [`NameError`] describing the first rule the name breaks.
pub fn validate_service_group(service_group: &str) -> Result<(), NameError> {
    validate_component("service group", service_group)?;
    if service_group.contains(NAME_SEPARATOR) {
        return Err(NameError::ContainsSeparator {
            value: service_group.to_string(),
            separator: NAME_SEPARATOR,
        });
    }
    Ok(())
}

/// Check that a name component is a DNS-1123 label: lower-case alphanumerics and `-`,
/// starting and ending with an alphanumeric.
///
/// # Errors
///
/// Returns [`NameError::Empty`] or [`NameError::InvalidCharacters`].
pub fn validate_component(component: &'static str, value: &str) -> Result<(), NameError> {
    if value.is_empty() {
        return Err(NameError::Empty { component });
    }

    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let valid = value.chars().all(|c| allowed(c) || c == '-')
        && value.chars().next().is_some_and(allowed)
        && value.chars().last().is_some_and(allowed);

    if !valid {
        return Err(NameError::InvalidCharacters {
            component,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod names_tests;
