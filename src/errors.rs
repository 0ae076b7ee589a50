// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for epicctl.
//!
//! This module provides specialized error types for:
//! - Port-spec parsing ([`PortParseError`])
//! - Canonical name derivation ([`NameError`])
//! - Resource store calls ([`StoreError`])
//! - Multi-step lifecycle operations ([`EpicError`])
//!
//! Every layer returns its own error to its caller. Only the binary prints them.

use std::num::ParseIntError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while parsing a port-spec string such as `TCP/80,UDP/53`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortParseError {
    /// The port list contained no tokens at all.
    #[error("port list is empty")]
    Empty,

    /// A token between two commas was empty (e.g. `80,,443`).
    #[error("port list contains an empty entry")]
    EmptyToken,

    /// A token had more than one `/`.
    #[error("can't parse '{token}' as PROTOCOL/PORT")]
    MalformedToken {
        /// The offending token
        token: String,
    },

    /// The protocol part was neither TCP nor UDP.
    #[error("unsupported protocol '{token}' (expected TCP or UDP)")]
    UnknownProtocol {
        /// The offending protocol token
        token: String,
    },

    /// The port part was not an integer that fits in 32 bits.
    #[error("can't parse '{token}' as a port value: {source}")]
    InvalidPort {
        /// The offending port token
        token: String,
        /// Underlying integer parse failure
        #[source]
        source: ParseIntError,
    },

    /// The port was negative.
    #[error("port {port} is negative")]
    NegativePort {
        /// The negative port
        port: i32,
    },

    /// A single port was expected but the list had a different length.
    #[error("expected exactly one port, got {count}")]
    ExpectedSinglePort {
        /// Number of ports in the list
        count: usize,
    },
}

/// Errors raised while deriving canonical names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// A name component was empty.
    #[error("{component} name must not be empty")]
    Empty {
        /// Which component was empty (e.g. "service group")
        component: &'static str,
    },

    /// A name component contained characters not allowed in object names.
    #[error(
        "{component} name '{value}' may only contain lower-case letters, digits and '-', \
         and must start and end with a letter or digit"
    )]
    InvalidCharacters {
        /// Which component was invalid
        component: &'static str,
        /// The offending value
        value: String,
    },

    /// A service group name contained the canonical-name separator.
    #[error("service group name '{value}' must not contain '{separator}'")]
    ContainsSeparator {
        /// The offending value
        value: String,
        /// The reserved separator
        separator: char,
    },

    /// The derived name would exceed the object name limit.
    #[error("derived name '{name}' is longer than {max} characters")]
    TooLong {
        /// The derived name
        name: String,
        /// The limit
        max: usize,
    },
}

/// Errors returned by a [`crate::store::ResourceStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The object does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Resource kind
        kind: String,
        /// Object name (namespace-qualified when namespaced)
        name: String,
    },

    /// An object with the same name already exists.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// Resource kind
        kind: String,
        /// Object name (namespace-qualified when namespaced)
        name: String,
    },

    /// The object changed since it was read.
    #[error("{kind} '{name}' was modified concurrently")]
    Conflict {
        /// Resource kind
        kind: String,
        /// Object name (namespace-qualified when namespaced)
        name: String,
    },

    /// Any other backend failure (transport, serialization, authorization).
    #[error("resource store error on {kind}: {message}")]
    Backend {
        /// Resource kind
        kind: String,
        /// Backend message
        message: String,
    },
}

/// Errors raised while loading the config file or resolving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Config file path
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML or has unexpected keys.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Config file path
        path: String,
        /// Underlying YAML failure
        #[source]
        source: serde_yaml::Error,
    },

    /// A required setting was given neither as a flag, in the environment, nor in the file.
    #[error("{name} is required: pass {flag}, set {env}, or add '{key}' to the config file")]
    Missing {
        /// Human name of the setting
        name: &'static str,
        /// Command-line flag
        flag: &'static str,
        /// Environment variable
        env: &'static str,
        /// Config file key
        key: &'static str,
    },

    /// A setting had an unusable value.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Config file key
        key: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Errors surfaced by lifecycle operations.
#[derive(Error, Debug)]
pub enum EpicError {
    /// A port-spec argument could not be parsed.
    #[error(transparent)]
    PortParse(#[from] PortParseError),

    /// A name argument could not be turned into a canonical name.
    #[error(transparent)]
    Name(#[from] NameError),

    /// Any other malformed argument (IP address, password policy).
    #[error("invalid {what} '{value}': {reason}")]
    InvalidArgument {
        /// What the argument is
        what: &'static str,
        /// The value given
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A referenced resource does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Resource kind
        kind: String,
        /// Object name or lookup key
        name: String,
    },

    /// A resource with the same canonical name already exists.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// Resource kind
        kind: String,
        /// Object name
        name: String,
    },

    /// A read-modify-write kept losing to concurrent writers.
    #[error("{kind} '{name}' kept changing concurrently; gave up after {attempts} attempts")]
    Conflict {
        /// Resource kind
        kind: String,
        /// Object name
        name: String,
        /// Number of attempts made
        attempts: u32,
    },

    /// An asynchronous assignment did not complete in time.
    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// How long we waited
        waited: Duration,
    },

    /// A multi-step sequence stopped part way. Completed steps are not rolled back.
    #[error("{failed_step} failed after completing [{}]: {source}", .completed.join(", "))]
    PartialFailure {
        /// Steps that finished before the failure
        completed: Vec<String>,
        /// The step that failed
        failed_step: String,
        /// Why it failed
        #[source]
        source: Box<EpicError>,
    },

    /// The API user already exists in the credential set.
    #[error("api-user {username} exists in user namespace {account}")]
    DuplicateUser {
        /// The duplicate username
        username: String,
        /// The account (user namespace) name
        account: String,
    },

    /// A resource that should carry an ownership label does not.
    #[error("{kind} '{name}' has no '{label}' label")]
    MissingOwnerLabel {
        /// Resource kind
        kind: String,
        /// Object name
        name: String,
        /// Missing label key
        label: &'static str,
    },

    /// Hashing a password failed.
    #[error("failed to hash password: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// A YAML manifest could not be rendered.
    #[error("failed to render manifest: {0}")]
    Render(#[from] serde_yaml::Error),

    /// Any other store failure.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EpicError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, name } => EpicError::NotFound { kind, name },
            StoreError::AlreadyExists { kind, name } => EpicError::AlreadyExists { kind, name },
            StoreError::Conflict { kind, name } => EpicError::Conflict {
                kind,
                name,
                attempts: 1,
            },
            other @ StoreError::Backend { .. } => EpicError::Store(other),
        }
    }
}

impl EpicError {
    /// True for a `NotFound` failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, EpicError::NotFound { .. })
    }

    /// True for an `AlreadyExists` failure.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, EpicError::AlreadyExists { .. })
    }

    /// True for a `Conflict` failure.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, EpicError::Conflict { .. })
    }
}

/// Result alias for lifecycle operations.
pub type Result<T, E = EpicError> = std::result::Result<T, E>;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
