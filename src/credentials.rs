// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential secrets of a user namespace.
//!
//! Each user namespace holds two secrets:
//!
//! - `gitlab`: a docker-registry pull secret for `registry.gitlab.com`
//! - `password`: the web-service basic-auth secret read by Contour. Its `auth` key holds
//!   an htpasswd-style table, one `username:bcrypt-hash` record per line.
//!
//! [`CredentialSet`] is the parsed form of that table. Records are kept in store order and
//! written back newline-terminated.

use crate::constants::{
    REGISTRY_HOSTNAME, REGISTRY_SECRET_NAME, WEB_SERVICE_AUTH_KEY, WEB_SERVICE_REALM,
    WEB_SERVICE_SECRET_NAME,
};
use crate::errors::{EpicError, Result};
use crate::labels::{AUTH_TYPE_BASIC, CONTOUR_AUTH_REALM_ANNOTATION, CONTOUR_AUTH_TYPE_ANNOTATION};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use tracing::warn;

/// Secret type of docker-registry pull secrets
const DOCKER_CONFIG_JSON_TYPE: &str = "kubernetes.io/dockerconfigjson";

/// Data key of docker-registry pull secrets
const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";

/// The `user:hash` table of a web-service secret.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialSet {
    lines: Vec<String>,
}

impl CredentialSet {
    /// Parse the raw `auth` value, one record per `\n`-terminated line.
    ///
    /// Only the `\n` terminator is stripped, so surrounding whitespace, `\r` and blank
    /// lines survive a rewrite byte for byte. Lines without a `:` are not credential
    /// records. They are kept for the same reason but never count as users.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let lines: Vec<String> = text.split_terminator('\n').map(str::to_string).collect();

        for line in lines
            .iter()
            .filter(|line| !line.trim().is_empty() && username_of(line).is_none())
        {
            warn!(line_len = line.len(), "Ignoring malformed credential record");
        }

        Self { lines }
    }

    /// Credential set read from a web-service secret. A missing `auth` key is an empty set.
    #[must_use]
    pub fn from_secret(secret: &Secret) -> Self {
        secret
            .data
            .as_ref()
            .and_then(|data| data.get(WEB_SERVICE_AUTH_KEY))
            .map(|value| Self::parse(&value.0))
            .unwrap_or_default()
    }

    /// Usernames, in store order.
    #[must_use]
    pub fn usernames(&self) -> Vec<&str> {
        self.lines.iter().filter_map(|line| username_of(line)).collect()
    }

    /// Exact, case-sensitive username match.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.usernames().contains(&username)
    }

    /// Hash `password` and append a record for `username`.
    ///
    /// # Errors
    ///
    /// [`EpicError::DuplicateUser`] if the username is already present (the set is left
    /// unchanged), [`EpicError::InvalidArgument`] for a username that cannot appear in
    /// a record, [`EpicError::PasswordHash`] if hashing fails.
    pub fn add(&mut self, account: &str, username: &str, password: &str, cost: u32) -> Result<()> {
        if username.is_empty() || username.contains(':') || username.contains(char::is_whitespace) {
            return Err(EpicError::InvalidArgument {
                what: "api-user name",
                value: username.to_string(),
                reason: "must be non-empty and contain no ':' or whitespace".to_string(),
            });
        }
        if self.contains(username) {
            return Err(EpicError::DuplicateUser {
                username: username.to_string(),
                account: account.to_string(),
            });
        }

        let hash = bcrypt::hash(password, cost)?;
        self.lines.push(format!("{username}:{hash}"));
        Ok(())
    }

    /// Remove every record for `username`, keeping the others in order.
    ///
    /// Returns `false` when nothing matched.
    pub fn remove(&mut self, username: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| username_of(line) != Some(username));
        self.lines.len() != before
    }

    /// Check a password against the stored hash for `username`.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.lines
            .iter()
            .filter_map(|line| line.split_once(':'))
            .find(|(user, _)| *user == username)
            .is_some_and(|(_, hash)| {
                bcrypt::verify(password, hash.trim_end_matches('\r')).unwrap_or(false)
            })
    }

    /// Serialized form: every record newline-terminated.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.lines
            .iter()
            .flat_map(|line| line.bytes().chain(std::iter::once(b'\n')))
            .collect()
    }

    /// Store this set in a web-service secret, replacing its `auth` value.
    pub fn write_to(&self, secret: &mut Secret) {
        secret
            .data
            .get_or_insert_with(BTreeMap::new)
            .insert(WEB_SERVICE_AUTH_KEY.to_string(), ByteString(self.to_bytes()));
    }
}

fn username_of(line: &str) -> Option<&str> {
    line.split_once(':').map(|(user, _)| user)
}

/// Docker-registry pull secret for the user namespace.
#[must_use]
pub fn registry_secret(namespace: &str, username: &str, password: &str) -> Secret {
    let auth = BASE64.encode(format!("{username}:{password}"));
    let config = serde_json::json!({
        "auths": {
            REGISTRY_HOSTNAME: {
                "username": username,
                "password": password,
                "auth": auth,
            }
        }
    });

    Secret {
        metadata: ObjectMeta {
            name: Some(REGISTRY_SECRET_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        type_: Some(DOCKER_CONFIG_JSON_TYPE.to_string()),
        data: Some(BTreeMap::from([(
            DOCKER_CONFIG_JSON_KEY.to_string(),
            ByteString(config.to_string().into_bytes()),
        )])),
        ..Default::default()
    }
}

/// Web-service basic-auth secret holding `credentials`, annotated for Contour.
#[must_use]
pub fn web_service_secret(namespace: &str, credentials: &CredentialSet) -> Secret {
    let mut secret = Secret {
        metadata: ObjectMeta {
            name: Some(WEB_SERVICE_SECRET_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: Some(BTreeMap::from([
                (
                    CONTOUR_AUTH_TYPE_ANNOTATION.to_string(),
                    AUTH_TYPE_BASIC.to_string(),
                ),
                (
                    CONTOUR_AUTH_REALM_ANNOTATION.to_string(),
                    WEB_SERVICE_REALM.to_string(),
                ),
            ])),
            ..Default::default()
        },
        ..Default::default()
    };
    credentials.write_to(&mut secret);
    secret
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod credentials_tests;
