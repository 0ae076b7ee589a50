// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! PureLB `ServiceGroup` manifest.
//!
//! PureLB links a client cluster to EPIC through a `ServiceGroup` custom resource that
//! names the EPIC web service, its credentials, the user namespace and the
//! `LBServiceGroup` to allocate from. This module renders that document; it is applied
//! to the client cluster by the operator, never written to the EPIC store.

use crate::errors::Result;
use crate::names::{validate_component, validate_service_group};
use serde::Serialize;

const PURELB_API_VERSION: &str = "purelb.io/v1";
const PURELB_KIND: &str = "ServiceGroup";
const PURELB_NAMESPACE: &str = "purelb";

/// Inputs of a PureLB `ServiceGroup` manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceGroupManifest {
    /// EPIC `LBServiceGroup` the PureLB group allocates from
    pub lb_service_group: String,
    /// Host name of the EPIC web service
    pub host: String,
    /// EPIC user namespace (account) name
    pub user_namespace: String,
    /// Name of the new PureLB `ServiceGroup`
    pub group: String,
    pub web_service_user: String,
    pub web_service_password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata<'a>,
    spec: Spec<'a>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    name: &'a str,
    namespace: &'static str,
}

#[derive(Serialize)]
struct Spec<'a> {
    epic: EpicLink<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct EpicLink<'a> {
    api_service_hostname: &'a str,
    api_service_username: &'a str,
    api_service_password: &'a str,
    user_namespace: &'a str,
    lbservicegroup: &'a str,
}

impl ServiceGroupManifest {
    /// Render the manifest as a YAML document starting with `---`.
    ///
    /// # Errors
    ///
    /// [`crate::errors::EpicError::Name`] for invalid names, or a render failure.
    pub fn render(&self) -> Result<String> {
        validate_service_group(&self.lb_service_group)?;
        validate_component("user namespace", &self.user_namespace)?;
        validate_component("service group manifest", &self.group)?;

        let document = Document {
            api_version: PURELB_API_VERSION,
            kind: PURELB_KIND,
            metadata: Metadata {
                name: &self.group,
                namespace: PURELB_NAMESPACE,
            },
            spec: Spec {
                epic: EpicLink {
                    api_service_hostname: &self.host,
                    api_service_username: &self.web_service_user,
                    api_service_password: &self.web_service_password,
                    user_namespace: &self.user_namespace,
                    lbservicegroup: &self.lb_service_group,
                },
            },
        };

        Ok(format!("---\n{}", serde_yaml::to_string(&document)?))
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod manifest_tests;
