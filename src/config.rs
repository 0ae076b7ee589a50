// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Optional YAML config file.
//!
//! `~/.epicctl.yaml` (or the file named by `--config` / `EPICCTL_CONFIG`) supplies
//! defaults for settings that would otherwise be repeated on every command line:
//!
//! ```yaml
//! account: acme
//! service-group: gatewayhttp
//! cluster-name: edge-1
//! kubeconfig: /home/me/.kube/epic
//! poll-interval-secs: 1
//! poll-timeout-secs: 120
//! ```
//!
//! Precedence is flag, then environment (both handled by clap), then this file, then the
//! built-in default. A missing file is not an error.

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_CLUSTER_NAME, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_TIMEOUT_SECS,
};
use crate::errors::ConfigError;
use crate::retry::PollSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Contents of the config file. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_timeout_secs: Option<u64>,
}

/// `$HOME/.epicctl.yaml`, if `$HOME` is set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
}

impl FileConfig {
    /// Load `path`. A file that does not exist yields the empty config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file exists but cannot be read, [`ConfigError::Parse`]
    /// if it is not a valid config document.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), config = ?config, "Loaded config file");
        Ok(config)
    }

    /// Account from the flag/environment, else from the file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] if neither has one.
    pub fn account(&self, flag: Option<String>) -> Result<String, ConfigError> {
        flag.or_else(|| self.account.clone())
            .ok_or(ConfigError::Missing {
                name: "account",
                flag: "--account",
                env: "EPICCTL_ACCOUNT",
                key: "account",
            })
    }

    /// Service group from the flag/environment, else from the file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] if neither has one.
    pub fn service_group(&self, flag: Option<String>) -> Result<String, ConfigError> {
        self.optional_service_group(flag).ok_or(ConfigError::Missing {
            name: "service group",
            flag: "--service-group",
            env: "EPICCTL_SERVICE_GROUP",
            key: "service-group",
        })
    }

    /// Service group from the flag/environment or the file, if any.
    #[must_use]
    pub fn optional_service_group(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.service_group.clone())
    }

    /// Cluster name from the flag/environment, the file, or the built-in default.
    #[must_use]
    pub fn cluster_name(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.cluster_name.clone())
            .unwrap_or_else(|| DEFAULT_CLUSTER_NAME.to_string())
    }

    /// Kubeconfig path from the flag/environment or the file, if any.
    #[must_use]
    pub fn kubeconfig(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.kubeconfig.clone())
    }

    /// Poll bounds from the file, falling back to the built-in defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a zero interval or a timeout shorter than the interval.
    pub fn poll_settings(&self) -> Result<PollSettings, ConfigError> {
        let interval = self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        let timeout = self.poll_timeout_secs.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);

        if interval == 0 {
            return Err(ConfigError::Invalid {
                key: "poll-interval-secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if timeout < interval {
            return Err(ConfigError::Invalid {
                key: "poll-timeout-secs",
                reason: format!("{timeout} is shorter than the poll interval ({interval})"),
            });
        }

        Ok(PollSettings {
            interval: Duration::from_secs(interval),
            timeout: Duration::from_secs(timeout),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
