//! # Releaser Configuration
//!
//! Loaded from a single YAML file (`releaser.yaml` by default). Every field
//! is optional; a missing file yields the defaults.
//!
//! ## Example
//!
//! ```yaml
//! self_services:
//!   service: fluxsvc
//!   daemon: fluxd
//! services:
//!   default/payments:
//!     locked: true
//! kubernetes:
//!   field_manager: releaser
//!   force_conflicts: true
//! event_log:
//!   format: json
//! ```

mod kubernetes;
mod service;

pub use kubernetes::KubernetesConfig;
pub use service::ServiceConfig;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::partition::{FLUX_DAEMON_NAME, FLUX_SERVICE_NAME};
use crate::domain::{SelfServiceNames, ServiceId, ServiceIdSet};
use crate::error::ConfigError;

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "releaser.yaml";

/// Names of the releaser's own services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfServicesConfig {
    #[serde(default = "default_self_service")]
    pub service: String,

    #[serde(default = "default_self_daemon")]
    pub daemon: String,
}

fn default_self_service() -> String {
    FLUX_SERVICE_NAME.to_string()
}

fn default_self_daemon() -> String {
    FLUX_DAEMON_NAME.to_string()
}

impl Default for SelfServicesConfig {
    fn default() -> Self {
        Self {
            service: default_self_service(),
            daemon: default_self_daemon(),
        }
    }
}

/// Where release progress messages go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLogFormat {
    /// Structured tracing output
    #[default]
    Tracing,
    /// `RELEASE_EVENT:`-prefixed JSON lines on stdout
    Json,
}

/// Event log configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLogConfig {
    #[serde(default)]
    pub format: EventLogFormat,
}

/// Complete releaser configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaserConfig {
    /// Services applied without waiting for a reply
    #[serde(default)]
    pub self_services: SelfServicesConfig,

    /// Per-service settings, keyed by `namespace/name`
    #[serde(default)]
    pub services: BTreeMap<ServiceId, ServiceConfig>,

    #[serde(default)]
    pub kubernetes: KubernetesConfig,

    #[serde(default)]
    pub event_log: EventLogConfig,
}

impl ReleaserConfig {
    /// Load configuration from `path`, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_required(path)
    }

    /// Load configuration from `path`, failing when it does not exist
    pub fn load_required(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn self_service_names(&self) -> SelfServiceNames {
        SelfServiceNames::new(&self.self_services.service, &self.self_services.daemon)
    }
}

/// Services whose config marks them as locked
pub fn locked_services(config: &ReleaserConfig) -> ServiceIdSet {
    config
        .services
        .iter()
        .filter(|(_, service)| service.locked)
        .map(|(id, _)| id.clone())
        .collect()
}
