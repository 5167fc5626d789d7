//! Per-service configuration.

use serde::{Deserialize, Serialize};

/// Service-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Locked services are left out of every release
    #[serde(default)]
    pub locked: bool,
}
