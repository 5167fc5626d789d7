//! Kubernetes configuration for server-side apply.

use serde::{Deserialize, Serialize};

/// Kubernetes configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubernetesConfig {
    /// Field manager recorded on applied objects (default: "releaser")
    #[serde(default = "default_field_manager")]
    pub field_manager: String,

    /// Take ownership of fields managed by someone else (default: true)
    #[serde(default = "default_force_conflicts")]
    pub force_conflicts: bool,
}

fn default_field_manager() -> String {
    "releaser".to_string()
}

fn default_force_conflicts() -> bool {
    true
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            field_manager: default_field_manager(),
            force_conflicts: default_force_conflicts(),
        }
    }
}
