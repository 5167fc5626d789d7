//! Platform abstraction: the thing release definitions are applied to.

use async_trait::async_trait;
use tracing::info;

use crate::domain::{ServiceId, ServiceUpdate};
use crate::error::ApplyError;

/// A new definition for one service, ready to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub service_id: ServiceId,
    pub new_definition: String,
    /// Apply without waiting for the result
    pub is_async: bool,
}

impl ServiceDefinition {
    pub fn from_update(update: &ServiceUpdate, is_async: bool) -> Self {
        Self {
            service_id: update.service_id.clone(),
            new_definition: update.manifest.clone(),
            is_async,
        }
    }
}

/// Applies batches of service definitions.
///
/// Returns `Ok(())` when everything applied, `ApplyError::PerService` when
/// individual services failed, and `ApplyError::Coverall` when the batch as
/// a whole could not be applied.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn apply(&self, defs: Vec<ServiceDefinition>) -> Result<(), ApplyError>;
}

/// Platform that only logs what would be applied
#[derive(Debug, Default)]
pub struct DryRunPlatform;

#[async_trait]
impl Platform for DryRunPlatform {
    async fn apply(&self, defs: Vec<ServiceDefinition>) -> Result<(), ApplyError> {
        for def in &defs {
            info!(
                service_id = %def.service_id,
                is_async = def.is_async,
                bytes = def.new_definition.len(),
                "[dry-run] Would apply definition"
            );
        }
        Ok(())
    }
}
