//! Release domain types
//!
//! An update is one planned change to one service. The release result (the
//! ledger) records a per-service outcome as the batch is applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::service_id::ServiceId;

/// One container image change within a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerUpdate {
    pub container: String,
    pub current: String,
    pub target: String,
}

impl ContainerUpdate {
    pub fn new(
        container: impl Into<String>,
        current: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            current: current.into(),
            target: target.into(),
        }
    }
}

/// One planned change to one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUpdate {
    pub service_id: ServiceId,
    /// New desired state for the service (Kubernetes YAML, possibly multi-document)
    pub manifest: String,
    /// Why the service is changing
    #[serde(default)]
    pub updates: Vec<ContainerUpdate>,
}

impl ServiceUpdate {
    pub fn new(service_id: ServiceId, manifest: impl Into<String>) -> Self {
        Self {
            service_id,
            manifest: manifest.into(),
            updates: Vec::new(),
        }
    }

    /// Builder: add a container change
    pub fn with_update(mut self, update: ContainerUpdate) -> Self {
        self.updates.push(update);
        self
    }
}

/// Final status of one service in one release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    Success,
    Failed,
    Unknown,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// Outcome for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResult {
    pub status: ReleaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_container: Vec<ContainerUpdate>,
}

/// Per-service outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultCounts {
    pub success: usize,
    pub failed: usize,
    pub unknown: usize,
}

/// The ledger: service ID to outcome, for one release application call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseResult(BTreeMap<ServiceId, ServiceResult>);

impl ReleaseResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ServiceId) -> Option<&ServiceResult> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: ServiceId, result: ServiceResult) {
        self.0.insert(id, result);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ServiceId, &ServiceResult)> {
        self.0.iter()
    }

    /// Provisionally mark a service successful.
    ///
    /// An existing error and container list are kept; when there is no prior
    /// container list, the update's own changes are recorded.
    pub fn mark_provisional_success(&mut self, update: &ServiceUpdate) {
        let previous = self.0.remove(&update.service_id);
        let (error, per_container) = match previous {
            Some(prev) if !prev.per_container.is_empty() => (prev.error, prev.per_container),
            Some(prev) => (prev.error, update.updates.clone()),
            None => (None, update.updates.clone()),
        };
        self.0.insert(
            update.service_id.clone(),
            ServiceResult {
                status: ReleaseStatus::Success,
                error,
                per_container,
            },
        );
    }

    /// Overwrite a service's status and error, keeping its container list
    pub fn mark(&mut self, id: &ServiceId, status: ReleaseStatus, error: impl Into<String>) {
        let per_container = self
            .0
            .remove(id)
            .map(|prev| prev.per_container)
            .unwrap_or_default();
        self.0.insert(
            id.clone(),
            ServiceResult {
                status,
                error: Some(error.into()),
                per_container,
            },
        );
    }

    pub fn counts(&self) -> ResultCounts {
        self.0
            .values()
            .fold(ResultCounts::default(), |mut counts, result| {
                match result.status {
                    ReleaseStatus::Success => counts.success += 1,
                    ReleaseStatus::Failed => counts.failed += 1,
                    ReleaseStatus::Unknown => counts.unknown += 1,
                }
                counts
            })
    }
}

/// Render container changes as a one-line summary
pub fn summarise_update(updates: &[ContainerUpdate]) -> String {
    if updates.is_empty() {
        return "(no image changes)".to_string();
    }
    updates
        .iter()
        .map(|c| format!("{} ({} -> {})", c.container, c.current, c.target))
        .collect::<Vec<_>>()
        .join(", ")
}
