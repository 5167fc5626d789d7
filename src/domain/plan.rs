//! Release plan input: the precomputed, ordered list of service updates.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::release::{ReleaseResult, ServiceUpdate};
use super::service_id::ServiceIdSet;
use crate::error::PlanError;

/// A finalized batch of updates, as produced by the planning stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleasePlan {
    #[serde(default)]
    pub updates: Vec<ServiceUpdate>,

    /// Outcomes already recorded by the planning stage
    #[serde(default)]
    pub results: ReleaseResult,
}

impl ReleasePlan {
    /// Load a plan from a YAML (or JSON) file
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path).map_err(|_| PlanError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, PlanError> {
        let plan: Self = serde_yaml::from_str(content).map_err(|e| PlanError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut seen = HashSet::new();
        for update in &plan.updates {
            if !seen.insert(&update.service_id) {
                return Err(PlanError::DuplicateService {
                    service_id: update.service_id.to_string(),
                });
            }
        }

        Ok(plan)
    }

    /// Drop updates for the given services, returning what was removed
    pub fn exclude(&mut self, ids: &ServiceIdSet) -> Vec<ServiceUpdate> {
        let (excluded, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.updates)
            .into_iter()
            .partition(|update| ids.contains(&update.service_id));
        self.updates = kept;
        excluded
    }
}
