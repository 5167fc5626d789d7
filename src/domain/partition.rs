//! Splits a batch of updates into ordinary and self updates.
//!
//! Self updates target the releaser's own services. They are applied last and
//! without waiting for a reply, since the process applying them may be
//! restarted by the change.

use super::release::ServiceUpdate;

/// Name of the releaser's own service
pub const FLUX_SERVICE_NAME: &str = "fluxsvc";
/// Name of the releaser's background daemon
pub const FLUX_DAEMON_NAME: &str = "fluxd";

/// The two service names that make up the self partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfServiceNames {
    service: String,
    daemon: String,
}

impl SelfServiceNames {
    pub fn new(service: impl Into<String>, daemon: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            daemon: daemon.into(),
        }
    }

    pub fn matches(&self, service_name: &str) -> bool {
        service_name == self.service || service_name == self.daemon
    }
}

impl Default for SelfServiceNames {
    fn default() -> Self {
        Self::new(FLUX_SERVICE_NAME, FLUX_DAEMON_NAME)
    }
}

/// A batch split by whether a reply is expected
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub ordinary: Vec<&'a ServiceUpdate>,
    pub self_updates: Vec<&'a ServiceUpdate>,
}

impl<'a> Partition<'a> {
    pub fn len(&self) -> usize {
        self.ordinary.len() + self.self_updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition updates, keeping input order within each side
pub fn partition<'a>(updates: &'a [ServiceUpdate], names: &SelfServiceNames) -> Partition<'a> {
    let (self_updates, ordinary): (Vec<_>, Vec<_>) = updates
        .iter()
        .partition(|update| names.matches(update.service_id.name()));
    Partition {
        ordinary,
        self_updates,
    }
}
