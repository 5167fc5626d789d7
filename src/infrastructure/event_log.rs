//! Event log: the per-service progress stream users read.
//!
//! Logging is fire-and-forget. Implementations must not fail the release.

use tracing::info;
use uuid::Uuid;

use crate::observability::{emit_event, ServiceEvent};

/// Append-only sink for per-service release messages
pub trait EventLog: Send + Sync {
    fn log_event(&self, namespace: &str, service: &str, message: &str);
}

/// Writes events through tracing
#[derive(Debug, Default)]
pub struct TracingEventLog;

impl EventLog for TracingEventLog {
    fn log_event(&self, namespace: &str, service: &str, message: &str) {
        info!(namespace = %namespace, service = %service, "{}", message);
    }
}

/// Writes `RELEASE_EVENT:` JSON lines to stdout
#[derive(Debug)]
pub struct JsonEventLog {
    release_id: Uuid,
}

impl JsonEventLog {
    pub fn new() -> Self {
        Self {
            release_id: Uuid::new_v4(),
        }
    }

    pub fn release_id(&self) -> Uuid {
        self.release_id
    }
}

impl Default for JsonEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog for JsonEventLog {
    fn log_event(&self, namespace: &str, service: &str, message: &str) {
        emit_event(&ServiceEvent::new(
            self.release_id,
            namespace,
            service,
            message,
        ));
    }
}
