//! # Release Observability Module
//!
//! Structured release events for log shippers.
//!
//! ## Event Flow
//!
//! ```text
//! releaser → JSON stdout → Vector → Loki → Grafana
//! ```
//!
//! Events are JSON objects printed on a single line, prefixed with
//! `RELEASE_EVENT:` so a collector can pick them out of ordinary output.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event prefix for Vector to identify structured events
pub const EVENT_PREFIX: &str = "RELEASE_EVENT:";

/// Progress or result message for one service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEvent {
    /// Timestamp in RFC3339 format
    pub timestamp: String,
    /// Release this event belongs to
    pub release_id: Uuid,
    pub namespace: String,
    pub service: String,
    pub message: String,
    /// Hostname of the machine running the release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl ServiceEvent {
    pub fn new(
        release_id: Uuid,
        namespace: impl Into<String>,
        service: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            release_id,
            namespace: namespace.into(),
            service: service.into(),
            message: message.into(),
            hostname: std::env::var("HOSTNAME").ok(),
        }
    }
}

/// Render an event as a prefixed JSON line
pub fn format_event(event: &ServiceEvent) -> serde_json::Result<String> {
    serde_json::to_string(event).map(|json| format!("{}{}", EVENT_PREFIX, json))
}

/// Emits a structured event as JSON to stdout
pub fn emit_event(event: &ServiceEvent) {
    match format_event(event) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::error!("Failed to serialize event: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let release_id = Uuid::new_v4();
        let event = ServiceEvent::new(release_id, "default", "web", "Starting app (v1 -> v2)");

        let line = format_event(&event).unwrap();
        assert!(line.starts_with(EVENT_PREFIX));

        let json: serde_json::Value =
            serde_json::from_str(line.trim_start_matches(EVENT_PREFIX)).unwrap();
        assert_eq!(json["namespace"], "default");
        assert_eq!(json["service"], "web");
        assert_eq!(json["message"], "Starting app (v1 -> v2)");
        assert_eq!(json["release_id"], release_id.to_string());
    }
}
