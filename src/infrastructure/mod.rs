//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - Kubernetes API (server-side apply)
//! - Event log sinks (tracing, JSON stdout)

pub mod event_log;
pub mod kubernetes;
pub mod platform;

// Re-export commonly used types
pub use event_log::{EventLog, JsonEventLog, TracingEventLog};
pub use kubernetes::KubernetesPlatform;
pub use platform::{DryRunPlatform, Platform, ServiceDefinition};
