//! Centralized error types for releaser
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::ServiceId;

/// Malformed service identity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceIdError {
    #[error("Invalid service ID {id:?}. Expected: namespace/name")]
    MissingSeparator { id: String },

    #[error("Invalid service ID {id:?}: namespace is empty")]
    EmptyNamespace { id: String },

    #[error("Invalid service ID {id:?}: service name is empty")]
    EmptyName { id: String },
}

/// Error returned by a platform apply call.
///
/// The two variants are the only ways an apply can fail. Callers dispatch on
/// the variant, never on the message text.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// Some services failed individually; the rest of the batch went through.
    #[error("{} service(s) failed to apply", .0.len())]
    PerService(BTreeMap<ServiceId, String>),

    /// The batch as a whole failed (e.g. the API server is unreachable).
    #[error(transparent)]
    Coverall(#[from] anyhow::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },
}

/// Release plan errors
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Release plan not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse release plan {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Service {service_id} appears more than once in the release plan")]
    DuplicateService { service_id: String },
}
