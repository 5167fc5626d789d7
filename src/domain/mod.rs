//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod partition;
pub mod plan;
pub mod release;
pub mod service_id;

// Re-export commonly used types
pub use partition::{partition, Partition, SelfServiceNames};
pub use plan::ReleasePlan;
pub use release::{
    summarise_update, ContainerUpdate, ReleaseResult, ReleaseStatus, ResultCounts, ServiceResult,
    ServiceUpdate,
};
pub use service_id::{ServiceId, ServiceIdSet};
