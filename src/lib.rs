//! Release application engine
//!
//! Applies a precomputed batch of service updates to the cluster, records a
//! per-service outcome, and hands the releaser's own update to the platform
//! last, without waiting for a reply.

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod observability;
pub mod services;
pub mod ui;
