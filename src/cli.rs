//! CLI definitions for releaser
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(
    name = "releaser",
    version,
    about = "Applies planned service updates to the cluster",
    long_about = "Applies a precomputed release plan to Kubernetes and records a per-service outcome.\nUpdates to the releaser itself are applied last, without waiting for a reply."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a release plan
    Apply {
        /// Release plan file (YAML or JSON)
        #[arg(long, required = true)]
        plan: String,

        /// Releaser configuration file
        #[arg(long, env = "RELEASER_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
        config: String,

        /// Log what would be applied without touching the cluster
        #[arg(long)]
        dry_run: bool,

        /// Write the per-service results as JSON to this file
        #[arg(long)]
        output: Option<String>,
    },

    /// Show how a release plan would be split, without applying it
    Plan {
        /// Release plan file (YAML or JSON)
        #[arg(long, required = true)]
        plan: String,

        /// Releaser configuration file
        #[arg(long, env = "RELEASER_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
        config: String,
    },
}
