//! # Contracts
//!
//! Shared data model for the rule harness. Every other crate in the workspace
//! depends on this one; it depends on none of them.
//!
//! ## Flow
//! - `config_loader` produces a [`HarnessConfig`]
//! - `planner` turns it into [`LaunchDescriptor`]s and [`OutputLocations`]
//! - `orchestrator` runs the descriptors as OS processes
//! - `cleanup` consumes the [`OutputLocations`]

mod config;
mod error;
mod job;
mod launch;
mod location;

pub use config::*;
pub use error::*;
pub use job::*;
pub use launch::*;
pub use location::*;
