//! # Orchestrator
//!
//! Process Orchestrator.
//!
//! Responsibilities:
//! - Launch every descriptor as its own OS process (no admission control)
//! - Poll liveness, record exit codes, reclaim each child exactly once
//! - Keep going when a process fails; return once all have ended
//!
//! The [`worker`] module is the other side: the code a launched process runs
//! to shell out to the train/test scripts.

pub mod error;
pub mod launcher;
pub mod orchestrator;
pub mod record;
pub mod worker;

pub use error::{LaunchError, Result};
pub use launcher::{Launcher, SelfExecLauncher, WORKER_SUBCOMMAND};
pub use orchestrator::{Orchestrator, DEFAULT_POLL_INTERVAL};
pub use record::{OrchestrationReport, ProcessRecord, ProcessSummary, ProcessTable};
pub use worker::{run_target, script_command, ScriptPhase};
