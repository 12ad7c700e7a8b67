//! # Planner
//!
//! Execution Planner.
//!
//! Expands every enabled job of the requested framework into launch
//! descriptors over the {serial, parallel} × {local, remote} matrix and
//! records every output location it hands out.

mod planner;
mod stamp;

pub use planner::{ExecutionPlan, ExecutionPlanner};
pub use stamp::{next_stamp, TrialStamp};
