//! Harness run: plan, launch, wait, clean up.

mod harness;
mod stats;

pub use harness::{Harness, HarnessRunConfig, StoreBackend};
pub use stats::RunStats;
