//! Execution planning

use contracts::{
    Framework, HarnessConfig, JobSpec, LaunchDescriptor, OutputBase, OutputLocation,
    OutputLocations, TargetFunction,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::stamp::next_stamp;

/// Descriptors to launch plus every location they will write to
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionPlan {
    pub descriptors: Vec<LaunchDescriptor>,
    pub locations: OutputLocations,
}

impl ExecutionPlan {
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Split into what the orchestrator runs and what cleanup consumes
    pub fn into_parts(self) -> (Vec<LaunchDescriptor>, OutputLocations) {
        (self.descriptors, self.locations)
    }
}

/// Expands jobs into launch descriptors for one run mode
#[derive(Debug, Clone)]
pub struct ExecutionPlanner {
    mode: Framework,
    output_bases: Vec<OutputBase>,
}

impl ExecutionPlanner {
    pub fn new(mode: Framework, output_bases: Vec<OutputBase>) -> Self {
        Self { mode, output_bases }
    }

    pub fn from_config(mode: Framework, config: &HarnessConfig) -> Self {
        Self::new(mode, config.output_bases.clone())
    }

    pub fn mode(&self) -> Framework {
        self.mode
    }

    /// Plan every enabled job whose framework matches the run mode
    ///
    /// Per job and per base: one serial descriptor, then a train-only and a
    /// test-only descriptor sharing one location. Each location gets its own
    /// stamp.
    #[instrument(
        name = "planner_plan",
        skip(self, jobs),
        fields(mode = %self.mode, job_count = jobs.len())
    )]
    pub fn plan(&self, jobs: &[JobSpec]) -> ExecutionPlan {
        let mut plan = ExecutionPlan::default();

        for (idx, job) in jobs.iter().enumerate() {
            if !job.enabled || !job.framework.matches(self.mode) {
                debug!(
                    job = idx,
                    framework = %job.framework,
                    enabled = job.enabled,
                    "job skipped"
                );
                continue;
            }

            let scripts = job.scripts();

            for base in &self.output_bases {
                let location = self.allocate(base, &mut plan);
                plan.descriptors.push(LaunchDescriptor::new(
                    TargetFunction::RunSerialPair,
                    scripts.clone(),
                    location,
                ));
            }

            for base in &self.output_bases {
                let location = self.allocate(base, &mut plan);
                plan.descriptors.push(LaunchDescriptor::new(
                    TargetFunction::RunTrainOnly,
                    scripts.clone(),
                    location.clone(),
                ));
                plan.descriptors.push(LaunchDescriptor::new(
                    TargetFunction::RunTestOnly,
                    scripts.clone(),
                    location,
                ));
            }
        }

        info!(
            descriptors = plan.descriptors.len(),
            local_locations = plan.locations.local.len(),
            remote_locations = plan.locations.remote.len(),
            "execution plan ready"
        );

        plan
    }

    fn allocate(&self, base: &OutputBase, plan: &mut ExecutionPlan) -> OutputLocation {
        let location = base.stamped(&next_stamp().to_string());
        plan.locations.insert(location.clone());
        location
    }
}
