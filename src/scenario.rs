//! Scenario runner for batch projections and sensitivity sweeps
//!
//! Holds one engine configuration and runs many parameter sets against it,
//! in parallel across inputs.

use rayon::prelude::*;

use crate::behavior::{BehavioralVariable, PresetLevel};
use crate::error::Result;
use crate::params::RawInputs;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};

/// Batch runner over a shared configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let base = RawInputs::new(2750.0, 120);
///
/// for result in runner.sweep_growth(&base, &[0.0, 2.0, 4.0])? {
///     println!("{:.2}", result.outcomes.ode_7);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Runner with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }

    /// Run a single projection
    pub fn run(&self, raw: &RawInputs) -> Result<ProjectionResult> {
        self.engine.project(raw)
    }

    /// Run every input set; each entry succeeds or fails on its own
    pub fn run_batch(&self, inputs: &[RawInputs]) -> Vec<Result<ProjectionResult>> {
        inputs.par_iter().map(|raw| self.engine.project(raw)).collect()
    }

    /// Re-run `base` with each annual growth rate (percent)
    pub fn sweep_growth(&self, base: &RawInputs, growth_pcts: &[f64]) -> Result<Vec<ProjectionResult>> {
        growth_pcts
            .par_iter()
            .map(|&g| self.engine.project(&base.clone().with_growth(g)))
            .collect()
    }

    /// Re-run `base` with every preset level of one behavioral variable
    pub fn sweep_variable(
        &self,
        base: &RawInputs,
        variable: BehavioralVariable,
    ) -> Result<Vec<(PresetLevel, ProjectionResult)>> {
        variable
            .presets()
            .par_iter()
            .map(|level| {
                let behavior = base.behavior.with(variable, level.value);
                let result = self.engine.project(&base.clone().with_behavior(behavior))?;
                Ok((*level, result))
            })
            .collect()
    }

    pub fn config(&self) -> &ProjectionConfig {
        self.engine.config()
    }
}
