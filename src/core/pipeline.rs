//! Ordered build step pipelines.
//!
//! Every top-level command gets its own explicit step list, built by value
//! from [`PipelineBuilder`]. The external build step is always first. Steps
//! run strictly in order and the first failure aborts the rest.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Top-level packaging commands that drive a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopLevelCommand {
    Build,
    BdistWheel,
    Install,
}

impl TopLevelCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopLevelCommand::Build => "build",
            TopLevelCommand::BdistWheel => "bdist_wheel",
            TopLevelCommand::Install => "install",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    BazelBuild,
    BuildPy,
    BdistWheel,
    Install,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::BazelBuild => "bazel_build",
            StepKind::BuildPy => "build_py",
            StepKind::BdistWheel => "bdist_wheel",
            StepKind::Install => "install",
        }
    }
}

/// Per-invocation inputs that step predicates may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub prebuild_always_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            prebuild_always_run: true,
        }
    }
}

/// Decides at run time whether a step executes.
pub type StepPredicate = fn(&PipelineOptions) -> bool;

#[derive(Clone, Copy)]
pub struct Step {
    pub kind: StepKind,
    pub predicate: StepPredicate,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step").field("kind", &self.kind).finish()
    }
}

impl Step {
    pub fn new(kind: StepKind, predicate: StepPredicate) -> Self {
        Self { kind, predicate }
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn should_run(&self, options: &PipelineOptions) -> bool {
        (self.predicate)(options)
    }
}

fn always(_: &PipelineOptions) -> bool {
    true
}

fn run_prebuild(options: &PipelineOptions) -> bool {
    options.prebuild_always_run
}

pub struct PipelineBuilder {
    options: PipelineOptions,
}

impl PipelineBuilder {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Steps shared by every command: the external build, then `build_py`.
    fn build_steps(&self) -> Vec<Step> {
        vec![
            Step::new(StepKind::BazelBuild, run_prebuild),
            Step::new(StepKind::BuildPy, always),
        ]
    }

    pub fn for_command(&self, command: TopLevelCommand) -> Pipeline {
        let mut steps = self.build_steps();
        match command {
            TopLevelCommand::Build => {}
            TopLevelCommand::BdistWheel => steps.push(Step::new(StepKind::BdistWheel, always)),
            TopLevelCommand::Install => steps.push(Step::new(StepKind::Install, always)),
        }

        Pipeline {
            command,
            options: self.options,
            steps,
        }
    }
}

pub trait PipelineStepExecutor {
    fn execute_step(&self, step: &Step) -> Result<Value>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePlan {
    pub command: TopLevelCommand,
    pub steps: Vec<PipelinePlanStep>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePlanStep {
    pub name: String,
    pub will_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineRunStatus {
    Success,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStepResult {
    pub name: String,
    pub status: PipelineRunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunResult {
    pub command: TopLevelCommand,
    pub steps: Vec<PipelineStepResult>,
    pub summary: PipelineRunSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSummary {
    pub total_steps: usize,
    pub succeeded: usize,
    pub skipped: usize,
}

pub struct Pipeline {
    command: TopLevelCommand,
    options: PipelineOptions,
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn command(&self) -> TopLevelCommand {
        self.command
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(Step::name).collect()
    }

    pub fn plan(&self) -> PipelinePlan {
        PipelinePlan {
            command: self.command,
            steps: self
                .steps
                .iter()
                .map(|step| PipelinePlanStep {
                    name: step.name().to_string(),
                    will_run: step.should_run(&self.options),
                })
                .collect(),
        }
    }

    /// Run every step in order. The first error is returned as-is, with a
    /// hint naming the steps that never ran.
    pub fn run(&self, executor: &dyn PipelineStepExecutor) -> Result<PipelineRunResult> {
        let mut results = Vec::with_capacity(self.steps.len());

        for (idx, step) in self.steps.iter().enumerate() {
            if !step.should_run(&self.options) {
                crate::log_status!("pipeline", "Skipping {}", step.name());
                results.push(PipelineStepResult {
                    name: step.name().to_string(),
                    status: PipelineRunStatus::Skipped,
                    data: None,
                });
                continue;
            }

            crate::log_status!("pipeline", "Running {}", step.name());
            let data = executor.execute_step(step).map_err(|err| {
                let not_run: Vec<&str> = self.steps[idx + 1..].iter().map(Step::name).collect();
                if not_run.is_empty() {
                    err.with_hint(format!("Step '{}' failed", step.name()))
                } else {
                    err.with_hint(format!(
                        "Step '{}' failed; not run: {}",
                        step.name(),
                        not_run.join(", ")
                    ))
                }
            })?;

            results.push(PipelineStepResult {
                name: step.name().to_string(),
                status: PipelineRunStatus::Success,
                data: Some(data),
            });
        }

        let summary = build_summary(&results);
        Ok(PipelineRunResult {
            command: self.command,
            steps: results,
            summary,
        })
    }
}

fn build_summary(results: &[PipelineStepResult]) -> PipelineRunSummary {
    let succeeded = results
        .iter()
        .filter(|r| matches!(r.status, PipelineRunStatus::Success))
        .count();
    let skipped = results
        .iter()
        .filter(|r| matches!(r.status, PipelineRunStatus::Skipped))
        .count();

    PipelineRunSummary {
        total_steps: results.len(),
        succeeded,
        skipped,
    }
}
