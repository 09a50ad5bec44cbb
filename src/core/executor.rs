//! Step executor that connects the pipeline to the packaging operations.

use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::install;
use crate::package;
use crate::pipeline::{
    PipelineBuilder, PipelineOptions, PipelineRunResult, PipelineStepExecutor, Step, StepKind,
    TopLevelCommand,
};
use crate::prebuild::{ExecutableResolver, ExternalBuild};
use crate::project::Project;
use crate::tool::ExternalToolRunner;
use crate::wheel;

pub struct PackagingExecutor<'a> {
    project: &'a Project,
    resolver: &'a dyn ExecutableResolver,
    runner: &'a dyn ExternalToolRunner,
    install_target: Option<PathBuf>,
}

impl<'a> PackagingExecutor<'a> {
    pub fn new(
        project: &'a Project,
        resolver: &'a dyn ExecutableResolver,
        runner: &'a dyn ExternalToolRunner,
    ) -> Self {
        Self {
            project,
            resolver,
            runner,
            install_target: None,
        }
    }

    pub fn with_install_target(mut self, target: PathBuf) -> Self {
        self.install_target = Some(target);
        self
    }
}

fn to_value<T: Serialize>(output: &T) -> Result<Value> {
    serde_json::to_value(output).map_err(|e| Error::internal_json(e.to_string(), None))
}

impl PipelineStepExecutor for PackagingExecutor<'_> {
    fn execute_step(&self, step: &Step) -> Result<Value> {
        let project = self.project;
        match step.kind {
            StepKind::BazelBuild => {
                let build = ExternalBuild::new(project.prebuild_settings(), &project.root);
                to_value(&build.run(self.resolver, self.runner)?)
            }
            StepKind::BuildPy => {
                let packages = project.packages()?;
                to_value(&package::build_py(
                    &project.root,
                    &packages,
                    &project.build_lib(),
                )?)
            }
            StepKind::BdistWheel => {
                let packages = project.packages()?;
                to_value(&wheel::bdist_wheel(
                    &project.build_lib(),
                    &project.dist_dir(),
                    &project.metadata,
                    &packages,
                )?)
            }
            StepKind::Install => {
                let target = self.install_target.as_ref().ok_or_else(|| {
                    Error::validation_missing_argument(vec!["--target".to_string()])
                })?;
                let packages = project.packages()?;
                to_value(&install::install(
                    &project.build_lib(),
                    target,
                    &project.metadata,
                    &packages,
                )?)
            }
        }
    }
}

/// Options derived from the project manifest and command-line flags.
pub fn pipeline_options(project: &Project, skip_prebuild: bool) -> PipelineOptions {
    PipelineOptions {
        prebuild_always_run: project.prebuild_settings().always_run && !skip_prebuild,
    }
}

/// Build and run the pipeline for one top-level command.
pub fn run_command(
    command: TopLevelCommand,
    options: PipelineOptions,
    executor: &PackagingExecutor<'_>,
) -> Result<PipelineRunResult> {
    PipelineBuilder::new(options)
        .for_command(command)
        .run(executor)
}
