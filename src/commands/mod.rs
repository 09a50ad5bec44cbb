use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use bazelpack::defaults;
use bazelpack::executor::{self, PackagingExecutor};
use bazelpack::pipeline::PipelineRunResult;
use bazelpack::prebuild::PathResolver;
use bazelpack::tool::ProcessRunner;
use bazelpack::{Project, TopLevelCommand};

pub type CmdResult<T> = bazelpack::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub manifest_path: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load the project from `--manifest-path` or the nearest `bazelpack.json`.
    pub fn load_project(&self) -> bazelpack::Result<Project> {
        let cwd = std::env::current_dir().map_err(|e| {
            bazelpack::Error::internal_io(e.to_string(), Some("read current dir".to_string()))
        })?;
        Project::discover(
            self.manifest_path.as_deref(),
            &cwd,
            defaults::load_defaults(),
        )
    }
}

/// Flags shared by the commands that run a packaging pipeline.
#[derive(Args, Debug, Default)]
pub struct PipelineArgs {
    /// Skip the external build step for this run
    #[arg(long)]
    pub skip_prebuild: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingOutput {
    pub name: String,
    pub version: String,
    #[serde(flatten)]
    pub pipeline: PipelineRunResult,
}

/// Load the project, then run the pipeline for `command` against real processes.
pub(crate) fn run_pipeline(
    command: TopLevelCommand,
    args: &PipelineArgs,
    install_target: Option<PathBuf>,
    global: &GlobalArgs,
) -> CmdResult<PackagingOutput> {
    let project = global.load_project()?;
    let resolver = PathResolver;
    let runner = ProcessRunner;

    let mut packaging = PackagingExecutor::new(&project, &resolver, &runner);
    if let Some(target) = install_target {
        packaging = packaging.with_install_target(target);
    }

    let options = executor::pipeline_options(&project, args.skip_prebuild);
    let pipeline = executor::run_command(command, options, &packaging)?;

    Ok((
        PackagingOutput {
            name: project.metadata.name.clone(),
            version: project.version().to_string(),
            pipeline,
        },
        0,
    ))
}

pub mod bdist_wheel;
pub mod build;
pub mod config;
pub mod install;
pub mod metadata;
pub mod steps;
pub mod version;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (bazelpack::Result<serde_json::Value>, i32) {
    crate::tty::status("bazelpack is working...");

    match command {
        crate::Commands::Build(args) => dispatch!(args, global, build),
        crate::Commands::BdistWheel(args) => dispatch!(args, global, bdist_wheel),
        crate::Commands::Install(args) => dispatch!(args, global, install),
        crate::Commands::Version(args) => dispatch!(args, global, version),
        crate::Commands::Metadata(args) => dispatch!(args, global, metadata),
        crate::Commands::Steps(args) => dispatch!(args, global, steps),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}
