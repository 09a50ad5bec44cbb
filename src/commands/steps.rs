use clap::{Args, ValueEnum};

use bazelpack::executor;
use bazelpack::pipeline::{PipelineBuilder, PipelinePlan};
use bazelpack::TopLevelCommand;

use super::{CmdResult, GlobalArgs, PipelineArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StepsCommand {
    Build,
    #[value(name = "bdist-wheel", alias = "bdist_wheel")]
    BdistWheel,
    Install,
}

impl From<StepsCommand> for TopLevelCommand {
    fn from(command: StepsCommand) -> Self {
        match command {
            StepsCommand::Build => TopLevelCommand::Build,
            StepsCommand::BdistWheel => TopLevelCommand::BdistWheel,
            StepsCommand::Install => TopLevelCommand::Install,
        }
    }
}

#[derive(Args)]
pub struct StepsArgs {
    /// Command whose step list to show
    #[arg(value_enum)]
    pub command: StepsCommand,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Show the planned steps without running anything.
pub fn run(args: StepsArgs, global: &GlobalArgs) -> CmdResult<PipelinePlan> {
    let project = global.load_project()?;
    let options = executor::pipeline_options(&project, args.pipeline.skip_prebuild);
    let plan = PipelineBuilder::new(options)
        .for_command(args.command.into())
        .plan();

    Ok((plan, 0))
}
