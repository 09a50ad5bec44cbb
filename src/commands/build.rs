use clap::Args;

use bazelpack::TopLevelCommand;

use super::{CmdResult, GlobalArgs, PackagingOutput, PipelineArgs};

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

pub fn run(args: BuildArgs, global: &GlobalArgs) -> CmdResult<PackagingOutput> {
    super::run_pipeline(TopLevelCommand::Build, &args.pipeline, None, global)
}
