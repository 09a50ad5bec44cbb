use clap::Args;

use bazelpack::TopLevelCommand;

use super::{CmdResult, GlobalArgs, PackagingOutput, PipelineArgs};

#[derive(Args)]
pub struct BdistWheelArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

pub fn run(args: BdistWheelArgs, global: &GlobalArgs) -> CmdResult<PackagingOutput> {
    super::run_pipeline(TopLevelCommand::BdistWheel, &args.pipeline, None, global)
}
