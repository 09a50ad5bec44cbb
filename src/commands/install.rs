use clap::Args;
use std::path::PathBuf;

use bazelpack::paths;
use bazelpack::TopLevelCommand;

use super::{CmdResult, GlobalArgs, PackagingOutput, PipelineArgs};

#[derive(Args)]
pub struct InstallArgs {
    /// Directory to install into (e.g. a site-packages directory)
    #[arg(long, value_name = "DIR")]
    pub target: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

pub fn run(args: InstallArgs, global: &GlobalArgs) -> CmdResult<PackagingOutput> {
    if args.target.trim().is_empty() {
        return Err(bazelpack::Error::validation_invalid_argument(
            "target",
            "Install target cannot be empty",
            None,
            Some(vec!["bazelpack install --target ~/.local/lib/python3/site-packages".to_string()]),
        ));
    }

    let target: PathBuf = paths::expand(&args.target);
    super::run_pipeline(TopLevelCommand::Install, &args.pipeline, Some(target), global)
}
