use clap::Args;
use serde::Serialize;

use bazelpack::metadata::PackageMetadata;
use bazelpack::project::ProjectSummary;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct MetadataArgs {
    /// Also list the packages that would be shipped
    #[arg(long)]
    pub packages: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataOutput {
    pub project: ProjectSummary,
    pub metadata: PackageMetadata,
    pub wheel_file_name: String,
    pub rendered: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
}

pub fn run(args: MetadataArgs, global: &GlobalArgs) -> CmdResult<MetadataOutput> {
    let project = global.load_project()?;
    let packages = if args.packages {
        Some(project.packages()?)
    } else {
        None
    };

    Ok((
        MetadataOutput {
            project: project.summary(),
            wheel_file_name: project.metadata.wheel_file_name(),
            rendered: project.metadata.render(),
            metadata: project.metadata,
            packages,
        },
        0,
    ))
}
