use clap::Args;
use serde::Serialize;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct VersionArgs {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionOutput {
    pub name: String,
    pub version: String,
    pub version_file: String,
}

pub fn run(_args: VersionArgs, global: &GlobalArgs) -> CmdResult<VersionOutput> {
    let project = global.load_project()?;

    Ok((
        VersionOutput {
            name: project.metadata.name.clone(),
            version: project.version().to_string(),
            version_file: project.version_file_path().display().to_string(),
        },
        0,
    ))
}
