use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{bdist_wheel, build, config, install, metadata, steps, version};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "bazelpack")]
#[command(version = VERSION)]
#[command(about = "Package a Python library whose native parts are built with Bazel")]
struct Cli {
    /// Path to bazelpack.json (defaults to the nearest one above the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the external build, then collect modules into build/lib
    Build(build::BuildArgs),
    /// Build a py3-none-any wheel into dist/
    #[command(name = "bdist-wheel", visible_alias = "bdist_wheel")]
    BdistWheel(bdist_wheel::BdistWheelArgs),
    /// Build, then install into a target directory
    Install(install::InstallArgs),
    /// Show the package version read from the version file
    Version(version::VersionArgs),
    /// Show the package metadata and requirements
    Metadata(metadata::MetadataArgs),
    /// Show the planned steps for a command without running them
    Steps(steps::StepsArgs),
    /// Manage global bazelpack configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = GlobalArgs {
        manifest_path: cli.manifest_path,
    };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);

    if output::print_json_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
