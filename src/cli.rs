use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::cmd::{BootstrapArgs, ExportArgs, LinkArgs};

/// akashic - command-line utility for Akashic Engine
///
/// Built-in commands are handled directly. Any other subcommand NAME is
/// delegated to an installed helper, searched as `akashic-NAME` and then
/// `akashic-cli-NAME` in:
///   1. ./node_modules/.bin        (project-local install)
///   2. the directory of this executable
///   3. PATH                       (global install)
///
/// The helper receives the remaining arguments verbatim and its exit code is
/// returned unchanged.
///
/// Examples:
///   akashic bootstrap -g
///   akashic export html --output dist
///   akashic init -t typescript      (runs akashic-init or akashic-cli-init)
///   akashic new @akashic/template-javascript
#[derive(Parser, Debug)]
#[command(
    name = "akashic",
    about = "Command-line utility for Akashic Engine",
    disable_version_flag = true
)]
pub struct Cli {
    /// Print the version
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Increase log verbosity (--verbose, --verbose --verbose)
    #[arg(long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Silence all non-error log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Settings file (YAML or JSON). Falls back to AKASHIC_CONFIG env.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Try to install official akashic-cli-*
    Bootstrap(BootstrapArgs),

    /// Try to update official akashic-cli-*
    Upgrade,

    /// Try to update self via GitHub
    Selfupdate,

    /// Export an Akashic game (runs akashic-export-FORMAT)
    Export(ExportArgs),

    /// Link a local package (runs akashic-cli-install ... -l)
    Link(LinkArgs),

    #[command(external_subcommand)]
    External(Vec<OsString>),
}
