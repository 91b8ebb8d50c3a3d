/*!
`delegate.rs`

Dispatch front-end. Each invocation is classified before anything runs:

  Help               no subcommand, no flags
  Version            -v / --version
  Builtin(command)   bootstrap | upgrade | selfupdate | export | link
  Delegated          anything else: `<root> <name> [args...]`

Delegated invocations go through the naming fallback (`<root>-<name>`, then
`<root>-cli-<name>`) and the process proxy; the helper's exit code becomes
the dispatcher's. Resolution failure starts no process.

Help and Version are answered by `answer_directly` before settings are
loaded or the working directory is read.
*/

use anyhow::Result;
use clap::CommandFactory;
use std::ffi::OsString;

use crate::cli::{Cli, Commands};
use crate::cmd::shared::Dispatcher;
use crate::config::Identity;
use crate::cmd::{BootstrapArgs, ExportArgs, LinkArgs};
use crate::error::DispatchError;
use crate::proxy::ExitOutcome;
use crate::{cmd, log_debug};

/// Commands the dispatcher implements itself.
#[derive(Debug)]
pub enum Builtin {
    Bootstrap(BootstrapArgs),
    Upgrade,
    Selfupdate,
    Export(ExportArgs),
    Link(LinkArgs),
}

#[derive(Debug)]
pub enum Invocation {
    Help,
    Version,
    Builtin(Builtin),
    Delegated {
        subcommand: OsString,
        args: Vec<OsString>,
    },
}

/// Pure classification of parsed arguments; no filesystem access.
pub fn classify(cli: Cli) -> Invocation {
    if cli.version {
        return Invocation::Version;
    }
    match cli.command {
        None => Invocation::Help,
        Some(Commands::External(mut argv)) => {
            // clap guarantees the subcommand token is present
            let subcommand = if argv.is_empty() {
                OsString::new()
            } else {
                argv.remove(0)
            };
            Invocation::Delegated {
                subcommand,
                args: argv,
            }
        }
        Some(Commands::Bootstrap(args)) => Invocation::Builtin(Builtin::Bootstrap(args)),
        Some(Commands::Upgrade) => Invocation::Builtin(Builtin::Upgrade),
        Some(Commands::Selfupdate) => Invocation::Builtin(Builtin::Selfupdate),
        Some(Commands::Export(args)) => Invocation::Builtin(Builtin::Export(args)),
        Some(Commands::Link(args)) => Invocation::Builtin(Builtin::Link(args)),
    }
}

/// Answer invocations that need no settings and no search context.
/// `None` means the caller must build a `Dispatcher` and call `dispatch`.
pub fn answer_directly(invocation: &Invocation, identity: &Identity) -> Option<Result<ExitOutcome>> {
    match invocation {
        Invocation::Help => Some(print_help()),
        Invocation::Version => Some(print_version(identity)),
        Invocation::Builtin(_) | Invocation::Delegated { .. } => None,
    }
}

fn print_help() -> Result<ExitOutcome> {
    Cli::command().print_help()?;
    println!();
    Ok(ExitOutcome::SUCCESS)
}

fn print_version(identity: &Identity) -> Result<ExitOutcome> {
    println!("{} {}", identity.name, identity.version);
    Ok(ExitOutcome::SUCCESS)
}

/// Execute a classified invocation.
pub fn dispatch(invocation: Invocation, dispatcher: &Dispatcher<'_>) -> Result<ExitOutcome> {
    match invocation {
        Invocation::Help => print_help(),
        Invocation::Version => print_version(&dispatcher.identity),
        Invocation::Builtin(command) => run_builtin(command, dispatcher),
        Invocation::Delegated { subcommand, args } => {
            let name = subcommand
                .into_string()
                .map_err(|raw| DispatchError::InvalidCommandName {
                    name: raw.to_string_lossy().into_owned(),
                })?;
            log_debug!("delegating '{name}' with {} argument(s)", args.len());
            Ok(dispatcher.delegate(&name, args)?)
        }
    }
}

fn run_builtin(builtin: Builtin, dispatcher: &Dispatcher<'_>) -> Result<ExitOutcome> {
    match builtin {
        Builtin::Bootstrap(args) => cmd::execute_bootstrap(args, dispatcher),
        Builtin::Upgrade => cmd::execute_upgrade(dispatcher),
        Builtin::Selfupdate => cmd::execute_selfupdate(dispatcher),
        Builtin::Export(args) => cmd::execute_export(args, dispatcher),
        Builtin::Link(args) => cmd::execute_link(args, dispatcher),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
