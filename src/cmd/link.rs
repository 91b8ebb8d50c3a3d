//! `akashic link [args...]`: run the install helper in link mode.
//!
//! Equivalent to `<root>-cli-install [args...] -l`, with the helper located
//! through the usual search tiers (no naming fallback: the binary name is fixed).

use anyhow::Result;
use clap::Args;
use std::ffi::OsString;

use crate::cmd::shared::Dispatcher;
use crate::error::DispatchError;
use crate::proxy::ExitOutcome;

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Arguments forwarded to the install helper
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<OsString>,
}

pub fn execute_link(args: LinkArgs, dispatcher: &Dispatcher<'_>) -> Result<ExitOutcome> {
    let helper = format!("{}-cli-install", dispatcher.identity.name);
    let resolved = dispatcher
        .search
        .locate(&helper)
        .ok_or_else(|| DispatchError::CommandNotFound {
            name: helper.clone(),
        })?;
    Ok(dispatcher.run_resolved(&resolved, link_args(args.args))?)
}

fn link_args(mut args: Vec<OsString>) -> Vec<OsString> {
    args.push(OsString::from("-l"));
    args
}
