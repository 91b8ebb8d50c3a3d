/*!
`export.rs`

`akashic export <format> [args...]` resolves the helper for subcommand
`export-<format>` (so `akashic-export-html`, then `akashic-cli-export-html`)
and runs it with everything after the format, token for token.
*/

use anyhow::Result;
use clap::Args;
use std::ffi::OsString;

use crate::cmd::shared::Dispatcher;
use crate::proxy::ExitOutcome;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export format (html, zip, ...)
    #[arg(value_name = "FORMAT")]
    pub format: String,

    /// Options forwarded to the export helper
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<OsString>,
}

pub fn execute_export(args: ExportArgs, dispatcher: &Dispatcher<'_>) -> Result<ExitOutcome> {
    let subcommand = export_subcommand(&args.format);
    Ok(dispatcher.delegate(&subcommand, args.args)?)
}

fn export_subcommand(format: &str) -> String {
    format!("export-{}", format.trim())
}
