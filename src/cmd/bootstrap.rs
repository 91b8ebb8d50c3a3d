//! `akashic bootstrap [-g]`: install every configured helper package, one at
//! a time, stopping at the first npm failure.

use anyhow::{Context, Result};
use clap::Args;

use crate::cmd::format::{Role, StyleOptions, marked};
use crate::cmd::shared::Dispatcher;
use crate::npm;
use crate::proxy::ExitOutcome;

#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Install the packages globally
    #[arg(short, long)]
    pub global: bool,
}

pub fn execute_bootstrap(args: BootstrapArgs, dispatcher: &Dispatcher<'_>) -> Result<ExitOutcome> {
    let style = StyleOptions::detect();
    let settings = &dispatcher.settings;

    for pkg in &settings.packages {
        npm::install(&settings.npm, pkg, args.global)
            .with_context(|| format!("bootstrap stopped at {pkg}"))?;
        println!("{}", marked("success", Role::Success, format!("installed {pkg}"), &style));
    }

    Ok(ExitOutcome::SUCCESS)
}
