use clap::Parser;

use akashic::cli::Cli;
use akashic::cmd::format::{Role, StyleOptions, marked};
use akashic::cmd::{self, Dispatcher};
use akashic::config::{Identity, Settings};
use akashic::error::{EXIT_FAILURE, EXIT_USAGE, exit_code_for};
use akashic::proxy::{ExitOutcome, SystemRunner};
use akashic::resolve::SearchContext;
use akashic::utils;

const IDENTITY: Identity = Identity::new("akashic", env!("CARGO_PKG_VERSION"));

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let config_path = cli.config.clone();
    let invocation = cmd::classify(cli);
    if let Some(result) = cmd::answer_directly(&invocation, &IDENTITY) {
        finish(result);
    }

    let settings = match Settings::load(config_path.as_deref()) {
        Ok(s) => s,
        Err(e) => fail(&e, EXIT_USAGE),
    };
    let search = match SearchContext::from_env(&settings.local_bin_dir) {
        Ok(s) => s,
        Err(e) => fail(&e, EXIT_FAILURE),
    };

    let runner = SystemRunner;
    let dispatcher = Dispatcher::new(IDENTITY, settings, search, &runner);
    finish(cmd::dispatch(invocation, &dispatcher))
}

fn finish(result: anyhow::Result<ExitOutcome>) -> ! {
    match result {
        Ok(outcome) => std::process::exit(outcome.code()),
        Err(e) => fail(&e, exit_code_for(&e)),
    }
}

/// Single exit point for failures: one line on stderr, then the exit code.
fn fail(err: &anyhow::Error, code: i32) -> ! {
    let style = StyleOptions::for_stderr();
    eprintln!("{}", marked("error", Role::Error, format!("{err:#}"), &style));
    std::process::exit(code)
}
