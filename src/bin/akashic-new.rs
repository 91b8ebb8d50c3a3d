use anyhow::Result;
use clap::{CommandFactory, Parser};

use akashic::config::Settings;
use akashic::scaffold::{self, GenerateOptions};
use akashic::utils;

/// akashic-new - generate a project skeleton from a template package
///
/// Shipped next to the `akashic` dispatcher, so `akashic new ...` runs it.
///
/// Examples:
///   akashic new @akashic/template-javascript
///   akashic new -i @akashic/template-typescript   (npm i -g first)
#[derive(Parser, Debug)]
#[command(
    name = "akashic new",
    version,
    about = "Generate project skeleton"
)]
struct Cli {
    /// Install npm package from npm registry before generating the template
    #[arg(short, long)]
    install: bool,

    /// Increase log verbosity
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all non-error log output
    #[arg(short, long)]
    quiet: bool,

    /// Settings file (YAML or JSON). Falls back to AKASHIC_CONFIG env.
    #[arg(long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Template npm package
    #[arg(value_name = "NPM_PACKAGE")]
    package: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    utils::init_logging(utils::derive_level(cli.verbose, cli.quiet));

    if let Err(e) = run(cli) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(package) = cli.package.as_deref() else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let settings = Settings::load(cli.config.as_deref())?;
    let opts = GenerateOptions {
        package,
        install: cli.install,
        npm: &settings.npm,
        target_dir: std::env::current_dir()?,
    };

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    let config = scaffold::generate(&opts, &mut input, &mut output)?;
    println!(
        "Generated {package} ({}x{} @ {} fps)",
        config.width,
        config.height,
        config.fps.unwrap_or(scaffold::DEFAULT_FPS)
    );
    Ok(())
}
