/*!
Subcommand handlers.

  delegate.rs   classification + dispatch (built-in vs helper)
  shared.rs     Dispatcher (identity, settings, search snapshot, runner)
  bootstrap.rs  npm install of every official helper
  upgrade.rs    registry check + reinstall of outdated helpers
  selfupdate.rs GitHub release check + binary replacement
  export.rs     `export <format>` -> helper `export-<format>`
  link.rs       `link` -> akashic-cli-install ... -l
  format.rs     color / table helpers for human output

Conventions:
  - Each handler exposes one public `execute_*` returning
    `anyhow::Result<ExitOutcome>`; helper exit codes flow back through it.
  - Argument structs derive `clap::Args` and live beside their handler.
*/

pub mod bootstrap;
pub mod delegate;
pub mod export;
pub mod format;
pub mod link;
pub mod selfupdate;
pub mod shared;
pub mod upgrade;

pub use bootstrap::{BootstrapArgs, execute_bootstrap};
pub use delegate::{Builtin, Invocation, answer_directly, classify, dispatch};
pub use export::{ExportArgs, execute_export};
pub use link::{LinkArgs, execute_link};
pub use selfupdate::execute_selfupdate;
pub use shared::Dispatcher;
pub use upgrade::execute_upgrade;
