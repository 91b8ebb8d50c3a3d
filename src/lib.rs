//! akashic - dispatcher for the akashic-cli-* helper toolchain.
//!
//! Layout:
//!   resolve   command locator + naming fallback (Local / Global provenance)
//!   proxy     child process launch with inherited streams
//!   cmd       front-end classification and built-in commands
//!   npm       package manager / registry collaborator
//!   scaffold  template copy + game.json prompting (akashic-new)
//!   config    Identity + Settings file
//!   error     typed dispatch failures and exit codes
//!   utils     logging, versions

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod npm;
pub mod proxy;
pub mod resolve;
pub mod scaffold;
pub mod utils;
