/*!
shared.rs - state and helpers every subcommand handler uses.

Focus:
  - Dispatcher: identity + settings + search snapshot + process runner,
    built once in `main` and passed down explicitly
  - resolve / delegate: naming fallback + proxy in one call
  - block_on: short-lived tokio runtime for the HTTP-backed glue commands
*/

use anyhow::{Context, Result};
use std::ffi::OsString;

use crate::config::{Identity, Settings};
use crate::error::DispatchError;
use crate::proxy::{ExitOutcome, ProcessInvocation, ProcessRunner};
use crate::resolve::{self, ResolvedCommand, SearchContext};

/* ---- Dispatcher ---- */

pub struct Dispatcher<'a> {
    pub identity: Identity,
    pub settings: Settings,
    pub search: SearchContext,
    pub runner: &'a dyn ProcessRunner,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        identity: Identity,
        settings: Settings,
        search: SearchContext,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            identity,
            settings,
            search,
            runner,
        }
    }

    /// Naming fallback for `subcommand` under this dispatcher's root name.
    pub fn resolve(&self, subcommand: &str) -> Result<ResolvedCommand, DispatchError> {
        resolve::resolve_subcommand(
            &self.search,
            self.identity.name,
            subcommand,
            &self.settings.conventions,
        )
    }

    /// Run an already resolved helper; `args` are forwarded untouched.
    pub fn run_resolved(
        &self,
        resolved: &ResolvedCommand,
        args: Vec<OsString>,
    ) -> Result<ExitOutcome, DispatchError> {
        self.runner.run(&ProcessInvocation::new(resolved, args))
    }

    /// Resolve then run. Nothing is spawned when resolution fails.
    pub fn delegate(
        &self,
        subcommand: &str,
        args: Vec<OsString>,
    ) -> Result<ExitOutcome, DispatchError> {
        let resolved = self.resolve(subcommand)?;
        self.run_resolved(&resolved, args)
    }
}

/* ---- Async bridge ---- */

/// Run a future to completion on a temporary runtime (main stays sync).
pub fn block_on<F: std::future::Future>(fut: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    Ok(rt.block_on(fut))
}

/// HTTP client shared by one glue command run.
pub fn http_client(identity: &Identity) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(format!("{}/{}", identity.name, identity.version))
        .build()
        .context("Failed to build HTTP client")
}
