//! Command path resolution.
//!
//! SearchContext::locate -> ResolvedCommand { path, origin: Local | Global }
//! resolve_subcommand    -> first candidate name (by naming convention) that locates
//!
//! Search tiers, strict priority, first hit wins:
//!   1. <cwd>/<local bin dir>/<name>     (existence only)   -> Local
//!   2. <dir of running executable>/<name> (existence only) -> Local
//!   3. PATH lookup (executable regular file)               -> Global
//!
//! Nothing is cached: every dispatch re-derives candidates and re-probes the
//! filesystem, since helper installs change between runs.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DispatchError;
use crate::{log_debug, log_trace};

/// Where a helper executable was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Project-local install, or shipped next to the dispatcher itself.
    Local,
    /// Found through the system executable search path.
    Global,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Local => "local",
            Origin::Global => "global",
        })
    }
}

/// An executable path tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    path: PathBuf,
    origin: Origin,
}

impl ResolvedCommand {
    pub fn new(path: PathBuf, origin: Origin) -> Self {
        Self { path, origin }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }
}

impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.origin)
    }
}

/* -------------------------------------------------------------------------- */
/* Locator                                                                    */
/* -------------------------------------------------------------------------- */

/// Snapshot of the process environment the locator searches.
///
/// Captured once per dispatch; tests build one by hand to point every tier
/// at temporary directories.
#[derive(Debug, Clone)]
pub struct SearchContext {
    /// Absolute working directory.
    pub cwd: PathBuf,
    /// Project-relative helper directory (`node_modules/.bin`).
    pub local_bin_dir: PathBuf,
    /// Directory holding the running executable, if it could be determined.
    pub exe_dir: Option<PathBuf>,
    /// Raw `PATH` value.
    pub path_var: Option<OsString>,
}

impl SearchContext {
    pub fn from_env(local_bin_dir: impl Into<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        // Not fatal: the sibling tier is simply skipped.
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Ok(Self {
            cwd,
            local_bin_dir: local_bin_dir.into(),
            exe_dir,
            path_var: std::env::var_os("PATH"),
        })
    }

    /// Find `name` by the tier order above. `None` means "try the next candidate".
    pub fn locate(&self, name: &str) -> Option<ResolvedCommand> {
        if name.is_empty() {
            return None;
        }

        let local = self.cwd.join(&self.local_bin_dir).join(name);
        log_trace!("probe local: {}", local.display());
        if local.exists() {
            return Some(ResolvedCommand::new(local, Origin::Local));
        }

        if let Some(dir) = &self.exe_dir {
            let sibling = dir.join(name);
            log_trace!("probe sibling: {}", sibling.display());
            if sibling.exists() {
                return Some(ResolvedCommand::new(sibling, Origin::Local));
            }
        }

        self.lookup_path(name)
            .map(|p| ResolvedCommand::new(p, Origin::Global))
    }

    /// PATH tier. Empty entries are dropped so they never mean "cwd";
    /// executability and PATHEXT suffixes are `which`'s job.
    fn lookup_path(&self, name: &str) -> Option<PathBuf> {
        let raw = self.path_var.as_ref()?;
        let dirs: Vec<PathBuf> = std::env::split_paths(raw)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();
        if dirs.is_empty() {
            return None;
        }
        let paths = std::env::join_paths(dirs).ok()?;
        log_trace!("probe PATH for {name}");
        which::which_in(name, Some(paths), &self.cwd).ok()
    }
}

/* -------------------------------------------------------------------------- */
/* Naming Fallback Resolver                                                   */
/* -------------------------------------------------------------------------- */

/// Default candidate templates: short alias first, package-qualified second.
pub const DEFAULT_CONVENTIONS: &[&str] = &["{root}-{name}", "{root}-cli-{name}"];

/// Reject subcommand tokens that could escape the search directories.
pub fn validate_command_name(name: &str) -> Result<(), DispatchError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(DispatchError::InvalidCommandName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Expand every convention template for one subcommand, preserving order.
pub fn candidate_names(root: &str, subcommand: &str, conventions: &[String]) -> Vec<String> {
    conventions
        .iter()
        .map(|tpl| tpl.replace("{root}", root).replace("{name}", subcommand))
        .collect()
}

/// Resolve a subcommand to the first candidate any tier can find.
pub fn resolve_subcommand(
    ctx: &SearchContext,
    root: &str,
    subcommand: &str,
    conventions: &[String],
) -> Result<ResolvedCommand, DispatchError> {
    validate_command_name(subcommand)?;

    for candidate in candidate_names(root, subcommand, conventions) {
        if let Some(found) = ctx.locate(&candidate) {
            log_debug!("resolved '{subcommand}' via '{candidate}' -> {found}");
            return Ok(found);
        }
    }

    Err(DispatchError::CommandNotFound {
        name: subcommand.to_string(),
    })
}
