//! Typed failures of the dispatch path (resolution + launch).
//!
//! Glue commands report through `anyhow`; these variants are what the
//! front-end downcasts to when choosing a process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code when no candidate executable was found (shell convention).
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit code when a resolved executable could not be started.
pub const EXIT_LAUNCH_FAILED: i32 = 126;
/// Exit code for malformed invocations and bad configuration.
pub const EXIT_USAGE: i32 = 2;
/// Exit code for every other built-in failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// No naming convention produced a name that any search tier could find.
    #[error("akashic command not found: {name}")]
    CommandNotFound { name: String },

    /// The subcommand token is empty or carries a path separator.
    #[error("invalid command name '{name}': must be non-empty and contain no path separators")]
    InvalidCommandName { name: String },

    /// The helper was found but the OS refused to start it.
    #[error("failed to launch {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DispatchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::CommandNotFound { .. } => EXIT_NOT_FOUND,
            DispatchError::InvalidCommandName { .. } => EXIT_USAGE,
            DispatchError::Launch { .. } => EXIT_LAUNCH_FAILED,
        }
    }
}

/// Map any failure surfaced to `main` onto a process exit code.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<DispatchError>())
        .map(DispatchError::exit_code)
        .unwrap_or(EXIT_FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn not_found_message_names_subcommand() {
        let err = DispatchError::CommandNotFound {
            name: "frobnicate".into(),
        };
        assert_eq!(err.to_string(), "akashic command not found: frobnicate");
        assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
    }

    #[test]
    fn exit_code_survives_context_wrapping() {
        let wrapped: anyhow::Result<()> = Err(DispatchError::Launch {
            path: PathBuf::from("/nope"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        })
        .context("export failed");
        assert_eq!(exit_code_for(&wrapped.unwrap_err()), EXIT_LAUNCH_FAILED);
    }

    #[test]
    fn plain_errors_map_to_generic_failure() {
        let err = anyhow::anyhow!("npm exploded");
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
    }
}
