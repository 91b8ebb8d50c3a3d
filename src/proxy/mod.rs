//! Process proxy: run one resolved helper with inherited standard streams.
//!
//! ProcessInvocation { path, args } -> ProcessRunner::run -> ExitOutcome
//!
//! Arguments are handed to the OS as a discrete vector. They are never
//! re-joined into one string, so embedded whitespace and shell
//! metacharacters reach the helper untouched.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::DispatchError;
use crate::log_debug;
use crate::resolve::ResolvedCommand;

/// One child process launch: what to run and exactly which arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    path: PathBuf,
    args: Vec<OsString>,
}

impl ProcessInvocation {
    pub fn new(resolved: &ResolvedCommand, args: Vec<OsString>) -> Self {
        Self {
            path: resolved.path().to_path_buf(),
            args,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Shell-quoted rendering for logs only.
    pub fn display_line(&self) -> String {
        let mut words = vec![self.path.to_string_lossy().into_owned()];
        words.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        shell_words::join(words)
    }
}

/// How a child finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    code: i32,
}

impl ExitOutcome {
    pub const SUCCESS: ExitOutcome = ExitOutcome { code: 0 };

    pub fn from_code(code: i32) -> Self {
        Self { code }
    }

    /// Normal exits keep their code; signal deaths map to 128 + signal.
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self { code };
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                return Self { code: 128 + sig };
            }
        }
        Self { code: 1 }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Seam between the front-end and the OS process table.
pub trait ProcessRunner {
    fn run(&self, invocation: &ProcessInvocation) -> Result<ExitOutcome, DispatchError>;
}

/// Blocking runner backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &ProcessInvocation) -> Result<ExitOutcome, DispatchError> {
        log_debug!("exec: {}", invocation.display_line());

        let status = Command::new(invocation.path())
            .args(invocation.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| DispatchError::Launch {
                path: invocation.path().to_path_buf(),
                source,
            })?;

        let outcome = ExitOutcome::from_status(status);
        log_debug!("child exited with {}", outcome.code());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Origin;

    fn invocation(path: &Path, args: &[&str]) -> ProcessInvocation {
        ProcessInvocation::new(
            &ResolvedCommand::new(path.to_path_buf(), Origin::Local),
            args.iter().map(OsString::from).collect(),
        )
    }

    #[test]
    fn display_line_quotes_whitespace() {
        let inv = invocation(Path::new("/bin/akashic-scan"), &["--flag", "value with spaces"]);
        assert_eq!(
            inv.display_line(),
            "/bin/akashic-scan --flag 'value with spaces'"
        );
    }

    #[test]
    fn missing_executable_is_launch_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let inv = invocation(&tmp.path().join("does-not-exist"), &[]);
        let err = SystemRunner.run(&inv).unwrap_err();
        assert!(matches!(err, DispatchError::Launch { .. }));
        assert_eq!(err.exit_code(), crate::error::EXIT_LAUNCH_FAILED);
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn arguments_stay_discrete_tokens() {
            let tmp = tempfile::tempdir().unwrap();
            let out = tmp.path().join("argv.txt");
            let helper = script(
                tmp.path(),
                "akashic-echo",
                &format!(
                    "printf '%s\\n' \"$#\" > '{}'; for a in \"$@\"; do printf '%s\\n' \"$a\" >> '{}'; done",
                    out.display(),
                    out.display()
                ),
            );

            let outcome = SystemRunner
                .run(&invocation(&helper, &["--flag", "value with spaces"]))
                .unwrap();
            assert!(outcome.success());

            let seen = fs::read_to_string(&out).unwrap();
            let lines: Vec<&str> = seen.lines().collect();
            assert_eq!(lines, vec!["2", "--flag", "value with spaces"]);
        }

        #[test]
        fn exit_code_passes_through() {
            let tmp = tempfile::tempdir().unwrap();
            let helper = script(tmp.path(), "akashic-fail", "exit 3");
            let outcome = SystemRunner.run(&invocation(&helper, &[])).unwrap();
            assert_eq!(outcome.code(), 3);
        }

        #[test]
        fn signal_death_maps_above_128() {
            let tmp = tempfile::tempdir().unwrap();
            let helper = script(tmp.path(), "akashic-killed", "kill -TERM $$");
            let outcome = SystemRunner.run(&invocation(&helper, &[])).unwrap();
            assert_eq!(outcome.code(), 128 + 15);
        }

        #[test]
        fn non_executable_file_is_launch_failure() {
            let tmp = tempfile::tempdir().unwrap();
            let path = tmp.path().join("akashic-plain");
            fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
            let err = SystemRunner.run(&invocation(&path, &[])).unwrap_err();
            assert!(matches!(err, DispatchError::Launch { .. }));
        }
    }
}
