#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated project directory plus an empty directory used as PATH, so
/// neither the user's installs nor real helpers leak into a test.
pub struct TestEnv {
    _tmp: TempDir,
    pub project: PathBuf,
    pub global_bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let project = tmp.path().join("project");
        let global_bin = tmp.path().join("global-bin");
        fs::create_dir_all(project.join("node_modules/.bin")).expect("create local bin dir");
        fs::create_dir_all(&global_bin).expect("create global bin dir");
        Self {
            _tmp: tmp,
            project,
            global_bin,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("akashic");
        cmd.current_dir(&self.project)
            .env("PATH", &self.global_bin)
            .env_remove("AKASHIC_CONFIG")
            .env("NO_COLOR", "1");
        cmd
    }

    pub fn local_bin(&self) -> PathBuf {
        self.project.join("node_modules/.bin")
    }

    /// File the recording helpers append their argv to.
    pub fn argv_log(&self) -> PathBuf {
        self.project.join("argv.log")
    }

    /// File the fake package manager appends to, one line per call.
    pub fn npm_log(&self) -> PathBuf {
        self.project.join("npm.log")
    }

    /// Calls the fake package manager received, as space-joined argv.
    pub fn npm_calls(&self) -> Vec<String> {
        fs::read_to_string(self.npm_log())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Write a settings file whose `npm` is a recording stub. The stub exits 1
    /// for any package ending in `fail_suffix`.
    #[cfg(unix)]
    pub fn config_with_fake_npm(&self, packages: &[&str], fail_suffix: Option<&str>) -> PathBuf {
        let log = self.npm_log();
        let mut body = format!("printf '%s\\n' \"$*\" >> '{}'", log.display());
        if let Some(suffix) = fail_suffix {
            body.push_str(&format!("\ncase \"$3\" in *{suffix}) exit 1 ;; esac"));
        }
        let npm = helper(&self.project, "fake-npm", &body);

        let cfg = self.project.join("akashic.json");
        let settings = serde_json::json!({ "npm": npm, "packages": packages });
        fs::write(&cfg, settings.to_string()).expect("write config");
        cfg
    }

    /// Read back what a recording helper saw: first line is argc.
    pub fn recorded_argv(&self) -> Vec<String> {
        fs::read_to_string(self.argv_log())
            .expect("helper should have recorded its argv")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Write an executable `/bin/sh` helper.
#[cfg(unix)]
pub fn helper(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write helper");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod helper");
    path
}

/// Shell snippet recording `$#` and each argument on its own line.
pub fn record_argv(log: &Path) -> String {
    let log = log.display();
    format!("printf '%s\\n' \"$#\" > '{log}'\nfor a in \"$@\"; do printf '%s\\n' \"$a\" >> '{log}'; done")
}
