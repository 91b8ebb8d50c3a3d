/*!
Dispatcher configuration.

Two halves:
  - `Identity`  : root name + version, compiled in and passed explicitly to
                  every command that needs them.
  - `Settings`  : optional file (`--config PATH` > `AKASHIC_CONFIG` env),
                  YAML for `.yaml` / `.yml`, JSON otherwise. Every key is optional.

Example (`akashic.yaml`):

  conventions: ["{root}-{name}", "{root}-cli-{name}"]
  local_bin_dir: node_modules/.bin
  packages: ["@akashic/akashic-cli-init"]
  registry: https://registry.npmjs.org
  repository: cowlick/akashic
  npm: npm
*/

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::resolve::DEFAULT_CONVENTIONS;

/// Environment fallback for `--config`.
pub const CONFIG_ENV: &str = "AKASHIC_CONFIG";

/// Official helper packages installed by `bootstrap` and refreshed by `upgrade`.
pub const DEFAULT_PACKAGES: &[&str] = &[
    "@akashic/akashic-cli-init",
    "@akashic/akashic-cli-scan",
    "@akashic/akashic-cli-modify",
    "@akashic/akashic-cli-update",
    "@akashic/akashic-cli-install",
    "@akashic/akashic-cli-uninstall",
    "@akashic/akashic-cli-config",
    "@akashic/akashic-cli-export-html",
    "@akashic/akashic-cli-export-zip",
    "@akashic/akashic-cli-stat",
];

/// Name and version of the running dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub name: &'static str,
    pub version: &'static str,
}

impl Identity {
    pub const fn new(name: &'static str, version: &'static str) -> Self {
        Self { name, version }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Candidate name templates; `{root}` and `{name}` are substituted.
    pub conventions: Vec<String>,
    /// Helper directory relative to the project root.
    pub local_bin_dir: PathBuf,
    pub packages: Vec<String>,
    /// npm registry base URL.
    pub registry: String,
    /// `owner/repo` slug releases are fetched from.
    pub repository: String,
    /// Package manager executable.
    pub npm: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            conventions: DEFAULT_CONVENTIONS.iter().map(|s| s.to_string()).collect(),
            local_bin_dir: PathBuf::from("node_modules/.bin"),
            packages: DEFAULT_PACKAGES.iter().map(|s| s.to_string()).collect(),
            registry: "https://registry.npmjs.org".to_string(),
            repository: "cowlick/akashic".to_string(),
            npm: "npm".to_string(),
        }
    }
}

impl Settings {
    /// Resolve the effective settings: explicit path, then env, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let settings: Settings = match ext.as_deref() {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&raw).context("failed to parse YAML config")?
            }
            _ => serde_json::from_str(&raw).context("failed to parse JSON config")?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.conventions.is_empty() {
            bail!("config: 'conventions' must list at least one template");
        }
        if let Some(bad) = self.conventions.iter().find(|c| !c.contains("{name}")) {
            bail!("config: convention '{bad}' has no {{name}} placeholder");
        }
        if self.local_bin_dir.is_absolute() {
            bail!("config: 'local_bin_dir' must be relative to the project directory");
        }
        if self.repository.split('/').filter(|s| !s.is_empty()).count() != 2 {
            bail!(
                "config: 'repository' must look like owner/repo, got '{}'",
                self.repository
            );
        }
        Ok(())
    }
}
