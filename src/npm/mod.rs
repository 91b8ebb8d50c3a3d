//! npm collaborator: package manager CLI + registry dist-tags endpoint.
//!
//! install / root           -> shell out to the configured package manager
//! dist_tags_url / fetch_dist_tags -> `<registry>/-/package/<pkg>/dist-tags`
//! installed_package_json   -> where a located helper's package.json lives
//!
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use url::Url;

use crate::resolve::{Origin, ResolvedCommand};
use crate::utils::version::Version;
use crate::{log_debug, log_info};

/// Install `pkg` as a dev dependency of the current project, or globally.
/// Streams are inherited so npm's own progress output reaches the user.
pub fn install(npm: &str, pkg: &str, global: bool) -> Result<()> {
    let scope = if global { "-g" } else { "-D" };
    log_info!("{npm} i {scope} {pkg}");
    let status = Command::new(npm)
        .args(["i", scope, pkg])
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to run '{npm}'"))?;
    if !status.success() {
        bail!("'{npm} i {scope} {pkg}' failed ({status})");
    }
    Ok(())
}

/// `npm root [-g]`: the node_modules directory packages are installed into.
pub fn root(npm: &str, global: bool) -> Result<PathBuf> {
    let mut cmd = Command::new(npm);
    cmd.arg("root");
    if global {
        cmd.arg("-g");
    }
    let out = cmd
        .stderr(Stdio::inherit())
        .output()
        .with_context(|| format!("failed to run '{npm} root'"))?;
    if !out.status.success() {
        bail!("'{npm} root' failed ({})", out.status);
    }
    let text = String::from_utf8(out.stdout).context("npm root printed non-UTF-8 output")?;
    let trimmed = text.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        bail!("'{npm} root' printed nothing");
    }
    Ok(PathBuf::from(trimmed))
}

/// Binary name an npm package installs: the part after the scope.
pub fn bin_name(pkg: &str) -> &str {
    pkg.rsplit_once('/').map(|(_, name)| name).unwrap_or(pkg)
}

/* ---- Registry ---- */

#[derive(Debug, Clone, Deserialize)]
pub struct DistTags {
    pub latest: String,
}

/// Build the dist-tags URL; the scoped name becomes a single escaped segment.
pub fn dist_tags_url(registry: &str, pkg: &str) -> Result<Url> {
    let mut url =
        Url::parse(registry).with_context(|| format!("invalid registry URL: '{registry}'"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("registry URL cannot be a base: '{registry}'"))?
        .pop_if_empty()
        .extend(["-", "package", pkg, "dist-tags"]);
    Ok(url)
}

pub async fn fetch_dist_tags(client: &reqwest::Client, registry: &str, pkg: &str) -> Result<DistTags> {
    let url = dist_tags_url(registry, pkg)?;
    log_debug!("GET {url}");
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("registry returned {status} for {pkg}");
    }
    resp.json::<DistTags>()
        .await
        .with_context(|| format!("malformed dist-tags for {pkg}"))
}

/* ---- Installed package metadata ---- */

#[derive(Debug, Deserialize)]
struct PackageJson {
    version: String,
}

/// Where the package.json of `pkg` lives, given how its binary was found.
///
/// Local installs keep binaries in `node_modules/.bin`, so the package is a
/// sibling of that directory. Global installs are looked up under the
/// package manager's global root.
pub fn installed_package_json(
    pkg: &str,
    resolved: &ResolvedCommand,
    global_root: impl FnOnce() -> Result<PathBuf>,
) -> Result<PathBuf> {
    let base = match resolved.origin() {
        Origin::Local => resolved
            .path()
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .with_context(|| format!("unexpected helper location {}", resolved.path().display()))?,
        Origin::Global => global_root()?,
    };
    Ok(base.join(pkg).join("package.json"))
}

pub fn read_package_version(path: &Path) -> Result<Version> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let pkg: PackageJson = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Version::parse(&pkg.version)
}
