/*!
`selfupdate.rs`

`akashic selfupdate` replaces the running binary with the latest GitHub
release of the configured repository.

Flow:
  GET https://api.github.com/repos/<owner>/<repo>/releases/latest
  tag_name (leading `v` allowed) <= running version -> nothing to do
  otherwise download asset `<root>_<os>_<arch>[.exe]` and swap it in place

Asset names follow the Go-style platform words (`linux`, `darwin`,
`windows` / `amd64`, `arm64`, `386`, `arm`). Only raw binary assets are
supported; archives are not unpacked.
*/

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::cmd::shared::{Dispatcher, block_on, http_client};
use crate::config::Identity;
use crate::proxy::ExitOutcome;
use crate::utils::version::Version;
use crate::{log_debug, log_info};

const GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Clone, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
}

#[derive(Debug, PartialEq, Eq)]
enum UpdateOutcome {
    AlreadyLatest,
    Updated(Version),
}

pub fn execute_selfupdate(dispatcher: &Dispatcher<'_>) -> Result<ExitOutcome> {
    let identity = dispatcher.identity;
    let current = Version::parse(identity.version)
        .context("running binary carries an invalid version")?;
    let client = http_client(&identity)?;

    let outcome = block_on(self_update(
        &client,
        &identity,
        &dispatcher.settings.repository,
        &current,
    ))??;

    match outcome {
        UpdateOutcome::AlreadyLatest => {
            println!("Current binary is the latest version {}", identity.version)
        }
        UpdateOutcome::Updated(v) => println!("Successfully updated to version {v}"),
    }
    Ok(ExitOutcome::SUCCESS)
}

async fn self_update(
    client: &reqwest::Client,
    identity: &Identity,
    repository: &str,
    current: &Version,
) -> Result<UpdateOutcome> {
    let url = latest_release_url(repository)?;
    log_debug!("GET {url}");
    let resp = client
        .get(url.clone())
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;
    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        bail!("no published release found for {repository}");
    }
    let release: Release = resp
        .error_for_status()
        .with_context(|| format!("GitHub rejected release lookup for {repository}"))?
        .json()
        .await
        .context("malformed release metadata")?;

    let latest = Version::parse(&release.tag_name)
        .with_context(|| format!("release tag '{}' is not a version", release.tag_name))?;
    if latest <= *current {
        return Ok(UpdateOutcome::AlreadyLatest);
    }

    let wanted = asset_name(identity.name, std::env::consts::OS, std::env::consts::ARCH)?;
    let asset = release
        .assets
        .iter()
        .find(|a| a.name == wanted)
        .with_context(|| format!("release {latest} has no asset named {wanted}"))?;

    log_info!("downloading {}", asset.browser_download_url);
    let bytes = client
        .get(&asset.browser_download_url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .with_context(|| format!("failed to download {}", asset.name))?
        .bytes()
        .await
        .with_context(|| format!("failed to read {}", asset.name))?;
    if bytes.is_empty() {
        bail!("downloaded asset {} is empty", asset.name);
    }

    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    replace_executable(&exe, &bytes)?;
    Ok(UpdateOutcome::Updated(latest))
}

fn latest_release_url(repository: &str) -> Result<Url> {
    let (owner, repo) = repository
        .split_once('/')
        .filter(|(o, r)| !o.is_empty() && !r.is_empty() && !r.contains('/'))
        .with_context(|| format!("repository must look like owner/repo, got '{repository}'"))?;
    let mut url = Url::parse(GITHUB_API)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("GitHub API URL cannot be a base"))?
        .pop_if_empty()
        .extend(["repos", owner, repo, "releases", "latest"]);
    Ok(url)
}

/// `<root>_<os>_<arch>` in Go platform words, `.exe` on Windows.
fn asset_name(root: &str, os: &str, arch: &str) -> Result<String> {
    let os_word = match os {
        "linux" => "linux",
        "macos" => "darwin",
        "windows" => "windows",
        "freebsd" => "freebsd",
        other => bail!("self-update is not available for OS '{other}'"),
    };
    let arch_word = match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "arm" => "arm",
        other => bail!("self-update is not available for architecture '{other}'"),
    };
    let ext = if os == "windows" { ".exe" } else { "" };
    Ok(format!("{root}_{os_word}_{arch_word}{ext}"))
}

/// Stage the new binary next to `exe`, then swap it in.
///
/// On unix the swap is a single `rename` over the old file, so `exe` always
/// names a complete binary. Windows cannot replace a running image, so the
/// old one is moved aside first and restored if the second rename fails.
fn replace_executable(exe: &Path, bytes: &[u8]) -> Result<()> {
    let dir = exe
        .parent()
        .with_context(|| format!("{} has no parent directory", exe.display()))?;
    let file_name = exe
        .file_name()
        .with_context(|| format!("{} has no file name", exe.display()))?
        .to_string_lossy()
        .into_owned();
    let staged: PathBuf = dir.join(format!(".{file_name}.new"));
    let backup: PathBuf = dir.join(format!(".{file_name}.old"));

    // Left behind by an earlier update on Windows.
    if backup.exists() {
        if let Err(e) = fs::remove_file(&backup) {
            log_debug!("could not remove stale {}: {e}", backup.display());
        }
    }

    fs::write(&staged, bytes)
        .with_context(|| format!("failed to write {}", staged.display()))?;
    if let Err(e) = mark_executable(exe, &staged) {
        let _ = fs::remove_file(&staged);
        return Err(e);
    }
    swap_into_place(&staged, exe, &backup)
}

#[cfg(unix)]
fn mark_executable(exe: &Path, staged: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(exe)
        .map(|m| m.permissions().mode())
        .unwrap_or(0o755);
    fs::set_permissions(staged, fs::Permissions::from_mode(mode | 0o111))
        .with_context(|| format!("failed to mark {} executable", staged.display()))
}

#[cfg(not(unix))]
fn mark_executable(_exe: &Path, _staged: &Path) -> Result<()> {
    Ok(())
}

#[cfg(not(windows))]
fn swap_into_place(staged: &Path, exe: &Path, _backup: &Path) -> Result<()> {
    if let Err(e) = fs::rename(staged, exe) {
        let _ = fs::remove_file(staged);
        return Err(e).with_context(|| format!("failed to install new {}", exe.display()));
    }
    Ok(())
}

#[cfg(windows)]
fn swap_into_place(staged: &Path, exe: &Path, backup: &Path) -> Result<()> {
    if let Err(e) = fs::rename(exe, backup) {
        let _ = fs::remove_file(staged);
        return Err(e).with_context(|| format!("failed to move aside {}", exe.display()));
    }
    if let Err(e) = fs::rename(staged, exe) {
        let _ = fs::remove_file(staged);
        return match fs::rename(backup, exe) {
            Ok(()) => Err(e).with_context(|| format!("failed to install new {}", exe.display())),
            Err(restore) => Err(e).with_context(|| {
                format!(
                    "failed to install new {}; restoring the previous binary also failed ({restore}), it is at {}",
                    exe.display(),
                    backup.display()
                )
            }),
        };
    }
    // Still locked while this process runs; removed by the next update.
    if let Err(e) = fs::remove_file(backup) {
        log_debug!("keeping {} until the next update: {e}", backup.display());
    }
    Ok(())
}
