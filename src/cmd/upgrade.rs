/*!
`upgrade.rs`

`akashic upgrade` walks the configured helper packages in order:

  1. locate the package's binary (name after the scope) via the search tiers
  2. read the installed version from its package.json
       local  : <bin dir>/../<pkg>/package.json
       global : <npm root -g>/<pkg>/package.json
  3. fetch `latest` from the registry dist-tags endpoint
  4. reinstall with the same scope (global iff found on PATH) when older

Packages whose binary cannot be located are reported as not installed and
skipped. A located binary without a readable package.json is skipped as
"version unknown": this is the usual case for helpers found next to the
dispatcher itself when that directory is npm's global bin (tagged Local, so
`<bin dir>/../<pkg>` does not exist). Any other failure stops the run.

Output: one table row per package (PACKAGE, ORIGIN, INSTALLED, LATEST, ACTION).
*/

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cmd::format::{Role, StyleOptions, TableOpts, color, marked, table};
use crate::cmd::shared::{Dispatcher, block_on, http_client};
use crate::npm;
use crate::proxy::ExitOutcome;
use crate::resolve::Origin;
use crate::utils::version::Version;
use crate::{log_info, log_warn};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    NotInstalled,
    VersionUnknown,
    UpToDate,
    Upgraded,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Action::NotInstalled => "not installed",
            Action::VersionUnknown => "version unknown",
            Action::UpToDate => "up to date",
            Action::Upgraded => "upgraded",
        }
    }
}

/// What to do with one installed package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Keep,
    /// Reinstall in the scope the binary was found in.
    Reinstall { global: bool },
}

/// Reinstall only when strictly older, and only in the scope it came from.
fn plan(origin: Origin, installed: &Version, latest: &Version) -> Plan {
    if installed < latest {
        Plan::Reinstall {
            global: origin == Origin::Global,
        }
    } else {
        Plan::Keep
    }
}

#[derive(Debug)]
struct Row {
    package: String,
    origin: Option<Origin>,
    installed: Option<Version>,
    latest: Option<Version>,
    action: Action,
}

pub fn execute_upgrade(dispatcher: &Dispatcher<'_>) -> Result<ExitOutcome> {
    let client = http_client(&dispatcher.identity)?;
    let rows = block_on(upgrade_all(dispatcher, &client))??;
    print_summary(&rows);
    Ok(ExitOutcome::SUCCESS)
}

async fn upgrade_all(dispatcher: &Dispatcher<'_>, client: &reqwest::Client) -> Result<Vec<Row>> {
    let settings = &dispatcher.settings;
    let mut global_root: Option<PathBuf> = None;
    let mut rows = Vec::with_capacity(settings.packages.len());

    for pkg in &settings.packages {
        let Some(resolved) = dispatcher.search.locate(npm::bin_name(pkg)) else {
            log_warn!("{pkg}: binary not found, skipping");
            rows.push(Row {
                package: pkg.clone(),
                origin: None,
                installed: None,
                latest: None,
                action: Action::NotInstalled,
            });
            continue;
        };

        // `npm root -g` is only asked once per run, and only if needed.
        let manifest = npm::installed_package_json(pkg, &resolved, || {
            if let Some(root) = &global_root {
                return Ok(root.clone());
            }
            let root = npm::root(&settings.npm, true)?;
            global_root = Some(root.clone());
            Ok(root)
        })?;
        let installed = match npm::read_package_version(&manifest) {
            Ok(v) => v,
            Err(e) => {
                log_warn!("{pkg}: cannot determine installed version, skipping: {e:#}");
                rows.push(Row {
                    package: pkg.clone(),
                    origin: Some(resolved.origin()),
                    installed: None,
                    latest: None,
                    action: Action::VersionUnknown,
                });
                continue;
            }
        };

        let tags = npm::fetch_dist_tags(client, &settings.registry, pkg).await?;
        let latest = Version::parse(&tags.latest)
            .with_context(|| format!("registry reported an invalid version for {pkg}"))?;

        let action = match plan(resolved.origin(), &installed, &latest) {
            Plan::Reinstall { global } => {
                log_info!("{pkg}: {installed} -> {latest}");
                npm::install(&settings.npm, pkg, global)?;
                Action::Upgraded
            }
            Plan::Keep => Action::UpToDate,
        };

        rows.push(Row {
            package: pkg.clone(),
            origin: Some(resolved.origin()),
            installed: Some(installed),
            latest: Some(latest),
            action,
        });
    }

    Ok(rows)
}

fn print_summary(rows: &[Row]) {
    let style = StyleOptions::detect();
    let dash = || "-".to_string();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let action = match r.action {
                Action::Upgraded => color(Role::Success, r.action.label(), &style),
                Action::NotInstalled | Action::VersionUnknown => {
                    color(Role::Dim, r.action.label(), &style)
                }
                Action::UpToDate => r.action.label().to_string(),
            };
            vec![
                r.package.clone(),
                r.origin.map(|o| o.to_string()).unwrap_or_else(dash),
                r.installed.as_ref().map(|v| v.to_string()).unwrap_or_else(dash),
                r.latest.as_ref().map(|v| v.to_string()).unwrap_or_else(dash),
                action,
            ]
        })
        .collect();

    let upgraded = rows.iter().filter(|r| r.action == Action::Upgraded).count();
    println!(
        "{}",
        marked("list", Role::Primary, format!("Helpers ({upgraded} upgraded)"), &style)
    );
    println!(
        "{}",
        table(
            &["PACKAGE", "ORIGIN", "INSTALLED", "LATEST", "ACTION"],
            &body,
            TableOpts::default(),
            &style,
        )
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> Version {
        Version::parse(raw).unwrap()
    }

    #[test]
    fn older_global_install_is_reinstalled_globally() {
        assert_eq!(
            plan(Origin::Global, &v("1.2.0"), &v("1.3.0")),
            Plan::Reinstall { global: true }
        );
    }

    #[test]
    fn older_local_install_is_reinstalled_locally() {
        assert_eq!(
            plan(Origin::Local, &v("0.9.9"), &v("1.0.0")),
            Plan::Reinstall { global: false }
        );
    }

    #[test]
    fn equal_or_newer_install_is_kept() {
        assert_eq!(plan(Origin::Global, &v("1.3.0"), &v("1.3.0")), Plan::Keep);
        assert_eq!(plan(Origin::Local, &v("2.0.0"), &v("1.9.0")), Plan::Keep);
    }

    #[test]
    fn prerelease_is_older_than_its_release() {
        assert_eq!(
            plan(Origin::Local, &v("1.0.0-beta.1"), &v("1.0.0")),
            Plan::Reinstall { global: false }
        );
    }
}
