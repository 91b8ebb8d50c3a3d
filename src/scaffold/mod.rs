//! Project scaffolding for `akashic-new`.
//!
//! A template package carries `template.json`:
//!
//!   { "path": "<dir inside the package to copy>", "gameJson": "<game.json path in the copy>" }
//!
//! generate: (optional npm install) -> locate package under `npm root -g`
//!           -> copy the template tree into the target dir
//!           -> prompt for width / height / fps and rewrite game.json

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::{log_debug, log_info};

/// Default frame rate offered when game.json does not set one.
pub const DEFAULT_FPS: u64 = 30;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Template {
    pub path: String,
    #[serde(rename = "gameJson")]
    pub game_json: String,
}

impl Template {
    pub fn read(package_dir: &Path) -> Result<Self> {
        let file = package_dir.join("template.json");
        let raw = fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", file.display()))
    }
}

/// The prompted fields of a game.json; everything else is carried through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfiguration {
    pub width: u64,
    pub height: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u64>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/* ---- Template copy ---- */

/// Recursively copy `from` into `to`. Directories are created as needed and
/// existing files are overwritten. Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    let meta = fs::metadata(from).with_context(|| format!("template dir {} missing", from.display()))?;
    if !meta.is_dir() {
        bail!("template path {} is not a directory", from.display());
    }
    fs::create_dir_all(to).with_context(|| format!("failed to create {}", to.display()))?;

    let mut copied = 0;
    for entry in fs::read_dir(from).with_context(|| format!("failed to list {}", from.display()))? {
        let entry = entry?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_tree(&src, &dst)?;
        } else {
            log_debug!("copy {} -> {}", src.display(), dst.display());
            fs::copy(&src, &dst)
                .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/* ---- Prompting ---- */

/// Ask for a non-negative integer; empty input keeps `default`.
/// Invalid input is reported and asked again until a value or EOF.
pub fn prompt_number<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    default: u64,
) -> Result<u64> {
    loop {
        write!(output, "{label} ({default}): ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("input closed while prompting for {label}");
        }
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<i64>() {
            Ok(n) if n >= 0 => return Ok(n as u64),
            Ok(_) => writeln!(output, "  The number can not be negative!")?,
            Err(_) => writeln!(output, "  '{answer}' is not a number")?,
        }
    }
}

/// Prompt for width / height / fps and rewrite the file (tab indented).
pub fn prompt_game_configuration<R: BufRead, W: Write>(
    path: &Path,
    input: &mut R,
    output: &mut W,
) -> Result<GameConfiguration> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut config: GameConfiguration =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;

    config.width = prompt_number(input, output, "width", config.width)?;
    config.height = prompt_number(input, output, "height", config.height)?;
    config.fps = Some(prompt_number(
        input,
        output,
        "fps",
        config.fps.unwrap_or(DEFAULT_FPS),
    )?);

    write_tab_indented(path, &config)?;
    Ok(config)
}

fn write_tab_indented(path: &Path, value: &impl Serialize) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).context("failed to serialize game.json")?;
    buf.push(b'\n');
    fs::write(path, buf).with_context(|| format!("failed to write {}", path.display()))
}

/* ---- Whole flow ---- */

pub struct GenerateOptions<'a> {
    pub package: &'a str,
    pub install: bool,
    pub npm: &'a str,
    pub target_dir: PathBuf,
}

pub fn generate<R: BufRead, W: Write>(
    opts: &GenerateOptions<'_>,
    input: &mut R,
    output: &mut W,
) -> Result<GameConfiguration> {
    if opts.install {
        crate::npm::install(opts.npm, opts.package, true)?;
    }
    let package_dir = crate::npm::root(opts.npm, true)?.join(opts.package);
    generate_from(&package_dir, &opts.target_dir, input, output)
}

/// Copy + prompt, given an already located template package.
pub fn generate_from<R: BufRead, W: Write>(
    package_dir: &Path,
    target_dir: &Path,
    input: &mut R,
    output: &mut W,
) -> Result<GameConfiguration> {
    let template = Template::read(package_dir)?;
    let copied = copy_tree(&package_dir.join(&template.path), target_dir)?;
    log_info!("copied {copied} file(s) into {}", target_dir.display());
    prompt_game_configuration(&target_dir.join(&template.game_json), input, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn template_package(root: &Path) -> PathBuf {
        let pkg = root.join("node_modules/@akashic/template-javascript");
        fs::create_dir_all(pkg.join("files/script")).unwrap();
        fs::write(
            pkg.join("template.json"),
            r#"{"path":"files","gameJson":"game.json"}"#,
        )
        .unwrap();
        fs::write(
            pkg.join("files/game.json"),
            r#"{"width":320,"height":240,"main":"./script/main.js","assets":{"main":{"type":"script","path":"script/main.js"}}}"#,
        )
        .unwrap();
        fs::write(pkg.join("files/script/main.js"), "module.exports = {};\n").unwrap();
        pkg
    }

    #[test]
    fn template_descriptor_uses_camel_case_key() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = template_package(tmp.path());
        let t = Template::read(&pkg).unwrap();
        assert_eq!(t.path, "files");
        assert_eq!(t.game_json, "game.json");
    }

    #[test]
    fn prompt_accepts_default_and_reprompts_on_bad_input() {
        let mut input = Cursor::new("\n-5\nabc\n60\n");
        let mut out = Vec::new();
        assert_eq!(prompt_number(&mut input, &mut out, "width", 320).unwrap(), 320);
        assert_eq!(prompt_number(&mut input, &mut out, "fps", 30).unwrap(), 60);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("width (320): "));
        assert!(shown.contains("can not be negative"));
        assert!(shown.contains("'abc' is not a number"));
    }

    #[test]
    fn prompt_fails_on_eof() {
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        assert!(prompt_number(&mut input, &mut out, "height", 240).is_err());
    }

    #[test]
    fn generate_copies_tree_and_rewrites_game_json() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = template_package(tmp.path());
        let target = tmp.path().join("mygame");

        let mut input = Cursor::new("640\n\n\n");
        let mut out = Vec::new();
        let config = generate_from(&pkg, &target, &mut input, &mut out).unwrap();

        assert_eq!(config.width, 640);
        assert_eq!(config.height, 240);
        assert_eq!(config.fps, Some(DEFAULT_FPS));
        assert!(target.join("script/main.js").is_file());

        let written = fs::read_to_string(target.join("game.json")).unwrap();
        assert!(written.contains("\t\"width\": 640"), "tab indent: {written}");
        let reparsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed["fps"], 30);
        assert_eq!(reparsed["main"], "./script/main.js");
        assert_eq!(reparsed["assets"]["main"]["type"], "script");
    }

    #[test]
    fn copy_tree_rejects_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(copy_tree(&tmp.path().join("nope"), &tmp.path().join("out")).is_err());
    }
}
