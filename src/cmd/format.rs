/*!
format.rs

Human-output helpers for `akashic` built-ins (never used on a delegated
helper's streams).

  - StyleOptions::detect() / for_stderr() : color + emoji decisions
      color off when NO_COLOR is set or the stream is not a terminal,
      emoji off when NO_EMOJI is set, width from COLUMNS (40..=220, default 100)
  - color(role, text, &style)
  - emoji(tag, &style) / marked(tag, role, text, &style)
  - table(headers, rows, TableOpts, &style)
*/

use std::borrow::Cow;
use std::io::IsTerminal;

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    /// Style for stdout.
    pub fn detect() -> Self {
        Self::with_terminal(std::io::stdout().is_terminal())
    }

    /// Style for stderr (error reports).
    pub fn for_stderr() -> Self {
        Self::with_terminal(std::io::stderr().is_terminal())
    }

    /// No color, no emoji: stable text for tests and pipes.
    pub fn plain() -> Self {
        Self {
            use_color: false,
            use_emoji: false,
            term_width: 100,
        }
    }

    fn with_terminal(is_tty: bool) -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some();
        let no_emoji = std::env::var_os("NO_EMOJI").is_some();

        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color: is_tty && !no_color,
            use_emoji: is_tty && !no_emoji,
            term_width: width,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color / Emoji                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Accent,
    Success,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",  // cyan-ish
        Role::Accent => "38;5;213",  // magenta/pink
        Role::Success => "38;5;82",  // green
        Role::Error => "38;5;196",   // red
        Role::Dim => "2",            // faint
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/// Emoji prefix, or "" when disabled. Prefer `marked` for whole lines.
pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "list" => "📜",
        _ => "",
    }
}

/// `"<emoji> <colored text>"`, or just the colored text when emoji are off.
pub fn marked(tag: &str, role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    let body = color(role, text, style);
    match emoji(tag, style) {
        "" => body,
        marker => format!("{marker} {body}"),
    }
}

/* -------------------------------------------------------------------------- */
/* Table Rendering                                                            */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct TableOpts {
    /// 0 -> style.term_width
    pub max_width: usize,
    pub header_sep: bool,
    pub min_col_width: usize,
}

impl Default for TableOpts {
    fn default() -> Self {
        Self {
            max_width: 0,
            header_sep: true,
            min_col_width: 4,
        }
    }
}

/// Left-aligned columns separated by two spaces. Widest columns shrink first
/// (with an ellipsis) when the table would exceed the width limit.
pub fn table(
    headers: &[&str],
    rows: &[Vec<String>],
    opts: TableOpts,
    style: &StyleOptions,
) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let limit = match opts.max_width {
        0 => style.term_width,
        w => w.min(style.term_width),
    };

    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }
    shrink_to_fit(&mut widths, limit, opts.min_col_width);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(
        headers
            .iter()
            .enumerate()
            .map(|(i, h)| color(Role::Accent, fit(h, widths[i]), style))
            .collect::<Vec<_>>()
            .join("  "),
    );
    if opts.header_sep {
        let sep = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(color(Role::Dim, sep, style));
    }
    for row in rows {
        let line = (0..cols)
            .map(|c| fit(row.get(c).map(String::as_str).unwrap_or(""), widths[c]))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

fn shrink_to_fit(widths: &mut [usize], limit: usize, min_col: usize) {
    let gaps = widths.len().saturating_sub(1) * 2;
    let total: usize = widths.iter().sum::<usize>() + gaps;
    if total <= limit {
        return;
    }
    let mut overflow = total - limit;
    let mut order: Vec<usize> = (0..widths.len()).collect();
    order.sort_by(|a, b| widths[*b].cmp(&widths[*a]));
    for idx in order {
        if overflow == 0 {
            break;
        }
        if widths[idx] > min_col {
            let cut = (widths[idx] - min_col).min(overflow);
            widths[idx] -= cut;
            overflow -= cut;
        }
    }
}

/// Pad to `width`, or truncate with an ellipsis. ANSI sequences don't count.
fn fit(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len <= width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    if width == 0 {
        return String::new();
    }
    let plain = strip_ansi(s);
    let mut out: String = plain.chars().take(width - 1).collect();
    out.push('…');
    out
}

/* -------------------------------------------------------------------------- */
/* ANSI / Width Utilities                                                     */
/* -------------------------------------------------------------------------- */

fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // CSI runs until the first ASCII letter
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_style_is_uncolored() {
        let style = StyleOptions::plain();
        assert_eq!(color(Role::Error, "boom", &style), "boom");
        assert_eq!(emoji("success", &style), "");
    }

    #[test]
    fn marked_has_no_leading_space_without_emoji() {
        let style = StyleOptions::plain();
        assert_eq!(marked("success", Role::Success, "installed x", &style), "installed x");

        let fancy = StyleOptions {
            use_color: false,
            use_emoji: true,
            term_width: 100,
        };
        assert_eq!(marked("success", Role::Success, "installed x", &fancy), "✔ installed x");
    }

    #[test]
    fn table_aligns_columns() {
        let t = table(
            &["PACKAGE", "ACTION"],
            &[
                vec!["a".into(), "upgraded".into()],
                vec!["longer-name".into(), "up to date".into()],
            ],
            TableOpts::default(),
            &StyleOptions::plain(),
        );
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines[0], "PACKAGE      ACTION    ");
        assert_eq!(lines[1], "-----------  ----------");
        assert_eq!(lines[2], "a            upgraded");
        assert_eq!(lines[3], "longer-name  up to date");
    }

    #[test]
    fn table_truncates_when_too_wide() {
        let opts = TableOpts {
            max_width: 12,
            ..TableOpts::default()
        };
        let t = table(
            &["A", "B"],
            &[vec!["abcdefghij".into(), "xy".into()]],
            opts,
            &StyleOptions::plain(),
        );
        let row = t.lines().nth(2).unwrap();
        assert!(row.contains('…'), "expected ellipsis in {row:?}");
        assert!(display_width(row) <= 12);
    }

    #[test]
    fn strip_ansi_removes_csi() {
        assert_eq!(strip_ansi("\x1b[38;5;196mRED\x1b[0m"), "RED");
        assert_eq!(display_width("\x1b[2mab\x1b[0m"), 2);
    }
}
