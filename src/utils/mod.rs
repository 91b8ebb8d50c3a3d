//! Utilities: logging (dynamic level, stderr only) and a small semantic version type.
//!
//! Key items:
//!   init_logging / derive_level
//!   log_error! / log_warn! / log_info! / log_debug! / log_trace!
//!   Version (parse + ordering for registry dist-tags and release tags)

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Logging helpers.
///
/// Everything is written to stderr: stdout is handed to delegated helpers
/// and must carry nothing but their output.
pub mod logging {
    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Warn = 1,
        Info = 2,
        Debug = 3,
        Trace = 4,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "ERROR",
                LogLevel::Warn => "WARN",
                LogLevel::Info => "INFO",
                LogLevel::Debug => "DEBUG",
                LogLevel::Trace => "TRACE",
            }
        }
    }

    static GLOBAL_LEVEL: OnceLock<AtomicU8> = OnceLock::new();

    fn inner_cell() -> &'static AtomicU8 {
        GLOBAL_LEVEL.get_or_init(|| AtomicU8::new(LogLevel::Warn as u8))
    }

    pub fn init_logging(level: LogLevel) {
        set_log_level(level);
    }

    pub fn set_log_level(level: LogLevel) {
        inner_cell().store(level as u8, Ordering::Relaxed);
    }

    pub fn current_log_level() -> LogLevel {
        match inner_cell().load(Ordering::Relaxed) {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Default is Warn: a dispatcher should stay silent around its helper.
    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    fn timestamp() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
    }

    fn should_emit(level: LogLevel) -> bool {
        level <= current_log_level()
    }

    pub fn log(level: LogLevel, msg: impl AsRef<str>) {
        if should_emit(level) {
            eprintln!("[{}][{}] {}", level.as_str(), timestamp(), msg.as_ref());
        }
    }

    pub fn error(msg: impl AsRef<str>) {
        log(LogLevel::Error, msg);
    }
    pub fn warn(msg: impl AsRef<str>) {
        log(LogLevel::Warn, msg);
    }
    pub fn info(msg: impl AsRef<str>) {
        log(LogLevel::Info, msg);
    }
    pub fn debug(msg: impl AsRef<str>) {
        log(LogLevel::Debug, msg);
    }
    pub fn trace(msg: impl AsRef<str>) {
        log(LogLevel::Trace, msg);
    }

    #[macro_export]
    macro_rules! log_error {
        ($($t:tt)*) => { $crate::utils::logging::error(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_warn {
        ($($t:tt)*) => { $crate::utils::logging::warn(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_info {
        ($($t:tt)*) => { $crate::utils::logging::info(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_debug {
        ($($t:tt)*) => { $crate::utils::logging::debug(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_trace {
        ($($t:tt)*) => { $crate::utils::logging::trace(format!($($t)*)) };
    }
}

pub use logging::{derive_level, init_logging};

/// Semantic versions as published by npm dist-tags and GitHub release tags.
pub mod version {
    use anyhow::{Context, Result, bail};
    use std::cmp::Ordering;
    use std::fmt;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Version {
        pub major: u64,
        pub minor: u64,
        pub patch: u64,
        /// Dot-separated prerelease identifiers (`1.0.0-beta.2` -> ["beta", "2"]).
        pub pre: Vec<String>,
    }

    impl Version {
        /// Parse `major.minor.patch[-pre][+build]`, tolerating a leading `v`.
        /// Build metadata is accepted and discarded.
        pub fn parse(raw: &str) -> Result<Self> {
            let trimmed = raw.trim();
            let s = trimmed.strip_prefix('v').unwrap_or(trimmed);
            let s = s.split_once('+').map(|(core, _)| core).unwrap_or(s);
            let (core, pre) = match s.split_once('-') {
                Some((core, pre)) => (core, Some(pre)),
                None => (s, None),
            };

            let nums: Vec<&str> = core.split('.').collect();
            if nums.len() != 3 {
                bail!("invalid version '{raw}': expected major.minor.patch");
            }
            let field = |idx: usize, what: &str| -> Result<u64> {
                nums[idx]
                    .parse::<u64>()
                    .with_context(|| format!("invalid {what} component in version '{raw}'"))
            };

            let pre = match pre {
                Some(p) if p.is_empty() => bail!("invalid version '{raw}': empty prerelease"),
                Some(p) => p.split('.').map(str::to_string).collect(),
                None => Vec::new(),
            };

            Ok(Version {
                major: field(0, "major")?,
                minor: field(1, "minor")?,
                patch: field(2, "patch")?,
                pre,
            })
        }
    }

    impl Ord for Version {
        fn cmp(&self, other: &Self) -> Ordering {
            (self.major, self.minor, self.patch)
                .cmp(&(other.major, other.minor, other.patch))
                .then_with(|| compare_pre(&self.pre, &other.pre))
        }
    }

    impl PartialOrd for Version {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    // A release outranks any of its prereleases; numeric identifiers sort
    // below alphanumeric ones.
    fn compare_pre(a: &[String], b: &[String]) -> Ordering {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        for (x, y) in a.iter().zip(b.iter()) {
            let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                (Ok(nx), Ok(ny)) => nx.cmp(&ny),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => x.cmp(y),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.len().cmp(&b.len())
    }

    impl fmt::Display for Version {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
            if !self.pre.is_empty() {
                write!(f, "-{}", self.pre.join("."))?;
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::Version;

        #[test]
        fn parse_plain_and_prefixed() {
            let v = Version::parse("1.2.3").unwrap();
            assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
            assert_eq!(Version::parse("v1.2.3").unwrap(), v);
            assert_eq!(Version::parse("1.2.3+build.7").unwrap(), v);
        }

        #[test]
        fn parse_rejects_garbage() {
            assert!(Version::parse("1.2").is_err());
            assert!(Version::parse("one.two.three").is_err());
            assert!(Version::parse("1.2.3-").is_err());
        }

        #[test]
        fn ordering_follows_semver_precedence() {
            let p = |s: &str| Version::parse(s).unwrap();
            assert!(p("0.1.0") < p("0.1.1"));
            assert!(p("0.9.9") < p("1.0.0"));
            assert!(p("1.0.0-alpha") < p("1.0.0"));
            assert!(p("1.0.0-alpha") < p("1.0.0-alpha.1"));
            assert!(p("1.0.0-alpha.2") < p("1.0.0-alpha.10"));
            assert!(p("1.0.0-2") < p("1.0.0-beta"));
            assert_eq!(p("v2.0.0").cmp(&p("2.0.0")), std::cmp::Ordering::Equal);
        }

        #[test]
        fn display_round_trips_core_and_pre() {
            assert_eq!(Version::parse("v1.4.0-rc.1").unwrap().to_string(), "1.4.0-rc.1");
        }
    }
}
