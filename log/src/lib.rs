//! Logging setup for the shortcut crates: a log file plus optional console output.
//!
//! The file always receives `warn` and above, more when a filter is set in the environment.
//! Console logging goes to stderr, keeping stdout for command output. It is used when the
//! caller allows it and `SHORTCUT_LOG` or `RUST_LOG` is set, or in debug builds. Interactive
//! terminal sessions turn it off so log lines don't land in the middle of the screen.
//!
//! ## Environment Variables
//!
//! 1. **`SHORTCUT_LOG`** (highest priority) - a bare level such as `debug` applies to the
//!    shortcut crates; anything with directive syntax is used verbatim
//! 2. **`RUST_LOG`** - standard tracing filter
//! 3. **Default** - `warn` globally, `info` for the shortcut crates
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/shortcut/logs/shortcut-<pid>.log`
//! - macOS: `~/Library/Application Support/shortcut/logs/shortcut-12345.log`
//! - Linux: `~/.local/share/shortcut/logs/shortcut-12345.log`
//!
//! Override with `--log-file <path>` or `SHORTCUT_LOG_FILE`. A path with an extension names
//! the file; anything else is treated as a directory.

use std::{
    env,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Crates that a bare `SHORTCUT_LOG` level applies to.
const CRATES: &[&str] = &["shortcut", "shortcut_bin"];

/// Returned from [`init`]; must be held alive to ensure log file flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub log_file_path: Option<PathBuf>,
    /// Allow the stderr layer. Off for raw-mode terminal sessions.
    pub console: bool,
}

/// Initialize logging.
///
/// The returned [`LogGuard`] must be held for the lifetime of the program; dropping it
/// flushes and stops the background file writer.
///
/// Fails if a global subscriber is already installed.
pub fn init(config: LogConfig) -> Result<LogGuard, BoxError> {
    let (log_dir, filename) = resolve_log_path(config.log_file_path);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_file_filter());

    let console = (config.console && (env_filter_set() || cfg!(debug_assertions)))
        .then(|| console_layer(std::io::stderr, create_filter()));

    Registry::default()
        .with(console)
        .with(file_layer)
        .try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

fn console_layer<W>(make_writer: W, filter: EnvFilter) -> impl Layer<Registry>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer().with_writer(make_writer).with_filter(filter)
}

/// Initialize logging for tests.
///
/// Stdout only, through the test writer. Safe to call from every test.
pub fn test() {
    let _ = fmt::fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

fn env_filter_set() -> bool {
    env::var("SHORTCUT_LOG").is_ok() || env::var("RUST_LOG").is_ok()
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("shortcut-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir.to_path_buf(), name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shortcut")
        .join("logs");
    (dir, filename)
}

fn create_file_filter() -> EnvFilter {
    if env_filter_set() {
        return create_filter();
    }
    EnvFilter::new("warn")
}

/// `SHORTCUT_LOG` > `RUST_LOG` > defaults.
fn create_filter() -> EnvFilter {
    EnvFilter::new(filter_directives(
        env::var("SHORTCUT_LOG").ok().as_deref(),
        env::var("RUST_LOG").ok().as_deref(),
    ))
}

fn filter_directives(shortcut_log: Option<&str>, rust_log: Option<&str>) -> String {
    match (shortcut_log, rust_log) {
        (Some(value), _) => expand_shortcut_log(value),
        (None, Some(value)) => value.to_owned(),
        (None, None) => expand_shortcut_log("info"),
    }
}

/// `SHORTCUT_LOG=debug` becomes `warn,shortcut=debug,shortcut_bin=debug`. Values with
/// directive syntax (`=`, `:` or `,`) pass through unchanged.
fn expand_shortcut_log(value: &str) -> String {
    if value.contains(['=', ':', ',']) {
        return value.to_owned();
    }

    let mut directives = String::from("warn");
    for name in CRATES {
        directives.push(',');
        directives.push_str(name);
        directives.push('=');
        directives.push_str(value);
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn console_layer_writes_only_to_its_writer() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = Registry::default().with(console_layer(
            move || writer.clone(),
            EnvFilter::new(filter_directives(None, None)),
        ));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "shortcut_bin", "running action");
            tracing::debug!(target: "shortcut_bin", "too detailed");
        });

        let text = captured.text();
        assert!(text.contains("running action"));
        assert!(!text.contains("too detailed"));
    }

    #[test]
    fn default_filter_is_info_for_our_crates() {
        assert_eq!(
            filter_directives(None, None),
            "warn,shortcut=info,shortcut_bin=info"
        );
    }

    #[test]
    fn shortcut_log_wins_over_rust_log() {
        assert_eq!(
            filter_directives(Some("trace"), Some("error")),
            "warn,shortcut=trace,shortcut_bin=trace"
        );
        assert_eq!(filter_directives(None, Some("error")), "error");
    }

    #[test]
    fn directive_syntax_is_kept_verbatim() {
        assert_eq!(expand_shortcut_log("shortcut=debug"), "shortcut=debug");
        assert_eq!(expand_shortcut_log("warn,shortcut_bin=trace"), "warn,shortcut_bin=trace");
    }

    #[test]
    fn override_with_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let (log_dir, name) = resolve_log_path(Some(dir.path().join("session.log")));
        assert_eq!(log_dir, dir.path());
        assert_eq!(name, "session.log");
    }

    #[test]
    fn override_with_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (log_dir, name) = resolve_log_path(Some(dir.path().join("logs")));
        assert_eq!(log_dir, dir.path().join("logs"));
        assert_eq!(name, format!("shortcut-{}.log", std::process::id()));
    }

    #[test]
    fn bare_file_name_lands_in_current_directory() {
        let (log_dir, name) = resolve_log_path(Some(PathBuf::from("out.log")));
        assert_eq!(log_dir, Path::new("."));
        assert_eq!(name, "out.log");
    }

    #[test]
    fn default_location_uses_pid() {
        let (log_dir, name) = resolve_log_path(None);
        assert!(log_dir.ends_with("shortcut/logs"));
        assert!(name.starts_with("shortcut-"));
    }
}
