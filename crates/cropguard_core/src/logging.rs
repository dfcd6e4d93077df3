//! Tracing subscriber setup driven by the `[logging]` config section.
//!
//! Interactive runs log to stderr only. Unattended runs (cron jobs, pipes)
//! also append to a daily file under `<data_dir>/logs`, with stderr reduced
//! to warnings so scripted output stays readable.
//!
//! Filter directives are resolved in this order:
//! 1. `--log-filter` on the command line
//! 2. `[logging] filter` in the config file
//! 3. `CROPGUARD_LOG`, then `RUST_LOG`
//! 4. [`default_log_filter`]

use crate::config::AppConfig;

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before RUST_LOG.
pub const LOG_ENV: &str = "CROPGUARD_LOG";

const LOG_FILE_PREFIX: &str = "cropguard";

type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Where log output goes and how much of it.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Directory for the rolling log file
    pub log_dir: PathBuf,
    /// Also write to `log_dir`; off for interactive terminals
    pub to_file: bool,
    /// Explicit filter directives from the CLI or config file
    pub filter: Option<String>,
}

impl LogConfig {
    /// Build from the application config.
    pub fn for_app(config: &AppConfig, data_dir: &Path) -> Self {
        let logging = &config.logging;
        let interactive = atty::is(atty::Stream::Stdout);
        Self {
            log_dir: logging.dir.clone().unwrap_or_else(|| log_dir(data_dir)),
            to_file: !interactive && !logging.console_only,
            filter: logging.filter.clone(),
        }
    }

    /// Replace the configured filter when the command line supplies one.
    pub fn with_cli_filter(mut self, filter: Option<String>) -> Self {
        if filter.is_some() {
            self.filter = filter;
        }
        self
    }

    /// Filter directives that will be installed.
    pub fn directives(&self) -> String {
        resolve_directives(self.filter.as_deref(), |name| std::env::var(name).ok())
    }
}

/// Flushes buffered file output when dropped; hold it until exit.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// A file sink that cannot be opened is reported on stderr and logging
/// continues on the console.
pub fn init_logging(config: LogConfig) -> LoggingGuard {
    let directives = config.directives();

    if config.to_file {
        match init_with_file(&config.log_dir, &directives) {
            Ok(guard) => return LoggingGuard { _file: Some(guard) },
            Err(e) => eprintln!(
                "Warning: cannot log to {}: {e}. Logging to the console only.",
                config.log_dir.display()
            ),
        }
    }

    init_console(&directives);
    LoggingGuard { _file: None }
}

fn init_console(directives: &str) {
    // already installed (tests, embedding) is fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_with_file(dir: &Path, directives: &str) -> Result<WorkerGuard, InitError> {
    let (file, guard) = file_writer(dir)?;
    let writer = std::io::stderr.with_max_level(tracing::Level::WARN).and(file);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()?;

    Ok(guard)
}

fn file_writer(dir: &Path) -> Result<(NonBlocking, WorkerGuard), InitError> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Pick the first usable directive string. Unparseable values are skipped.
fn resolve_directives(explicit: Option<&str>, env: impl Fn(&str) -> Option<String>) -> String {
    let from_env = [LOG_ENV, "RUST_LOG"].into_iter().filter_map(|name| env(name));
    explicit
        .map(String::from)
        .into_iter()
        .chain(from_env)
        .find(|d| !d.trim().is_empty() && EnvFilter::try_new(d).is_ok())
        .unwrap_or_else(|| default_log_filter().to_string())
}

/// Default directives for this build type.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,cropguard=debug,cropguard_core=debug,hyper=warn,reqwest=warn"
    } else {
        "warn,cropguard=info,cropguard_core=info,hyper=warn,reqwest=warn"
    }
}

/// Log directory under the given data directory.
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(default_log_filter()).is_ok());
    }

    #[test]
    fn test_explicit_filter_beats_environment() {
        let env = env_of(&[(LOG_ENV, "warn"), ("RUST_LOG", "error")]);
        assert_eq!(resolve_directives(Some("trace"), &env), "trace");
        assert_eq!(resolve_directives(None, &env), "warn");
    }

    #[test]
    fn test_rust_log_used_when_own_variable_unset() {
        let env = env_of(&[("RUST_LOG", "cropguard_core=trace")]);
        assert_eq!(resolve_directives(None, &env), "cropguard_core=trace");
    }

    #[test]
    fn test_invalid_directives_are_skipped() {
        let env = env_of(&[(LOG_ENV, "cropguard=notalevel")]);
        assert_eq!(resolve_directives(Some("cropguard_core=loud"), &env), default_log_filter());
        assert_eq!(resolve_directives(Some("  "), env_of(&[])), default_log_filter());
    }

    #[test]
    fn test_config_section_drives_log_config() {
        let config = AppConfig {
            logging: LoggingConfig {
                filter: Some("debug".to_string()),
                dir: Some(PathBuf::from("/var/log/cropguard")),
                console_only: true,
            },
            ..Default::default()
        };
        let log = LogConfig::for_app(&config, Path::new("/srv/cropguard"));
        assert_eq!(log.log_dir, PathBuf::from("/var/log/cropguard"));
        assert!(!log.to_file);
        assert_eq!(log.filter.as_deref(), Some("debug"));

        let log = log.with_cli_filter(Some("trace".to_string()));
        assert_eq!(log.filter.as_deref(), Some("trace"));
        let log = log.with_cli_filter(None);
        assert_eq!(log.filter.as_deref(), Some("trace"));
    }

    #[test]
    fn test_log_dir_defaults_under_data_dir() {
        let log = LogConfig::for_app(&AppConfig::default(), Path::new("/var/lib/cropguard"));
        assert_eq!(log.log_dir, PathBuf::from("/var/lib/cropguard/logs"));
        assert_eq!(log.filter, None);
    }

    #[test]
    fn test_file_writer_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("logs");
        let (_writer, guard) = file_writer(&nested).unwrap();
        assert!(nested.is_dir());
        drop(guard);
    }
}
