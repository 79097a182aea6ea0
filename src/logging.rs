//! Structured logging: human-readable stderr output plus optional JSONL file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use shortcut_scope::logging;
//!
//! // Keep the guard alive for the duration of the program
//! let _guard = logging::init(logging::LogOptions::default());
//!
//! tracing::info!(category = "REPLAY", "Replay started");
//! ```
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2026-01-12T10:30:45.123Z","level":"INFO","target":"shortcut_scope::shortcuts::engine","fields":{"message":"Shortcut fired","shortcut_id":"save"}}
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Options for [`init`].
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Write JSONL records to this file in addition to stderr
    pub json_file: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset (default: "info")
    pub default_filter: Option<String>,
}

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize stderr logging and, when requested, the JSONL file layer.
pub fn init(options: LogOptions) -> LoggingGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(options.default_filter.as_deref().unwrap_or("info"))
    });

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let mut file_guard = None;
    let json_layer = options.json_file.as_ref().and_then(|path| {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("[LOGGING] Failed to create log directory: {}", e);
            }
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let (non_blocking_file, guard) = tracing_appender::non_blocking(file);
                file_guard = Some(guard);
                Some(
                    fmt::layer()
                        .json()
                        .with_writer(non_blocking_file)
                        .with_timer(fmt::time::UtcTime::new(format_description!(
                            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
                        )))
                        .with_target(true)
                        .with_level(true)
                        .with_file(false)
                        .with_line_number(false)
                        .with_span_events(FmtSpan::NONE)
                        .boxed(),
                )
            }
            Err(e) => {
                eprintln!("[LOGGING] Failed to open log file {}: {}", path.display(), e);
                None
            }
        }
    });

    // try_init so repeated initialization (tests, embedding hosts) is harmless
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init();

    if let Some(path) = &options.json_file {
        tracing::info!(
            category = "LOGGING",
            log_path = %path.display(),
            "JSONL logging initialized"
        );
    }

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Default JSONL log location (~/.shortcut-scope/logs/shortcut-scope.jsonl)
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".shortcut-scope").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("shortcut-scope-logs"))
        .join("shortcut-scope.jsonl")
}

/// Diagnostic sink owned by one manager.
///
/// Mirrors the manager's `silent` construction flag: when silent, nothing is
/// emitted. Everything else goes through `tracing` under the `SHORTCUTS`
/// category.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    silent: bool,
}

impl Logger {
    pub fn new(silent: bool) -> Self {
        Self { silent }
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn log(&self, message: &str) {
        if !self.silent {
            tracing::info!(category = "SHORTCUTS", "{}", message);
        }
    }

    pub fn warn(&self, message: &str) {
        if !self.silent {
            tracing::warn!(category = "SHORTCUTS", "{}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if !self.silent {
            tracing::error!(category = "SHORTCUTS", "{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path_file_name() {
        let path = default_log_path();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("shortcut-scope.jsonl")
        );
    }

    #[test]
    fn test_logger_silent_flag() {
        assert!(Logger::new(true).is_silent());
        assert!(!Logger::default().is_silent());
        // Emitting with no subscriber installed must not panic
        Logger::new(false).warn("no subscriber");
    }
}
