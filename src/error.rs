use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// Error severity, used to decide how loudly a failure is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning, // recoverable, operation skipped
    Error,   // operation failed
    Fatal,   // construction cannot proceed
}

/// Domain-specific errors for shortcut management
#[derive(Error, Debug)]
pub enum ShortcutError {
    #[error("no key event source is available; use headless mode outside a host environment")]
    EventSourceUnavailable,

    #[error("key event source failed: {0}")]
    EventSource(String),

    #[error("binding contains no keys")]
    EmptyBinding,

    #[error("handler for shortcut '{shortcut_id}' failed: {message}")]
    Handler { shortcut_id: String, message: String },

    #[error("failed to parse config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ShortcutError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EventSourceUnavailable => ErrorSeverity::Fatal,
            Self::EventSource(_) => ErrorSeverity::Error,
            Self::EmptyBinding => ErrorSeverity::Warning,
            Self::Handler { .. } => ErrorSeverity::Error,
            Self::Config { .. } => ErrorSeverity::Warning,
            Self::Io { .. } => ErrorSeverity::Warning,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShortcutError>;

/// Extension trait for logging a failure with caller location and continuing.
///
/// # Examples
///
/// ```ignore
/// use shortcut_scope::error::ResultExt;
///
/// // Fall back to defaults if the keymap file is unreadable
/// let config = try_load_config(&path).warn_on_err().unwrap_or_default();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = %err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = %err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(
            ShortcutError::EventSourceUnavailable.severity(),
            ErrorSeverity::Fatal
        );
        assert_eq!(ShortcutError::EmptyBinding.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_handler_error_message() {
        let err = ShortcutError::Handler {
            shortcut_id: "save".to_string(),
            message: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "handler for shortcut 'save' failed: disk full");
    }

    #[test]
    fn test_result_ext_returns_none_on_err() {
        let ok: std::result::Result<u8, ShortcutError> = Ok(3);
        assert_eq!(ok.log_err(), Some(3));

        let err: std::result::Result<u8, ShortcutError> = Err(ShortcutError::EmptyBinding);
        assert_eq!(err.warn_on_err(), None);
    }
}
