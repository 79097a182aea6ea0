//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Scope every stack starts with; never popped
pub const DEFAULT_SCOPE: &str = "global";

/// Maximum gap between keys of a sequential shortcut (milliseconds)
pub const DEFAULT_SEQUENCE_DELAY_MS: u64 = 1000;

/// Diagnostics are emitted unless a config asks for silence
pub const DEFAULT_SILENT: bool = false;
