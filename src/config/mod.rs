//! Configuration module - keymap files and defaults
//!
//! This module provides functionality for:
//! - Default values shared by the scope stack and the matching engine
//! - Type definitions for declarative keymap files (JSON)
//! - Loading keymap files from disk
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, ScopeConfig, ShortcutConfig)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_SCOPE, DEFAULT_SEQUENCE_DELAY_MS, DEFAULT_SILENT};

pub use types::{Config, KeysConfig, ScopeConfig, ShortcutConfig};

pub use loader::{load_config, try_load_config};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
