//! Configuration management.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use mkvedit_core::config::{ConfigManager, ConfigSection};
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/mkvedit.toml");
//! config.load_or_create().unwrap();
//!
//! // Session defaults for the chapter parsers
//! let options = config.settings().chapters.parse_options();
//!
//! // Modify a setting and save just that section atomically
//! config.settings_mut().statistics.no_variable_data = true;
//! config.update_section(ConfigSection::Statistics).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{ChapterSettings, ConfigSection, LoggingSettings, Settings, StatisticsSettings};
