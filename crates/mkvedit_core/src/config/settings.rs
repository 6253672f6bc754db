//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::chapters::{ChapterDefaults, ParseOptions, DEFAULT_CUE_NAME_FORMAT, DEFAULT_NAME_TEMPLATE};
use crate::logging::{LogLevel, ProgressReporter};
use crate::tags::WritingInfo;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Chapter parsing defaults.
    #[serde(default)]
    pub chapters: ChapterSettings,

    /// Track statistics tag settings.
    #[serde(default)]
    pub statistics: StatisticsSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Defaults applied when parsing chapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterSettings {
    /// Language for chapters that don't specify one (empty means `eng`).
    #[serde(default)]
    pub default_language: String,

    /// Country added to generated chapter displays (empty for none).
    #[serde(default)]
    pub default_country: String,

    /// Template for unnamed chapters.
    #[serde(default = "default_name_template")]
    pub name_template: String,

    /// Charset of text chapter files without a BOM (empty means UTF-8).
    #[serde(default)]
    pub charset: String,

    /// Name format for cue sheet tracks.
    #[serde(default = "default_cue_name_format")]
    pub cue_name_format: String,
}

fn default_name_template() -> String {
    DEFAULT_NAME_TEMPLATE.to_string()
}

fn default_cue_name_format() -> String {
    DEFAULT_CUE_NAME_FORMAT.to_string()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

impl Default for ChapterSettings {
    fn default() -> Self {
        Self {
            default_language: String::new(),
            default_country: String::new(),
            name_template: default_name_template(),
            charset: String::new(),
            cue_name_format: default_cue_name_format(),
        }
    }
}

impl ChapterSettings {
    /// Session defaults for the chapter parsers.
    pub fn defaults(&self) -> ChapterDefaults {
        ChapterDefaults {
            language: non_empty(&self.default_language),
            country: non_empty(&self.default_country),
            name_template: self.name_template.clone(),
            cue_name_format: self.cue_name_format.clone(),
        }
    }

    /// Parse options carrying these defaults and the configured charset.
    pub fn parse_options(&self) -> ParseOptions {
        let options = ParseOptions::default().with_defaults(self.defaults());
        match non_empty(&self.charset) {
            Some(charset) => options.with_charset(charset),
            None => options,
        }
    }
}

/// Track statistics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsSettings {
    /// Write reproducible output (placeholder app, no date).
    #[serde(default)]
    pub no_variable_data: bool,

    /// Writing application stamped on statistics tags.
    #[serde(default = "default_writing_app")]
    pub writing_app: String,
}

fn default_writing_app() -> String {
    format!("mkvedit v{}", crate::version())
}

impl Default for StatisticsSettings {
    fn default() -> Self {
        Self {
            no_variable_data: false,
            writing_app: default_writing_app(),
        }
    }
}

impl StatisticsSettings {
    pub fn writing_info(&self) -> WritingInfo {
        WritingInfo::new(self.writing_app.clone(), self.no_variable_data)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            progress_step: default_progress_step(),
        }
    }
}

impl LoggingSettings {
    pub fn progress_reporter(&self) -> ProgressReporter {
        ProgressReporter::new(self.progress_step)
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Chapters,
    Statistics,
    Logging,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Chapters => "chapters",
            ConfigSection::Statistics => "statistics",
            ConfigSection::Logging => "logging",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[chapters]"));
        assert!(toml.contains("[statistics]"));
        assert!(toml.contains("[logging]"));
        assert!(toml.contains("name_template"));
    }

    #[test]
    fn settings_round_trip() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.chapters.name_template, settings.chapters.name_template);
        assert_eq!(parsed.logging.level, settings.logging.level);
        assert_eq!(parsed.statistics.writing_app, settings.statistics.writing_app);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[chapters]\ndefault_language = \"ger\"\n\n[logging]\nlevel = \"debug\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        // Custom values preserved
        assert_eq!(parsed.chapters.default_language, "ger");
        assert_eq!(parsed.logging.level, LogLevel::Debug);
        // Defaults applied for missing
        assert_eq!(parsed.chapters.cue_name_format, "%p - %t");
        assert_eq!(parsed.logging.progress_step, 20);
        assert!(!parsed.statistics.no_variable_data);
    }

    #[test]
    fn chapter_defaults_treat_empty_as_unset() {
        let mut settings = ChapterSettings::default();
        assert_eq!(settings.defaults().language, None);
        assert_eq!(settings.defaults().resolve_language(None), "eng");

        settings.default_language = "fre".into();
        settings.default_country = "fr".into();
        let defaults = settings.defaults();
        assert_eq!(defaults.resolve_language(None), "fre");
        assert_eq!(defaults.country(), Some("fr"));
    }

    #[test]
    fn charset_flows_into_parse_options() {
        let mut settings = ChapterSettings::default();
        assert_eq!(settings.parse_options().charset, None);

        settings.charset = "windows-1252".into();
        let options = settings.parse_options();
        assert_eq!(options.charset.as_deref(), Some("windows-1252"));
        assert_eq!(options.defaults.name_template, DEFAULT_NAME_TEMPLATE);
    }

    #[test]
    fn statistics_writing_info() {
        let mut settings = StatisticsSettings::default();
        assert!(settings.writing_info().date.is_some());

        settings.no_variable_data = true;
        let info = settings.writing_info();
        assert_eq!(info.app, crate::tags::NO_VARIABLE_DATA_APP);
        assert!(info.date.is_none());
    }
}
