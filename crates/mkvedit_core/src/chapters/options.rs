//! Parse options and session defaults.

use serde::{Deserialize, Serialize};

use super::name_template::DEFAULT_NAME_TEMPLATE;

/// Default cue sheet chapter name format (`%p` performer, `%t` title).
pub const DEFAULT_CUE_NAME_FORMAT: &str = "%p - %t";

/// Session-wide defaults applied to parsed chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDefaults {
    /// Language for entries that don't specify one. `None` means `eng`.
    pub language: Option<String>,
    /// Country added to every generated display.
    pub country: Option<String>,
    /// Template for unnamed chapters.
    pub name_template: String,
    /// Name format for cue sheet tracks.
    pub cue_name_format: String,
}

impl Default for ChapterDefaults {
    fn default() -> Self {
        Self {
            language: None,
            country: None,
            name_template: DEFAULT_NAME_TEMPLATE.to_string(),
            cue_name_format: DEFAULT_CUE_NAME_FORMAT.to_string(),
        }
    }
}

impl ChapterDefaults {
    /// Pick the language: explicit argument, then the default, then `eng`.
    pub fn resolve_language(&self, explicit: Option<&str>) -> String {
        explicit
            .filter(|l| !l.is_empty())
            .or(self.language.as_deref().filter(|l| !l.is_empty()))
            .unwrap_or("eng")
            .to_string()
    }

    /// Default country, if a non-empty one is configured.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref().filter(|c| !c.is_empty())
    }
}

/// Options for [`parse`](super::parse).
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Drop chapters starting before this timestamp (ns).
    pub min_ts: Option<i64>,
    /// Drop chapters starting after this timestamp (ns). `None` is unbounded.
    pub max_ts: Option<i64>,
    /// Subtracted from every kept timestamp (ns).
    pub offset: i64,
    /// Language for entries without one.
    pub language: Option<String>,
    /// Charset of sources without a byte-order mark.
    pub charset: Option<String>,
    /// Session defaults.
    pub defaults: ChapterDefaults,
}

impl ParseOptions {
    pub fn with_timeframe(mut self, min_ts: Option<i64>, max_ts: Option<i64>) -> Self {
        self.min_ts = min_ts;
        self.max_ts = max_ts;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_defaults(mut self, defaults: ChapterDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Language resolved against the session defaults.
    pub fn language(&self) -> String {
        self.defaults.resolve_language(self.language.as_deref())
    }
}

/// Recognized chapter source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChapterFormat {
    /// `CHAPTERxx=` / `CHAPTERxxNAME=` line pairs.
    Simple,
    /// Cue sheet.
    Cue,
    /// Matroska chapter XML.
    Xml,
}

/// What to do with errors at the parsing boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Log the error and exit the process with status 2.
    Exit,
}
