//! Format detection and the chapter parsing entry points.

use std::path::Path;

use crate::ebml::Element;
use crate::uid::UidAllocator;

use super::cue::{parse_cue, probe_cue};
use super::error::{ChapterError, ChapterResult};
use super::options::{ChapterFormat, ErrorMode, ParseOptions};
use super::simple::{parse_simple, probe_simple};
use super::text::TextSource;
use super::timeframe::select_in_timeframe;
use super::xml::{parse_chapters_xml, probe_xml};

/// Result of parsing a chapter source.
#[derive(Debug, Clone)]
pub struct ParsedChapters {
    /// Format the source was recognized as.
    pub format: ChapterFormat,
    /// Chapters, or `None` if nothing was left after timeframe selection.
    pub chapters: Option<Element>,
    /// Tags created alongside the chapters (cue sheets only).
    pub tags: Option<Element>,
}

/// Detect the chapter format of `text`.
///
/// Simple chapters are tried first, then cue sheets, then XML.
pub fn detect_format(text: &str) -> Option<ChapterFormat> {
    if probe_simple(text) {
        Some(ChapterFormat::Simple)
    } else if probe_cue(text) {
        Some(ChapterFormat::Cue)
    } else if probe_xml(text) {
        Some(ChapterFormat::Xml)
    } else {
        None
    }
}

/// Open and parse a chapter file.
///
/// See [`parse`] for details. A file that can't be opened is reported
/// according to `mode` as well.
pub fn parse_file(
    path: &Path,
    options: &ParseOptions,
    registry: &mut impl UidAllocator,
    mode: ErrorMode,
) -> ChapterResult<ParsedChapters> {
    let source = match TextSource::open(path) {
        Ok(source) => source,
        Err(e) => {
            tracing::debug!("Opening '{}' failed: {}", path.display(), e);
            let message = format!("Could not open '{}' for reading.", path.display());
            return Err(fail(message, mode));
        }
    };

    parse(&source, options, registry, mode)
}

/// Detect the format of `source` and parse it.
///
/// XML chapters go through [`select_in_timeframe`] with the timeframe
/// and offset from `options`; the simple and cue parsers apply them
/// while parsing. Every failure is turned into a single
/// [`ChapterError::Parser`] with a descriptive message, or logged
/// before exiting the process when `mode` is [`ErrorMode::Exit`].
pub fn parse(
    source: &TextSource,
    options: &ParseOptions,
    registry: &mut impl UidAllocator,
    mode: ErrorMode,
) -> ChapterResult<ParsedChapters> {
    match parse_inner(source, options, registry) {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(fail(boundary_message(source.name(), &e), mode)),
    }
}

fn parse_inner(
    source: &TextSource,
    options: &ParseOptions,
    registry: &mut impl UidAllocator,
) -> ChapterResult<ParsedChapters> {
    let text = source.decode(options.charset.as_deref());

    let format = detect_format(&text)
        .ok_or_else(|| ChapterError::UnknownFormat(source.name().to_string()))?;
    tracing::debug!("Chapter source '{}' detected as {:?}", source.name(), format);

    let (chapters, tags) = match format {
        ChapterFormat::Simple => (parse_simple(&text, options, registry)?, None),
        ChapterFormat::Cue => match parse_cue(&text, options, registry)? {
            Some(cue) => (Some(cue.chapters), Some(cue.tags)),
            None => (None, None),
        },
        ChapterFormat::Xml => {
            let mut chapters = parse_chapters_xml(&text, registry)?;
            let accepted =
                select_in_timeframe(&mut chapters, options.min_ts, options.max_ts, options.offset);
            (accepted.then_some(chapters), None)
        }
    };

    Ok(ParsedChapters {
        format,
        chapters,
        tags,
    })
}

fn boundary_message(name: &str, error: &ChapterError) -> String {
    match error {
        ChapterError::Io(_) => format!("The XML chapter file '{}' could not be read.", name),
        ChapterError::Xml {
            message,
            position: Some(pos),
        } => format!(
            "The XML chapter file '{}' contains an error at position {}: {}",
            name, pos, message
        ),
        ChapterError::Xml {
            message,
            position: None,
        } => format!("The XML chapter file '{}' contains an error: {}", name, message),
        other => other.to_string(),
    }
}

fn fail(message: String, mode: ErrorMode) -> ChapterError {
    match mode {
        ErrorMode::Propagate => ChapterError::Parser(message),
        ErrorMode::Exit => {
            tracing::error!("{}", message);
            std::process::exit(2);
        }
    }
}
