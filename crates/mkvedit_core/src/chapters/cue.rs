//! Cue sheet chapter parser.
//!
//! Every `TRACK` of a cue sheet becomes one chapter starting at its
//! `INDEX 01` position. Alongside the chapters a tag tree is built that
//! carries the album data and the per-track title, performer and number.

use crate::ebml::{ids, Element};
use crate::uid::{UidAllocator, UidNamespace};

use super::error::{ChapterError, ChapterResult};
use super::name_template::format_name_template;
use super::options::ParseOptions;

const PROBE_KEYWORDS: &[&str] = &["performer ", "title ", "file ", "catalog ", "rem "];

/// Cue sheet frames per second.
const FRAMES_PER_SECOND: i64 = 75;

/// Target type values for the generated tags.
const TARGET_TYPE_ALBUM: u64 = 50;
const TARGET_TYPE_TRACK: u64 = 30;

/// Chapters and companion tags parsed from a cue sheet.
#[derive(Debug, Clone)]
pub struct CueChapters {
    pub chapters: Element,
    pub tags: Element,
}

/// Check whether the first non-empty line starts with a cue keyword.
pub fn probe_cue(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| {
            let lower = line.to_ascii_lowercase();
            PROBE_KEYWORDS.iter().any(|kw| lower.starts_with(kw))
        })
        .unwrap_or(false)
}

#[derive(Debug, Default)]
struct CueTrack {
    number: u32,
    title: String,
    performer: String,
    index00: Option<i64>,
    index01: Option<i64>,
}

impl CueTrack {
    fn start(&self) -> Option<i64> {
        self.index01.or(self.index00)
    }
}

#[derive(Debug, Default)]
struct CueSheet {
    title: String,
    performer: String,
    catalog: String,
    date: String,
    genre: String,
    comment: String,
    file: String,
    tracks: Vec<CueTrack>,
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

fn cue_error(line: usize, message: impl Into<String>) -> ChapterError {
    ChapterError::InvalidCue {
        line,
        message: message.into(),
    }
}

/// Parse `mm:ss:ff` into nanoseconds.
fn parse_cue_time(value: &str) -> Option<i64> {
    let mut parts = value.trim().split(':');
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = parts.next()?.parse().ok()?;
    let frames: i64 = parts.next()?.parse().ok()?;
    if parts.next().is_some()
        || minutes < 0
        || !(0..=59).contains(&seconds)
        || !(0..FRAMES_PER_SECOND).contains(&frames)
    {
        return None;
    }
    minutes
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1_000_000_000)?
        .checked_add(frames * 1_000_000_000 / FRAMES_PER_SECOND)
}

fn read_sheet(text: &str) -> ChapterResult<CueSheet> {
    let mut sheet = CueSheet::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let keyword = keyword.to_ascii_uppercase();
        let rest = rest.trim();

        match keyword.as_str() {
            "TRACK" => {
                let number = rest
                    .split_whitespace()
                    .next()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| cue_error(line_no, format!("Invalid TRACK line '{}'", line)))?;
                sheet.tracks.push(CueTrack {
                    number,
                    ..CueTrack::default()
                });
            }
            "INDEX" => {
                let mut fields = rest.split_whitespace();
                let index: u32 = fields
                    .next()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| cue_error(line_no, format!("Invalid INDEX line '{}'", line)))?;
                let time = fields
                    .next()
                    .and_then(parse_cue_time)
                    .ok_or_else(|| cue_error(line_no, format!("Invalid INDEX time in '{}'", line)))?;
                let track = sheet
                    .tracks
                    .last_mut()
                    .ok_or_else(|| cue_error(line_no, "INDEX found before any TRACK"))?;
                match index {
                    0 => track.index00 = Some(time),
                    1 => track.index01 = Some(time),
                    _ => {}
                }
            }
            "TITLE" => match sheet.tracks.last_mut() {
                Some(track) => track.title = unquote(rest),
                None => sheet.title = unquote(rest),
            },
            "PERFORMER" => match sheet.tracks.last_mut() {
                Some(track) => track.performer = unquote(rest),
                None => sheet.performer = unquote(rest),
            },
            "CATALOG" => sheet.catalog = unquote(rest),
            "FILE" => {
                // FILE "name.flac" WAVE
                let name = match rest.strip_prefix('"') {
                    Some(quoted) => quoted.split('"').next().unwrap_or(""),
                    None => rest.split_whitespace().next().unwrap_or(""),
                };
                sheet.file = name.to_string();
            }
            "REM" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                match field.to_ascii_uppercase().as_str() {
                    "DATE" => sheet.date = unquote(value),
                    "GENRE" => sheet.genre = unquote(value),
                    "COMMENT" => sheet.comment = unquote(value),
                    _ => {}
                }
            }
            _ => tracing::trace!("Ignoring cue line {}: {}", line_no, line),
        }
    }

    Ok(sheet)
}

/// Expand a cue chapter name format.
///
/// `%p` is the performer (falling back to the album performer), `%t` the
/// title, `%n` the track number and `%N` the track number padded to two
/// digits.
fn format_cue_name(format: &str, sheet: &CueSheet, track: &CueTrack) -> String {
    let performer = if track.performer.is_empty() {
        &sheet.performer
    } else {
        &track.performer
    };

    let mut out = String::new();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('p') => out.push_str(performer),
            Some('t') => out.push_str(&track.title),
            Some('n') => out.push_str(&track.number.to_string()),
            Some('N') => out.push_str(&format!("{:02}", track.number)),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }

    let trimmed = out.trim();
    if trimmed == "-" {
        String::new()
    } else {
        trimmed.to_string()
    }
}

fn simple_tag(name: &str, value: &str) -> Element {
    Element::master_with(
        ids::SIMPLE_TAG,
        vec![
            Element::utf8(ids::TAG_NAME, name),
            Element::utf8(ids::TAG_STRING, value),
            Element::utf8(ids::TAG_LANGUAGE, "und"),
        ],
    )
}

fn push_simple_tag(tag: &mut Element, name: &str, value: &str) {
    if !value.is_empty() {
        tag.push(simple_tag(name, value));
    }
}

fn album_tag(sheet: &CueSheet) -> Element {
    let mut tag = Element::master_with(
        ids::TAG,
        vec![Element::master_with(
            ids::TAG_TARGETS,
            vec![Element::unsigned(ids::TAG_TARGET_TYPE_VALUE, TARGET_TYPE_ALBUM)],
        )],
    );
    push_simple_tag(&mut tag, "TITLE", &sheet.title);
    push_simple_tag(&mut tag, "ARTIST", &sheet.performer);
    push_simple_tag(&mut tag, "CATALOG_NUMBER", &sheet.catalog);
    push_simple_tag(&mut tag, "DATE_RELEASED", &sheet.date);
    push_simple_tag(&mut tag, "GENRE", &sheet.genre);
    push_simple_tag(&mut tag, "COMMENT", &sheet.comment);
    push_simple_tag(&mut tag, "TOTAL_PARTS", &sheet.tracks.len().to_string());
    tag
}

fn track_tag(track: &CueTrack, chapter_uid: u64) -> Element {
    let mut tag = Element::master_with(
        ids::TAG,
        vec![Element::master_with(
            ids::TAG_TARGETS,
            vec![
                Element::unsigned(ids::TAG_TARGET_TYPE_VALUE, TARGET_TYPE_TRACK),
                Element::unsigned(ids::TAG_CHAPTER_UID, chapter_uid),
            ],
        )],
    );
    push_simple_tag(&mut tag, "TITLE", &track.title);
    push_simple_tag(&mut tag, "ARTIST", &track.performer);
    push_simple_tag(&mut tag, "PART_NUMBER", &track.number.to_string());
    tag
}

/// Parse a cue sheet into chapters plus companion tags.
///
/// Tracks starting outside the `options` timeframe are skipped; the
/// offset is subtracted from the kept starts. Names come from the
/// defaults' cue name format and fall back to the name template when
/// the format yields nothing.
///
/// # Returns
///
/// `None` if no track lies inside the window.
pub fn parse_cue(
    text: &str,
    options: &ParseOptions,
    registry: &mut impl UidAllocator,
) -> ChapterResult<Option<CueChapters>> {
    let sheet = read_sheet(text)?;
    let language = options.language();
    let country = options.defaults.country();

    let mut edition = Element::master(ids::EDITION_ENTRY);
    let mut tags = Element::master(ids::TAGS);
    tags.push(album_tag(&sheet));
    let mut num = 0usize;

    for track in &sheet.tracks {
        let Some(start) = track.start() else {
            tracing::warn!("Cue track {} has no INDEX line, skipping", track.number);
            continue;
        };

        let in_window = options.min_ts.map_or(true, |min| start >= min)
            && options.max_ts.map_or(true, |max| start <= max);
        if !in_window {
            continue;
        }

        let mut name = format_cue_name(&options.defaults.cue_name_format, &sheet, track);
        if name.is_empty() {
            name = format_name_template(&options.defaults.name_template, num + 1, start, &sheet.file);
        }

        let uid = registry.allocate(UidNamespace::Chapter);

        let mut display = Element::master(ids::CHAPTER_DISPLAY);
        display.push(Element::utf8(ids::CHAPTER_STRING, name));
        display.push(Element::utf8(ids::CHAPTER_LANGUAGE, language.as_str()));
        if let Some(country) = country {
            display.push(Element::utf8(ids::CHAPTER_COUNTRY, country));
        }

        edition.push(Element::master_with(
            ids::CHAPTER_ATOM,
            vec![
                Element::unsigned(ids::CHAPTER_UID, uid),
                Element::unsigned(
                    ids::CHAPTER_TIME_START,
                    start.saturating_sub(options.offset).max(0) as u64,
                ),
                display,
            ],
        ));
        tags.push(track_tag(track, uid));
        num += 1;
    }

    tracing::debug!(
        "Cue sheet parser kept {} of {} track(s)",
        num,
        sheet.tracks.len()
    );

    if num == 0 {
        return Ok(None);
    }

    Ok(Some(CueChapters {
        chapters: Element::master_with(ids::CHAPTERS, vec![edition]),
        tags,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::atom::{get_name, get_start, get_uid};
    use crate::uid::UidRegistry;

    const SHEET: &str = r#"REM GENRE Rock
REM DATE 1999
PERFORMER "The Band"
TITLE "Greatest Hits"
FILE "album.flac" WAVE
  TRACK 01 AUDIO
    TITLE "Opening"
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    TITLE "Second"
    PERFORMER "Guest"
    INDEX 00 03:58:00
    INDEX 01 04:00:37
  TRACK 03 AUDIO
    INDEX 01 08:10:00
"#;

    fn simple_tag_value<'a>(tag: &'a Element, name: &str) -> Option<&'a str> {
        tag.children_of(ids::SIMPLE_TAG)
            .find(|s| s.child_str(ids::TAG_NAME) == Some(name))
            .and_then(|s| s.child_str(ids::TAG_STRING))
    }

    #[test]
    fn probe_checks_first_line() {
        assert!(probe_cue(SHEET));
        assert!(probe_cue("\n  title \"x\""));
        assert!(!probe_cue("CHAPTER01=00:00:00.000"));
        assert!(!probe_cue("<Chapters>"));
        assert!(!probe_cue(""));
    }

    #[test]
    fn parses_tracks_into_chapters() {
        let mut registry = UidRegistry::new();
        let parsed = parse_cue(SHEET, &ParseOptions::default(), &mut registry)
            .unwrap()
            .unwrap();

        let edition = &parsed.chapters.children()[0];
        let atoms: Vec<_> = edition.children_of(ids::CHAPTER_ATOM).collect();
        assert_eq!(atoms.len(), 3);

        assert_eq!(get_name(atoms[0]), "The Band - Opening");
        assert_eq!(get_name(atoms[1]), "Guest - Second");
        // no title: falls back to the performer only
        assert_eq!(get_name(atoms[2]), "The Band -");

        assert_eq!(get_start(atoms[0]), Some(0));
        // 4:00 plus 37 frames
        assert_eq!(get_start(atoms[1]), Some(240_000_000_000 + 493_333_333));
        assert_eq!(get_start(atoms[2]), Some(490_000_000_000));
    }

    #[test]
    fn builds_companion_tags() {
        let mut registry = UidRegistry::new();
        let parsed = parse_cue(SHEET, &ParseOptions::default(), &mut registry)
            .unwrap()
            .unwrap();

        let tags: Vec<_> = parsed.tags.children_of(ids::TAG).collect();
        assert_eq!(tags.len(), 4);

        let album = tags[0];
        assert_eq!(simple_tag_value(album, "TITLE"), Some("Greatest Hits"));
        assert_eq!(simple_tag_value(album, "GENRE"), Some("Rock"));
        assert_eq!(simple_tag_value(album, "DATE_RELEASED"), Some("1999"));

        let first_atom = parsed.chapters.children()[0]
            .find_child(ids::CHAPTER_ATOM)
            .unwrap();
        let targets = tags[1].find_child(ids::TAG_TARGETS).unwrap();
        assert_eq!(targets.child_u64(ids::TAG_CHAPTER_UID), get_uid(first_atom));
        assert_eq!(targets.child_u64(ids::TAG_TARGET_TYPE_VALUE), Some(30));
        assert_eq!(simple_tag_value(tags[1], "PART_NUMBER"), Some("1"));
        assert_eq!(simple_tag_value(tags[2], "ARTIST"), Some("Guest"));
    }

    #[test]
    fn empty_format_uses_name_template() {
        let mut options = ParseOptions::default();
        options.defaults.cue_name_format = "%t".into();
        options.defaults.name_template = "<FILE_NAME> <NUM:2>".into();
        let mut registry = UidRegistry::new();
        let parsed = parse_cue(SHEET, &options, &mut registry).unwrap().unwrap();

        let atoms: Vec<_> = parsed.chapters.children()[0]
            .children_of(ids::CHAPTER_ATOM)
            .collect();
        assert_eq!(get_name(atoms[0]), "Opening");
        assert_eq!(get_name(atoms[2]), "album 03");
    }

    #[test]
    fn timeframe_filters_tracks() {
        let options = ParseOptions::default()
            .with_timeframe(Some(60_000_000_000), None)
            .with_offset(60_000_000_000);
        let mut registry = UidRegistry::new();
        let parsed = parse_cue(SHEET, &options, &mut registry).unwrap().unwrap();

        let atoms: Vec<_> = parsed.chapters.children()[0]
            .children_of(ids::CHAPTER_ATOM)
            .collect();
        assert_eq!(atoms.len(), 2);
        assert_eq!(get_start(atoms[1]), Some(430_000_000_000));
        // album tag plus one per kept track
        assert_eq!(parsed.tags.len(), 3);
    }

    #[test]
    fn bad_index_is_an_error() {
        let mut registry = UidRegistry::new();
        let err = parse_cue(
            "TITLE x\nTRACK 01 AUDIO\nINDEX 01 00:99:00\n",
            &ParseOptions::default(),
            &mut registry,
        )
        .unwrap_err();
        assert!(matches!(err, ChapterError::InvalidCue { line: 3, .. }));
    }

    #[test]
    fn oversized_index_minutes_are_an_error() {
        assert_eq!(parse_cue_time("153722868:00:00"), None);
        assert_eq!(parse_cue_time("-1:00:00"), None);
        assert_eq!(parse_cue_time("01:02:37"), Some(62_493_333_333));

        let mut registry = UidRegistry::new();
        let err = parse_cue(
            "TITLE x\nTRACK 01 AUDIO\nINDEX 01 99999999999:00:00\n",
            &ParseOptions::default(),
            &mut registry,
        )
        .unwrap_err();
        assert!(matches!(err, ChapterError::InvalidCue { line: 3, .. }));
    }
}
