//! Simple chapter format parser.
//!
//! The format consists of line pairs:
//!
//! ```text
//! CHAPTER01=00:00:00.000
//! CHAPTER01NAME=Intro
//! ```
//!
//! Blank lines are ignored. Either `.` or `,` separates seconds from
//! milliseconds.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::ebml::{ids, Element};
use crate::uid::{UidAllocator, UidNamespace};

use super::error::{ChapterError, ChapterResult};
use super::name_template::format_name_template;
use super::options::ParseOptions;

static TIMESTAMP_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*CHAPTER\d+\s*=\s*(\d+)\s*:\s*(\d+)\s*:\s*(\d+)\s*[\.,]\s*(\d+)")
        .expect("valid regex")
});
static NAME_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*CHAPTER\d+NAME\s*=(.*)").expect("valid regex"));

const NS_PER_MS: i64 = 1_000_000;

/// Captures of `re` only if it matches the whole line.
fn full_match<'t>(re: &Regex, line: &'t str) -> Option<Captures<'t>> {
    re.captures(line)
        .filter(|caps| caps.get(0).is_some_and(|m| m.end() == line.len()))
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Check whether `text` starts with a timestamp line followed by a name
/// line (blank lines in between are fine).
pub fn probe_simple(text: &str) -> bool {
    let mut lines = non_empty_lines(text);
    match lines.next() {
        Some(first) if TIMESTAMP_LINE_RE.is_match(first) => {
            lines.next().is_some_and(|line| NAME_LINE_RE.is_match(line))
        }
        _ => false,
    }
}

fn number(caps: &Captures<'_>, idx: usize) -> Option<i64> {
    caps.get(idx).and_then(|m| m.as_str().parse().ok())
}

/// Milliseconds of `h:m:s.ms`, or `None` on overflow.
fn line_timestamp_ms(hour: i64, minute: i64, second: i64, msecs: i64) -> Option<i64> {
    hour.checked_mul(60 * 60 * 1000)?
        .checked_add(minute * 60 * 1000)?
        .checked_add(second * 1000)?
        .checked_add(msecs)
}

/// Parse simple chapters.
///
/// Line timestamps have millisecond precision, so the window bounds and
/// the offset from `options` are truncated to milliseconds before use.
/// Kept chapters get a fresh chapter UID from `registry`. Unnamed
/// chapters are named from the defaults' name template, numbered by the
/// count of chapters kept so far.
///
/// # Returns
///
/// `None` if no chapter lies inside the window.
pub fn parse_simple(
    text: &str,
    options: &ParseOptions,
    registry: &mut impl UidAllocator,
) -> ChapterResult<Option<Element>> {
    let min_ts = options.min_ts.map(|ts| ts / NS_PER_MS);
    let max_ts = options.max_ts.map(|ts| ts / NS_PER_MS);
    let offset = options.offset / NS_PER_MS;

    let language = options.language();
    let country = options.defaults.country();

    let mut edition = Element::master(ids::EDITION_ENTRY);
    let mut expect_name = false;
    let mut num = 0usize;
    let mut start = 0i64;
    let mut timestamp_line = "";

    for line in non_empty_lines(text) {
        if !expect_name {
            let invalid = || ChapterError::InvalidLine(line.to_string());
            let caps = full_match(&TIMESTAMP_LINE_RE, line).ok_or_else(invalid)?;

            let hour = number(&caps, 1).ok_or_else(invalid)?;
            let minute = number(&caps, 2).ok_or_else(invalid)?;
            let second = number(&caps, 3).ok_or_else(invalid)?;
            let msecs = number(&caps, 4).ok_or_else(invalid)?;

            if minute > 59 {
                return Err(ChapterError::InvalidMinute(minute));
            }
            if second > 59 {
                return Err(ChapterError::InvalidSecond(second));
            }

            start = line_timestamp_ms(hour, minute, second, msecs)
                .filter(|ms| ms.checked_mul(NS_PER_MS).is_some())
                .ok_or_else(invalid)?;
            timestamp_line = line;
            expect_name = true;
            continue;
        }

        let caps = full_match(&NAME_LINE_RE, line)
            .ok_or_else(|| ChapterError::InvalidNameLine(line.to_string()))?;
        expect_name = false;

        let mut name = caps.get(1).map_or("", |m| m.as_str()).to_string();
        if name.is_empty() {
            name = format_name_template(
                &options.defaults.name_template,
                num + 1,
                start * NS_PER_MS,
                "",
            );
        }

        let in_window =
            min_ts.map_or(true, |min| start >= min) && max_ts.map_or(true, |max| start <= max);
        if !in_window {
            tracing::trace!("Simple chapter at {} ms outside the timeframe", start);
            continue;
        }

        let mut display = Element::master(ids::CHAPTER_DISPLAY);
        display.push(Element::utf8(ids::CHAPTER_STRING, name));
        display.push(Element::utf8(ids::CHAPTER_LANGUAGE, language.as_str()));
        if let Some(country) = country {
            display.push(Element::utf8(ids::CHAPTER_COUNTRY, country));
        }

        let stored_start = start
            .checked_sub(offset)
            .and_then(|ms| ms.checked_mul(NS_PER_MS))
            .ok_or_else(|| ChapterError::InvalidLine(timestamp_line.to_string()))?
            .max(0) as u64;
        edition.push(Element::master_with(
            ids::CHAPTER_ATOM,
            vec![
                Element::unsigned(ids::CHAPTER_UID, registry.allocate(UidNamespace::Chapter)),
                Element::unsigned(ids::CHAPTER_TIME_START, stored_start),
                display,
            ],
        ));
        num += 1;
    }

    tracing::debug!("Simple chapter parser kept {} chapter(s)", num);

    if num == 0 {
        return Ok(None);
    }
    Ok(Some(Element::master_with(ids::CHAPTERS, vec![edition])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::atom::{get_name, get_start, get_uid};
    use crate::chapters::options::ChapterDefaults;
    use crate::uid::UidRegistry;

    const SCENARIO_A: &str =
        "CHAPTER01=00:01:30.000\nCHAPTER01NAME=Intro\nCHAPTER02=00:05:00.000\nCHAPTER02NAME=";

    fn atoms(chapters: &Element) -> Vec<&Element> {
        chapters.children()[0].children_of(ids::CHAPTER_ATOM).collect()
    }

    fn language(atom: &Element) -> Option<&str> {
        atom.find_child(ids::CHAPTER_DISPLAY)?
            .child_str(ids::CHAPTER_LANGUAGE)
    }

    #[test]
    fn probe_requires_timestamp_then_name() {
        assert!(probe_simple(SCENARIO_A));
        assert!(probe_simple("\n\n  CHAPTER1=0:0:1,5\n\nCHAPTER1NAME=x\n"));
        assert!(!probe_simple("CHAPTER01NAME=x\nCHAPTER01=00:00:00.000"));
        assert!(!probe_simple("CHAPTER01=00:00:00.000"));
        assert!(!probe_simple("<Chapters/>"));
    }

    #[test]
    fn scenario_a_generates_missing_name() {
        let mut registry = UidRegistry::new();
        let chapters = parse_simple(SCENARIO_A, &ParseOptions::default(), &mut registry)
            .unwrap()
            .unwrap();

        let atoms = atoms(&chapters);
        assert_eq!(atoms.len(), 2);
        assert_eq!(get_name(atoms[0]), "Intro");
        assert_eq!(get_name(atoms[1]), "Chapter 02");
        assert_eq!(get_start(atoms[0]), Some(90_000_000_000));
        assert_eq!(get_start(atoms[1]), Some(300_000_000_000));
        assert!(atoms.iter().all(|a| language(a) == Some("eng")));
        assert_ne!(get_uid(atoms[0]), get_uid(atoms[1]));
    }

    #[test]
    fn invalid_lines_are_reported() {
        let mut registry = UidRegistry::new();
        let options = ParseOptions::default();

        let err = parse_simple("CHAPTER01=00:61:00.000\nCHAPTER01NAME=x", &options, &mut registry)
            .unwrap_err();
        assert!(matches!(err, ChapterError::InvalidMinute(61)));

        let err = parse_simple("CHAPTER01=00:00:60.000\nCHAPTER01NAME=x", &options, &mut registry)
            .unwrap_err();
        assert!(matches!(err, ChapterError::InvalidSecond(60)));

        let err = parse_simple("CHAPTER01=00:00:10.000 junk", &options, &mut registry)
            .unwrap_err();
        assert!(matches!(err, ChapterError::InvalidLine(_)));

        let err = parse_simple("CHAPTER01=00:00:10.000\nNAME=x", &options, &mut registry)
            .unwrap_err();
        assert!(matches!(err, ChapterError::InvalidNameLine(_)));
    }

    #[test]
    fn timeframe_and_offset() {
        let text = "CHAPTER01=00:00:10.000\nCHAPTER01NAME=\n\
                    CHAPTER02=00:00:20.000\nCHAPTER02NAME=\n\
                    CHAPTER03=00:00:30.000\nCHAPTER03NAME=";
        let options = ParseOptions::default()
            .with_timeframe(Some(15_000_000_000), Some(30_000_000_000))
            .with_offset(5_000_000_000);
        let mut registry = UidRegistry::new();
        let chapters = parse_simple(text, &options, &mut registry).unwrap().unwrap();

        let atoms = atoms(&chapters);
        assert_eq!(atoms.len(), 2);
        assert_eq!(get_start(atoms[0]), Some(15_000_000_000));
        assert_eq!(get_start(atoms[1]), Some(25_000_000_000));
        // numbering follows kept chapters
        assert_eq!(get_name(atoms[0]), "Chapter 01");
        assert_eq!(get_name(atoms[1]), "Chapter 02");
    }

    #[test]
    fn nothing_in_window_gives_none() {
        let options = ParseOptions::default().with_timeframe(Some(3_600_000_000_000), None);
        let mut registry = UidRegistry::new();
        assert!(parse_simple(SCENARIO_A, &options, &mut registry).unwrap().is_none());
    }

    #[test]
    fn defaults_apply_language_and_country() {
        let defaults = ChapterDefaults {
            language: Some("ger".into()),
            country: Some("de".into()),
            name_template: "Kapitel <NUM>".into(),
            ..ChapterDefaults::default()
        };
        let options = ParseOptions::default().with_defaults(defaults);
        let mut registry = UidRegistry::new();
        let chapters = parse_simple(SCENARIO_A, &options, &mut registry).unwrap().unwrap();

        let atoms = atoms(&chapters);
        assert_eq!(language(atoms[0]), Some("ger"));
        assert_eq!(get_name(atoms[1]), "Kapitel 2");
        let display = atoms[0].find_child(ids::CHAPTER_DISPLAY).unwrap();
        assert_eq!(display.child_str(ids::CHAPTER_COUNTRY), Some("de"));

        let options = options.with_language("fre");
        let chapters = parse_simple(SCENARIO_A, &options, &mut registry).unwrap().unwrap();
        assert_eq!(language(atoms_of_first(&chapters)), Some("fre"));
    }

    #[test]
    fn oversized_hours_are_rejected() {
        let mut registry = UidRegistry::new();
        let options = ParseOptions::default();

        // fits in milliseconds but not in nanoseconds
        let err = parse_simple(
            "CHAPTER01=3000000:00:00.000\nCHAPTER01NAME=x",
            &options,
            &mut registry,
        )
        .unwrap_err();
        assert!(matches!(err, ChapterError::InvalidLine(ref l) if l.starts_with("CHAPTER01=")));

        let err = parse_simple(
            "CHAPTER01=9000000000000000:00:00.000\nCHAPTER01NAME=x",
            &options,
            &mut registry,
        )
        .unwrap_err();
        assert!(matches!(err, ChapterError::InvalidLine(_)));

        let err = parse_simple(
            "CHAPTER01=99999999999999999999:00:00.000\nCHAPTER01NAME=x",
            &options,
            &mut registry,
        )
        .unwrap_err();
        assert!(matches!(err, ChapterError::InvalidLine(_)));
    }

    #[test]
    fn largest_hours_still_parse() {
        let mut registry = UidRegistry::new();
        let chapters = parse_simple(
            "CHAPTER01=2000000:00:00.000\nCHAPTER01NAME=x",
            &ParseOptions::default(),
            &mut registry,
        )
        .unwrap()
        .unwrap();
        assert_eq!(get_start(atoms(&chapters)[0]), Some(7_200_000_000_000_000_000));
    }

    fn atoms_of_first(chapters: &Element) -> &Element {
        atoms(chapters)[0]
    }
}
