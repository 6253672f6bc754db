//! Chapter parsing and chapter tree algorithms.
//!
//! This module provides:
//! - Format detection and parsers for simple (`CHAPTERxx=`) chapters,
//!   cue sheets and Matroska chapter XML
//! - BOM detection and charset conversion for text sources
//! - Timeframe selection, UID-based merging and cross-tree moves
//! - UID alignment and regeneration
//! - Timestamp rescaling, atom counting and name templates
//! - Country code normalization
//!
//! # Example
//!
//! ```no_run
//! use mkvedit_core::chapters::{self, ErrorMode, ParseOptions, TextSource};
//! use mkvedit_core::uid::UidRegistry;
//!
//! let source = TextSource::open("chapters.txt".as_ref()).unwrap();
//! let options = ParseOptions::default().with_language("ger");
//! let mut registry = UidRegistry::new();
//!
//! let parsed = chapters::parse(&source, &options, &mut registry, ErrorMode::Propagate).unwrap();
//! if let Some(mut tree) = parsed.chapters {
//!     chapters::merge_entries(&mut tree);
//!     println!("{}", chapters::to_xml(&tree));
//! }
//! ```

mod adjust;
mod atom;
mod country;
mod cue;
mod error;
mod merge;
mod name_template;
mod options;
mod parse;
mod simple;
mod text;
mod timeframe;
mod uids;
mod xml;

pub use adjust::{adjust_timestamps, count_atoms};
pub use atom::{
    find_chapter_with_uid, find_edition_with_uid, find_edition_with_uid_mut, get_end, get_name,
    get_start, get_uid,
};
pub use country::{fix_country_codes, BuiltinCountryCodes, CountryCodeMapper};
pub use cue::{parse_cue, probe_cue, CueChapters};
pub use error::{ChapterError, ChapterResult, TextPosition};
pub use merge::{merge_entries, move_by_edition};
pub use name_template::{format_name_template, format_timestamp, DEFAULT_NAME_TEMPLATE};
pub use options::{
    ChapterDefaults, ChapterFormat, ErrorMode, ParseOptions, DEFAULT_CUE_NAME_FORMAT,
};
pub use parse::{detect_format, parse, parse_file, ParsedChapters};
pub use simple::{parse_simple, probe_simple};
pub use text::{ByteOrderMark, Charset, TextSource};
pub use timeframe::select_in_timeframe;
pub use uids::{align_uids, align_uids_with_reference, regenerate_uids, UidMapping};
pub use xml::{
    format_timestamp_ns, parse_chapters_xml, parse_tags_xml, parse_timestamp_ns, probe_xml, to_xml,
};
