//! Element schema table.
//!
//! Maps element ids to their XML names, value kinds, allowed parents and
//! default values. The XML converter, the WebM filter and the
//! default-element constructor all read from this single table.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::element::{Element, Value};
use super::ids::{self, ElementId};

/// Kind of payload an element carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Master,
    Unsigned,
    Signed,
    Utf8,
    /// Unsigned nanoseconds, rendered as `HH:MM:SS.nnnnnnnnn` in XML.
    Timestamp,
    Binary,
}

/// Default value declared by the schema.
#[derive(Debug, Clone, Copy)]
pub enum SchemaDefault {
    Unsigned(u64),
    Utf8(&'static str),
}

/// One row of the schema table.
#[derive(Debug, Clone, Copy)]
pub struct ElementSpec {
    pub id: ElementId,
    pub name: &'static str,
    pub kind: ElementKind,
    /// Elements this one may appear in. Empty for top-level elements.
    pub parents: &'static [ElementId],
    pub default: Option<SchemaDefault>,
}

const fn spec(
    id: ElementId,
    name: &'static str,
    kind: ElementKind,
    parents: &'static [ElementId],
    default: Option<SchemaDefault>,
) -> ElementSpec {
    ElementSpec {
        id,
        name,
        kind,
        parents,
        default,
    }
}

use ElementKind::*;

const ATOM_PARENTS: &[ElementId] = &[ids::EDITION_ENTRY, ids::CHAPTER_ATOM];
const IN_EDITION: &[ElementId] = &[ids::EDITION_ENTRY];
const IN_ATOM: &[ElementId] = &[ids::CHAPTER_ATOM];
const IN_DISPLAY: &[ElementId] = &[ids::CHAPTER_DISPLAY];
const IN_CHAPTER_TRACK: &[ElementId] = &[ids::CHAPTER_TRACK];
const IN_TAG: &[ElementId] = &[ids::TAG];
const IN_TARGETS: &[ElementId] = &[ids::TAG_TARGETS];
const SIMPLE_PARENTS: &[ElementId] = &[ids::TAG, ids::SIMPLE_TAG];
const IN_SIMPLE: &[ElementId] = &[ids::SIMPLE_TAG];
const IN_TRACK: &[ElementId] = &[ids::TRACK_ENTRY];
const IN_ENCODING: &[ElementId] = &[ids::CONTENT_ENCODING];

static SCHEMA: &[ElementSpec] = &[
    // Chapters
    spec(ids::CHAPTERS, "Chapters", Master, &[], None),
    spec(ids::EDITION_ENTRY, "EditionEntry", Master, &[ids::CHAPTERS], None),
    spec(ids::EDITION_UID, "EditionUID", Unsigned, IN_EDITION, None),
    spec(ids::EDITION_FLAG_HIDDEN, "EditionFlagHidden", Unsigned, IN_EDITION, Some(SchemaDefault::Unsigned(0))),
    spec(ids::EDITION_FLAG_DEFAULT, "EditionFlagDefault", Unsigned, IN_EDITION, Some(SchemaDefault::Unsigned(0))),
    spec(ids::EDITION_FLAG_ORDERED, "EditionFlagOrdered", Unsigned, IN_EDITION, Some(SchemaDefault::Unsigned(0))),
    spec(ids::CHAPTER_ATOM, "ChapterAtom", Master, ATOM_PARENTS, None),
    spec(ids::CHAPTER_UID, "ChapterUID", Unsigned, IN_ATOM, None),
    spec(ids::CHAPTER_STRING_UID, "ChapterStringUID", Utf8, IN_ATOM, None),
    spec(ids::CHAPTER_TIME_START, "ChapterTimeStart", Timestamp, IN_ATOM, None),
    spec(ids::CHAPTER_TIME_END, "ChapterTimeEnd", Timestamp, IN_ATOM, None),
    spec(ids::CHAPTER_FLAG_HIDDEN, "ChapterFlagHidden", Unsigned, IN_ATOM, Some(SchemaDefault::Unsigned(0))),
    spec(ids::CHAPTER_FLAG_ENABLED, "ChapterFlagEnabled", Unsigned, IN_ATOM, Some(SchemaDefault::Unsigned(1))),
    spec(ids::CHAPTER_SEGMENT_UID, "ChapterSegmentUID", Binary, IN_ATOM, None),
    spec(ids::CHAPTER_SEGMENT_EDITION_UID, "ChapterSegmentEditionUID", Unsigned, IN_ATOM, None),
    spec(ids::CHAPTER_PHYSICAL_EQUIV, "ChapterPhysicalEquiv", Unsigned, IN_ATOM, None),
    spec(ids::CHAPTER_TRACK, "ChapterTrack", Master, IN_ATOM, None),
    spec(ids::CHAPTER_TRACK_NUMBER, "ChapterTrackNumber", Unsigned, IN_CHAPTER_TRACK, None),
    spec(ids::CHAPTER_DISPLAY, "ChapterDisplay", Master, IN_ATOM, None),
    spec(ids::CHAPTER_STRING, "ChapterString", Utf8, IN_DISPLAY, None),
    spec(ids::CHAPTER_LANGUAGE, "ChapterLanguage", Utf8, IN_DISPLAY, Some(SchemaDefault::Utf8("eng"))),
    spec(ids::CHAPTER_LANGUAGE_IETF, "ChapLanguageIETF", Utf8, IN_DISPLAY, None),
    spec(ids::CHAPTER_COUNTRY, "ChapterCountry", Utf8, IN_DISPLAY, None),
    // Tags
    spec(ids::TAGS, "Tags", Master, &[], None),
    spec(ids::TAG, "Tag", Master, &[ids::TAGS], None),
    spec(ids::TAG_TARGETS, "Targets", Master, IN_TAG, None),
    spec(ids::TAG_TARGET_TYPE_VALUE, "TargetTypeValue", Unsigned, IN_TARGETS, Some(SchemaDefault::Unsigned(50))),
    spec(ids::TAG_TARGET_TYPE, "TargetType", Utf8, IN_TARGETS, None),
    spec(ids::TAG_TRACK_UID, "TrackUID", Unsigned, IN_TARGETS, Some(SchemaDefault::Unsigned(0))),
    spec(ids::TAG_EDITION_UID, "EditionUID", Unsigned, IN_TARGETS, Some(SchemaDefault::Unsigned(0))),
    spec(ids::TAG_CHAPTER_UID, "ChapterUID", Unsigned, IN_TARGETS, Some(SchemaDefault::Unsigned(0))),
    spec(ids::TAG_ATTACHMENT_UID, "AttachmentUID", Unsigned, IN_TARGETS, Some(SchemaDefault::Unsigned(0))),
    spec(ids::SIMPLE_TAG, "Simple", Master, SIMPLE_PARENTS, None),
    spec(ids::TAG_NAME, "Name", Utf8, IN_SIMPLE, None),
    spec(ids::TAG_LANGUAGE, "TagLanguage", Utf8, IN_SIMPLE, Some(SchemaDefault::Utf8("und"))),
    spec(ids::TAG_LANGUAGE_IETF, "TagLanguageIETF", Utf8, IN_SIMPLE, None),
    spec(ids::TAG_DEFAULT, "DefaultLanguage", Unsigned, IN_SIMPLE, Some(SchemaDefault::Unsigned(1))),
    spec(ids::TAG_STRING, "String", Utf8, IN_SIMPLE, None),
    spec(ids::TAG_BINARY, "Binary", Binary, IN_SIMPLE, None),
    // Segment info and tracks, only needed for statistics accounting
    spec(ids::INFO, "Info", Master, &[], None),
    spec(ids::TIMESTAMP_SCALE, "TimestampScale", Unsigned, &[ids::INFO], Some(SchemaDefault::Unsigned(1_000_000))),
    spec(ids::TRACKS, "Tracks", Master, &[], None),
    spec(ids::TRACK_ENTRY, "TrackEntry", Master, &[ids::TRACKS], None),
    spec(ids::TRACK_NUMBER, "TrackNumber", Unsigned, IN_TRACK, None),
    spec(ids::TRACK_UID, "TrackUID", Unsigned, IN_TRACK, None),
    spec(ids::TRACK_TYPE, "TrackType", Unsigned, IN_TRACK, None),
    spec(ids::DEFAULT_DURATION, "DefaultDuration", Unsigned, IN_TRACK, None),
    spec(ids::CONTENT_ENCODINGS, "ContentEncodings", Master, IN_TRACK, None),
    spec(ids::CONTENT_ENCODING, "ContentEncoding", Master, &[ids::CONTENT_ENCODINGS], None),
    spec(ids::CONTENT_ENCODING_ORDER, "ContentEncodingOrder", Unsigned, IN_ENCODING, Some(SchemaDefault::Unsigned(0))),
    spec(ids::CONTENT_ENCODING_SCOPE, "ContentEncodingScope", Unsigned, IN_ENCODING, Some(SchemaDefault::Unsigned(1))),
    spec(ids::CONTENT_ENCODING_TYPE, "ContentEncodingType", Unsigned, IN_ENCODING, Some(SchemaDefault::Unsigned(0))),
    spec(ids::CONTENT_COMPRESSION, "ContentCompression", Master, IN_ENCODING, None),
    spec(ids::CONTENT_COMP_ALGO, "ContentCompAlgo", Unsigned, &[ids::CONTENT_COMPRESSION], Some(SchemaDefault::Unsigned(0))),
    spec(ids::CONTENT_COMP_SETTINGS, "ContentCompSettings", Binary, &[ids::CONTENT_COMPRESSION], None),
    spec(ids::CONTENT_ENCRYPTION, "ContentEncryption", Master, IN_ENCODING, None),
];

static BY_ID: Lazy<HashMap<ElementId, &'static ElementSpec>> =
    Lazy::new(|| SCHEMA.iter().map(|s| (s.id, s)).collect());

/// Schema row for `id`.
pub fn lookup(id: ElementId) -> Option<&'static ElementSpec> {
    BY_ID.get(&id).copied()
}

/// Schema row for an XML element `name` appearing inside `parent`.
///
/// Names are only unique per parent (`EditionUID` exists both in
/// editions and in tag targets), so the parent takes part in the lookup.
/// `parent == None` looks for top-level elements.
pub fn lookup_by_name(name: &str, parent: Option<ElementId>) -> Option<&'static ElementSpec> {
    SCHEMA.iter().find(|s| {
        s.name == name
            && match parent {
                Some(p) => s.parents.contains(&p),
                None => s.parents.is_empty(),
            }
    })
}

/// Whether `name` is a known element name under any parent.
pub fn is_known_name(name: &str) -> bool {
    SCHEMA.iter().any(|s| s.name == name)
}

/// Display name for an element id.
pub fn name_of(id: ElementId) -> &'static str {
    lookup(id).map(|s| s.name).unwrap_or("Unknown")
}

/// Construct a default-valued element of type `id`.
pub(crate) fn default_element(id: ElementId) -> Element {
    let Some(spec) = lookup(id) else {
        return Element::master(id);
    };

    if let Some(default) = spec.default {
        return match default {
            SchemaDefault::Unsigned(v) => Element::unsigned(id, v),
            SchemaDefault::Utf8(s) => Element::utf8(id, s),
        };
    }

    match spec.kind {
        Master => Element::master(id),
        Unsigned | Timestamp => Element::unsigned(id, 0),
        Signed => Element::leaf(id, Value::Signed(0)),
        Utf8 => Element::utf8(id, ""),
        Binary => Element::binary(id, Vec::new()),
    }
}
