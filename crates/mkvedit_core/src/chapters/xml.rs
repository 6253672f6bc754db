//! Matroska XML documents to element trees and back.
//!
//! Handles both chapter (`<Chapters>`) and tag (`<Tags>`) documents as
//! used by mkvmerge/mkvextract:
//!
//! ```xml
//! <?xml version="1.0"?>
//! <Chapters>
//!   <EditionEntry>
//!     <EditionUID>12345</EditionUID>
//!     <ChapterAtom>
//!       <ChapterTimeStart>00:00:00.000000000</ChapterTimeStart>
//!       <ChapterDisplay>
//!         <ChapterString>Chapter 1</ChapterString>
//!         <ChapterLanguage>eng</ChapterLanguage>
//!       </ChapterDisplay>
//!     </ChapterAtom>
//!   </EditionEntry>
//! </Chapters>
//! ```
//!
//! Element names are resolved through the schema table relative to their
//! parent, so misplaced elements are rejected with their position.
//! Mandatory elements that can be synthesized (UIDs, languages, tag
//! targets) are added; others are reported as errors.

use crate::ebml::schema::{self, ElementKind};
use crate::ebml::{ids, Element, ElementId, Value};
use crate::uid::{UidAllocator, UidNamespace};

use super::error::{ChapterError, ChapterResult, TextPosition};

/// Check whether `text` looks like a chapter XML document.
pub fn probe_xml(text: &str) -> bool {
    text.trim_start().starts_with('<') && text.contains("<Chapters")
}

/// Parse a `<Chapters>` document.
///
/// Existing edition and chapter UIDs are registered with `registry`;
/// missing ones are allocated from it.
pub fn parse_chapters_xml(text: &str, registry: &mut impl UidAllocator) -> ChapterResult<Element> {
    let mut converter = Converter {
        registry: Some(registry as &mut dyn UidAllocator),
    };
    converter.parse(text, ids::CHAPTERS)
}

/// Parse a `<Tags>` document.
pub fn parse_tags_xml(text: &str) -> ChapterResult<Element> {
    let mut converter = Converter { registry: None };
    converter.parse(text, ids::TAGS)
}

struct Converter<'r> {
    registry: Option<&'r mut dyn UidAllocator>,
}

impl Converter<'_> {
    fn parse(&mut self, text: &str, root_id: ElementId) -> ChapterResult<Element> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)
            .map_err(|e| ChapterError::xml(e.to_string(), Some(e.pos().into())))?;

        let root = doc.root_element();
        let expected = schema::name_of(root_id);
        if root.tag_name().name() != expected {
            return Err(ChapterError::xml(
                format!(
                    "The root element must be <{}>, found <{}>",
                    expected,
                    root.tag_name().name()
                ),
                Some(position(&root)),
            ));
        }

        let element = self.convert(&root, None)?;
        tracing::debug!(
            "Parsed <{}> XML with {} top-level element(s)",
            expected,
            element.len()
        );
        Ok(element)
    }

    fn convert(&mut self, node: &roxmltree::Node, parent: Option<ElementId>) -> ChapterResult<Element> {
        let name = node.tag_name().name();
        let spec = schema::lookup_by_name(name, parent).ok_or_else(|| {
            let message = match parent {
                Some(parent) if schema::is_known_name(name) => format!(
                    "<{}> is not allowed inside <{}>",
                    name,
                    schema::name_of(parent)
                ),
                _ => format!("Unknown element <{}>", name),
            };
            ChapterError::xml(message, Some(position(node)))
        })?;

        if spec.kind != ElementKind::Master {
            let text = node.text().unwrap_or("");
            let value = parse_value(spec.kind, text).ok_or_else(|| {
                ChapterError::xml(
                    format!("Invalid value '{}' for <{}>", text.trim(), name),
                    Some(position(node)),
                )
            })?;
            return Ok(Element::leaf(spec.id, value));
        }

        let mut element = Element::master(spec.id);
        for child in node.children().filter(|n| n.is_element()) {
            element.push(self.convert(&child, Some(spec.id))?);
        }

        self.fix_mandatory(&mut element, node)?;
        Ok(element)
    }

    fn fix_mandatory(&mut self, element: &mut Element, node: &roxmltree::Node) -> ChapterResult<()> {
        let element_name = element.name();
        let missing = |child: ElementId| {
            ChapterError::xml(
                format!(
                    "<{}> is missing the mandatory <{}> child",
                    element_name,
                    schema::name_of(child)
                ),
                Some(position(node)),
            )
        };

        match element.id {
            ids::EDITION_ENTRY => {
                if element.find_child(ids::CHAPTER_ATOM).is_none() {
                    return Err(missing(ids::CHAPTER_ATOM));
                }
                self.ensure_uid(element, ids::EDITION_UID, UidNamespace::Edition);
            }
            ids::CHAPTER_ATOM => {
                if element.find_child(ids::CHAPTER_TIME_START).is_none() {
                    return Err(missing(ids::CHAPTER_TIME_START));
                }
                self.ensure_uid(element, ids::CHAPTER_UID, UidNamespace::Chapter);
            }
            ids::CHAPTER_DISPLAY => {
                if element.find_child(ids::CHAPTER_STRING).is_none() {
                    return Err(missing(ids::CHAPTER_STRING));
                }
                element.child_or_insert(ids::CHAPTER_LANGUAGE);
            }
            ids::TAG => {
                if element.find_child(ids::SIMPLE_TAG).is_none() {
                    return Err(missing(ids::SIMPLE_TAG));
                }
                if element.find_child(ids::TAG_TARGETS).is_none() {
                    if let Some(children) = element.children_mut() {
                        let targets = Element::master_with(
                            ids::TAG_TARGETS,
                            vec![Element::with_default(ids::TAG_TARGET_TYPE_VALUE)],
                        );
                        children.insert(0, targets);
                    }
                }
            }
            ids::TAG_TARGETS => {
                element.child_or_insert(ids::TAG_TARGET_TYPE_VALUE);
            }
            ids::SIMPLE_TAG => {
                if element.find_child(ids::TAG_NAME).is_none() {
                    return Err(missing(ids::TAG_NAME));
                }
                element.child_or_insert(ids::TAG_LANGUAGE);
            }
            _ => {}
        }
        Ok(())
    }

    fn ensure_uid(&mut self, element: &mut Element, id: ElementId, namespace: UidNamespace) {
        let Some(registry) = self.registry.as_deref_mut() else {
            return;
        };

        match element.child_u64(id) {
            Some(uid) if uid != 0 => {
                if !registry.register(namespace, uid) {
                    tracing::debug!("{:?} UID {} is not unique", namespace, uid);
                }
            }
            _ => {
                let uid = registry.allocate(namespace);
                element.set_child_u64(id, uid);
            }
        }
    }
}

fn position(node: &roxmltree::Node) -> TextPosition {
    node.document().text_pos_at(node.range().start).into()
}

fn parse_value(kind: ElementKind, text: &str) -> Option<Value> {
    let trimmed = text.trim();
    match kind {
        ElementKind::Unsigned => trimmed.parse().ok().map(Value::Unsigned),
        ElementKind::Signed => trimmed.parse().ok().map(Value::Signed),
        ElementKind::Timestamp => parse_timestamp_ns(trimmed).map(Value::Unsigned),
        ElementKind::Utf8 => Some(Value::Utf8(text.to_string())),
        ElementKind::Binary => decode_hex(trimmed).map(Value::Binary),
        ElementKind::Master => None,
    }
}

/// Format nanoseconds as `HH:MM:SS.nnnnnnnnn`.
pub fn format_timestamp_ns(ns: u64) -> String {
    let total_secs = ns / 1_000_000_000;
    let remaining_ns = ns % 1_000_000_000;

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    format!("{:02}:{:02}:{:02}.{:09}", hours, minutes, seconds, remaining_ns)
}

/// Parse `HH:MM:SS[.fraction]` (or a plain nanosecond count).
pub fn parse_timestamp_ns(time_str: &str) -> Option<u64> {
    if !time_str.is_empty() && time_str.bytes().all(|b| b.is_ascii_digit()) {
        return time_str.parse().ok();
    }

    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: u64 = parts[0].parse().ok()?;
    let minutes: u64 = parts[1].parse().ok()?;

    let (secs, fraction) = parts[2].split_once('.').unwrap_or((parts[2], ""));
    let seconds: u64 = secs.parse().ok()?;
    if minutes > 59 || seconds > 59 {
        return None;
    }

    let nanos: u64 = if fraction.is_empty() {
        0
    } else {
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // Pad or truncate to 9 digits
        let padded = format!("{:0<9}", fraction);
        padded[..9].parse().ok()?
    };

    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)?
        .checked_mul(1_000_000_000)?
        .checked_add(nanos)
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(s, 16).ok()
        })
        .collect()
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Serialize a chapter or tag tree to XML text.
pub fn to_xml(root: &Element) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(&mut xml, root, 0);
    xml
}

fn write_element(out: &mut String, element: &Element, depth: usize) {
    let Some(spec) = schema::lookup(element.id) else {
        tracing::trace!("Skipping unknown element {:#x} in XML output", element.id);
        return;
    };
    let indent = "  ".repeat(depth);

    let Some(value) = element.value() else {
        out.push_str(&format!("{}<{}>\n", indent, spec.name));
        for child in element.children() {
            write_element(out, child, depth + 1);
        }
        out.push_str(&format!("{}</{}>\n", indent, spec.name));
        return;
    };

    let text = match (spec.kind, value) {
        (ElementKind::Timestamp, Value::Unsigned(ns)) => format_timestamp_ns(*ns),
        (_, Value::Unsigned(v)) => v.to_string(),
        (_, Value::Signed(v)) => v.to_string(),
        (_, Value::Utf8(s)) => escape_xml(s),
        (_, Value::Binary(bytes)) => encode_hex(bytes),
    };
    out.push_str(&format!("{}<{}>{}</{}>\n", indent, spec.name, text, spec.name));
}
