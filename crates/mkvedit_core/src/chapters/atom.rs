//! Accessors for chapter atoms and editions.

use crate::ebml::{ids, Element, ElementId};

/// Start timestamp (ns) of an atom, if present.
pub fn get_start(atom: &Element) -> Option<i64> {
    atom.child_i64(ids::CHAPTER_TIME_START)
}

/// End timestamp (ns) of an atom, if present.
pub fn get_end(atom: &Element) -> Option<i64> {
    atom.child_i64(ids::CHAPTER_TIME_END)
}

pub fn get_uid(atom: &Element) -> Option<u64> {
    atom.child_u64(ids::CHAPTER_UID)
}

/// Name from the first display of an atom, or an empty string.
pub fn get_name(atom: &Element) -> &str {
    atom.find_child(ids::CHAPTER_DISPLAY)
        .and_then(|display| display.child_str(ids::CHAPTER_STRING))
        .unwrap_or("")
}

/// Store a chapter timestamp, clamping negative values to zero.
pub(crate) fn set_timestamp(atom: &mut Element, id: ElementId, ns: i64) {
    atom.set_child_u64(id, ns.max(0) as u64);
}

/// Find an edition by UID. UID 0 returns the first edition.
pub fn find_edition_with_uid(chapters: &Element, uid: u64) -> Option<&Element> {
    let mut editions = chapters.children_of(ids::EDITION_ENTRY);
    if uid == 0 {
        return editions.next();
    }
    editions.find(|e| e.child_u64(ids::EDITION_UID) == Some(uid))
}

pub fn find_edition_with_uid_mut(chapters: &mut Element, uid: u64) -> Option<&mut Element> {
    let mut editions = chapters
        .children_mut()?
        .iter_mut()
        .filter(|e| e.is(ids::EDITION_ENTRY));
    if uid == 0 {
        return editions.next();
    }
    editions.find(|e| e.child_u64(ids::EDITION_UID) == Some(uid))
}

/// Find a top-level chapter atom by UID across all editions.
///
/// UID 0 returns the first atom of the first edition.
pub fn find_chapter_with_uid(chapters: &Element, uid: u64) -> Option<&Element> {
    if uid == 0 {
        return chapters
            .find_child(ids::EDITION_ENTRY)?
            .find_child(ids::CHAPTER_ATOM);
    }

    chapters
        .children_of(ids::EDITION_ENTRY)
        .flat_map(|edition| edition.children_of(ids::CHAPTER_ATOM))
        .find(|atom| get_uid(atom) == Some(uid))
}
