//! WebM compatibility filter.
//!
//! WebM only allows a subset of the Matroska chapter and tag elements.
//! [`remove_elements_unsupported_by_webm`] prunes everything else from a
//! tree. A few flag elements are not dropped but reset to their default
//! value, since strict WebM readers expect them to be present.

use crate::ebml::{ids, Element, ElementId};

const SUPPORTED: &[ElementId] = &[
    // Chapters
    ids::CHAPTERS,
    ids::EDITION_ENTRY,
    ids::CHAPTER_ATOM,
    ids::CHAPTER_UID,
    ids::CHAPTER_STRING_UID,
    ids::CHAPTER_TIME_START,
    ids::CHAPTER_TIME_END,
    ids::CHAPTER_DISPLAY,
    ids::CHAPTER_STRING,
    ids::CHAPTER_LANGUAGE,
    ids::CHAPTER_COUNTRY,
    // Tags
    ids::TAGS,
    ids::TAG,
    ids::TAG_TARGETS,
    ids::TAG_TARGET_TYPE_VALUE,
    ids::TAG_TARGET_TYPE,
    ids::TAG_TRACK_UID,
    ids::SIMPLE_TAG,
    ids::TAG_NAME,
    ids::TAG_LANGUAGE,
    ids::TAG_DEFAULT,
    ids::TAG_STRING,
    ids::TAG_BINARY,
];

const READD_WITH_DEFAULTS: &[ElementId] = &[
    ids::EDITION_FLAG_DEFAULT,
    ids::EDITION_FLAG_HIDDEN,
    ids::CHAPTER_FLAG_ENABLED,
    ids::CHAPTER_FLAG_HIDDEN,
];

/// Whether WebM keeps elements of type `id` as they are.
pub fn is_supported_by_webm(id: ElementId) -> bool {
    SUPPORTED.contains(&id)
}

/// Remove all children of `master` that WebM doesn't support.
///
/// Supported masters are filtered recursively. Flag elements WebM
/// requires in their default state are replaced by a default-valued
/// instance; everything else unsupported is removed with its subtree.
pub fn remove_elements_unsupported_by_webm(master: &mut Element) {
    let Some(children) = master.children_mut() else {
        return;
    };

    children.retain_mut(|child| {
        if is_supported_by_webm(child.id) {
            remove_elements_unsupported_by_webm(child);
            true
        } else if READD_WITH_DEFAULTS.contains(&child.id) {
            *child = Element::with_default(child.id);
            true
        } else {
            tracing::trace!("Removing {} unsupported by WebM", child.name());
            false
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prunes_chapters() {
        let mut atom = Element::master_with(
            ids::CHAPTER_ATOM,
            vec![
                Element::unsigned(ids::CHAPTER_UID, 1),
                Element::unsigned(ids::CHAPTER_TIME_START, 0),
                Element::unsigned(ids::CHAPTER_FLAG_ENABLED, 0),
                Element::unsigned(ids::CHAPTER_FLAG_HIDDEN, 1),
                Element::binary(ids::CHAPTER_SEGMENT_UID, vec![1, 2, 3]),
                Element::master_with(
                    ids::CHAPTER_TRACK,
                    vec![Element::unsigned(ids::CHAPTER_TRACK_NUMBER, 1)],
                ),
                Element::master_with(
                    ids::CHAPTER_DISPLAY,
                    vec![
                        Element::utf8(ids::CHAPTER_STRING, "a"),
                        Element::utf8(ids::CHAPTER_LANGUAGE_IETF, "en"),
                    ],
                ),
            ],
        );
        atom.push(Element::master_with(
            ids::CHAPTER_ATOM,
            vec![Element::unsigned(ids::CHAPTER_PHYSICAL_EQUIV, 10)],
        ));
        let mut edition = Element::master_with(
            ids::EDITION_ENTRY,
            vec![Element::unsigned(ids::EDITION_FLAG_ORDERED, 1), atom],
        );

        remove_elements_unsupported_by_webm(&mut edition);

        assert_eq!(edition.len(), 1);
        let atom = &edition.children()[0];
        let ids_left: Vec<_> = atom.children().iter().map(|c| c.id).collect();
        assert_eq!(
            ids_left,
            vec![
                ids::CHAPTER_UID,
                ids::CHAPTER_TIME_START,
                ids::CHAPTER_FLAG_ENABLED,
                ids::CHAPTER_FLAG_HIDDEN,
                ids::CHAPTER_DISPLAY,
                ids::CHAPTER_ATOM,
            ]
        );
        // flags reset to defaults
        assert_eq!(atom.child_u64(ids::CHAPTER_FLAG_ENABLED), Some(1));
        assert_eq!(atom.child_u64(ids::CHAPTER_FLAG_HIDDEN), Some(0));
        // nested content pruned as well
        assert_eq!(atom.find_child(ids::CHAPTER_DISPLAY).unwrap().len(), 1);
        assert!(atom.find_child(ids::CHAPTER_ATOM).unwrap().is_empty());
    }

    #[test]
    fn prunes_tags() {
        let mut tags = Element::master_with(
            ids::TAGS,
            vec![Element::master_with(
                ids::TAG,
                vec![
                    Element::master_with(
                        ids::TAG_TARGETS,
                        vec![
                            Element::unsigned(ids::TAG_TRACK_UID, 5),
                            Element::unsigned(ids::TAG_CHAPTER_UID, 7),
                        ],
                    ),
                    Element::master_with(
                        ids::SIMPLE_TAG,
                        vec![
                            Element::utf8(ids::TAG_NAME, "TITLE"),
                            Element::utf8(ids::TAG_LANGUAGE_IETF, "en"),
                        ],
                    ),
                ],
            )],
        );

        remove_elements_unsupported_by_webm(&mut tags);

        let tag = &tags.children()[0];
        let targets = tag.find_child(ids::TAG_TARGETS).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets.child_u64(ids::TAG_TRACK_UID), Some(5));
        assert_eq!(tag.find_child(ids::SIMPLE_TAG).unwrap().len(), 1);
    }
}
