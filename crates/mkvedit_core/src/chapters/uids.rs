//! Edition and chapter UID maintenance.

use std::collections::HashMap;

use crate::ebml::{ids, Element, Value};
use crate::uid::{UidAllocator, UidNamespace};

/// Give every edition directly below `chapters` the registry's shared
/// edition UID.
///
/// Used for chapters from sources without edition UIDs of their own so
/// that chapters appended later land in the same edition.
pub fn align_uids(chapters: &mut Element, registry: &mut impl UidAllocator) {
    let shared = registry.shared_edition_uid();
    if let Some(children) = chapters.children_mut() {
        for edition in children.iter_mut().filter(|c| c.is(ids::EDITION_ENTRY)) {
            edition.set_child_u64(ids::EDITION_UID, shared);
        }
    }
}

/// Copy edition UIDs from `reference` onto `modify` position by position.
///
/// Stops as soon as either tree runs out of editions. Reference editions
/// without a UID contribute 0.
pub fn align_uids_with_reference(reference: &Element, modify: &mut Element) {
    let Some(children) = modify.children_mut() else {
        return;
    };

    let reference_editions = reference.children_of(ids::EDITION_ENTRY);
    let modify_editions = children.iter_mut().filter(|c| c.is(ids::EDITION_ENTRY));

    for (source, target) in reference_editions.zip(modify_editions) {
        let uid = source.child_u64(ids::EDITION_UID).unwrap_or(0);
        target.set_child_u64(ids::EDITION_UID, uid);
    }
}

/// Old to new UID maps produced by [`regenerate_uids`].
#[derive(Debug, Default, Clone)]
pub struct UidMapping {
    pub chapters: HashMap<u64, u64>,
    pub editions: HashMap<u64, u64>,
}

/// Replace every edition and chapter UID in `master` with a fresh one.
///
/// Existing UIDs are registered first so none of the new values can
/// repeat an old one. When `tags` is given, tag targets pointing at old
/// chapter or edition UIDs are rewritten to the new values.
pub fn regenerate_uids(
    master: &mut Element,
    tags: Option<&mut Element>,
    registry: &mut impl UidAllocator,
) -> UidMapping {
    master.walk(&mut |element| {
        if let Some(uid) = element.as_u64() {
            if element.is(ids::EDITION_UID) {
                registry.register(UidNamespace::Edition, uid);
            } else if element.is(ids::CHAPTER_UID) {
                registry.register(UidNamespace::Chapter, uid);
            }
        }
    });

    let mut mapping = UidMapping::default();

    master.walk_mut(&mut |element| {
        let (namespace, map) = if element.is(ids::EDITION_UID) {
            (UidNamespace::Edition, &mut mapping.editions)
        } else if element.is(ids::CHAPTER_UID) {
            (UidNamespace::Chapter, &mut mapping.chapters)
        } else {
            return;
        };

        let old = element.as_u64().unwrap_or(0);
        let new = registry.allocate(namespace);
        map.insert(old, new);
        element.set_value(Value::Unsigned(new));
    });

    tracing::debug!(
        "Regenerated {} chapter and {} edition UID(s)",
        mapping.chapters.len(),
        mapping.editions.len()
    );

    if let Some(tags) = tags {
        tags.walk_mut(&mut |element| {
            let map = if element.is(ids::TAG_CHAPTER_UID) {
                &mapping.chapters
            } else if element.is(ids::TAG_EDITION_UID) {
                &mapping.editions
            } else {
                return;
            };
            if let Some(new) = element.as_u64().and_then(|old| map.get(&old)) {
                element.set_value(Value::Unsigned(*new));
            }
        });
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::atom::test_support::*;
    use crate::chapters::atom::get_uid;
    use crate::uid::UidRegistry;
    use std::collections::HashSet;

    fn chapter_tag(chapter_uid: u64) -> Element {
        Element::master_with(
            ids::TAG,
            vec![Element::master_with(
                ids::TAG_TARGETS,
                vec![Element::unsigned(ids::TAG_CHAPTER_UID, chapter_uid)],
            )],
        )
    }

    fn collect_uids(tree: &Element) -> HashSet<u64> {
        let mut uids = HashSet::new();
        tree.walk(&mut |e| {
            if e.is(ids::CHAPTER_UID) || e.is(ids::EDITION_UID) {
                uids.insert(e.as_u64().unwrap());
            }
        });
        uids
    }

    #[test]
    fn align_uses_shared_edition_uid() {
        let mut registry = UidRegistry::with_seed(3);
        let mut tree = chapters(vec![edition(Some(1), vec![]), edition(None, vec![])]);

        align_uids(&mut tree, &mut registry);

        let shared = registry.shared_edition_uid();
        for ed in tree.children() {
            assert_eq!(ed.child_u64(ids::EDITION_UID), Some(shared));
        }
    }

    #[test]
    fn align_with_reference_stops_at_shorter_tree() {
        let reference = chapters(vec![edition(Some(100), vec![])]);
        let mut modify = chapters(vec![edition(Some(1), vec![]), edition(Some(2), vec![])]);

        align_uids_with_reference(&reference, &mut modify);

        assert_eq!(modify.children()[0].child_u64(ids::EDITION_UID), Some(100));
        assert_eq!(modify.children()[1].child_u64(ids::EDITION_UID), Some(2));
    }

    #[test]
    fn regenerate_rewrites_tag_targets() {
        let mut registry = UidRegistry::new();
        let mut nested = atom(2, SEC, None, "child");
        nested.push(atom(3, SEC, None, "grandchild"));
        let mut top = atom(1, 0, None, "top");
        top.push(nested);
        let mut tree = chapters(vec![edition(Some(50), vec![top])]);
        let mut tags = Element::master_with(ids::TAGS, vec![chapter_tag(3), chapter_tag(999)]);

        let before = collect_uids(&tree);
        let mapping = regenerate_uids(&mut tree, Some(&mut tags), &mut registry);
        let after = collect_uids(&tree);

        assert_eq!(after.len(), 4);
        assert!(before.is_disjoint(&after));

        let targets: Vec<u64> = tags
            .children()
            .iter()
            .filter_map(|t| t.find_child(ids::TAG_TARGETS))
            .filter_map(|t| t.child_u64(ids::TAG_CHAPTER_UID))
            .collect();
        assert_eq!(targets, vec![mapping.chapters[&3], 999]);

        let top = tree.children()[0].find_child(ids::CHAPTER_ATOM).unwrap();
        assert_eq!(get_uid(top), Some(mapping.chapters[&1]));
        assert_eq!(mapping.editions.len(), 1);
    }
}
