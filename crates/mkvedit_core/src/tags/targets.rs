//! Accessors for the `Targets` of a `Tag`.

use crate::ebml::{ids, Element};

/// Track UID a tag targets, `None` for tags without a track target.
pub fn get_tuid(tag: &Element) -> Option<u64> {
    tag.find_child(ids::TAG_TARGETS)?
        .child_u64(ids::TAG_TRACK_UID)
}

/// Chapter UID a tag targets.
pub fn get_cuid(tag: &Element) -> Option<u64> {
    tag.find_child(ids::TAG_TARGETS)?
        .child_u64(ids::TAG_CHAPTER_UID)
}

/// Drop every `TagTrackUID` from the tag's targets.
pub fn remove_track_uid_targets(tag: &mut Element) {
    if let Some(targets) = tag.find_child_mut(ids::TAG_TARGETS) {
        targets.remove_children(ids::TAG_TRACK_UID);
    }
}

/// Point the tag at track `uid`, creating `Targets` if needed.
pub fn set_track_uid_target(tag: &mut Element, uid: u64) {
    if tag.find_child(ids::TAG_TARGETS).is_none() {
        let targets = Element::master_with(
            ids::TAG_TARGETS,
            vec![Element::with_default(ids::TAG_TARGET_TYPE_VALUE)],
        );
        if let Some(children) = tag.children_mut() {
            children.insert(0, targets);
        }
    }
    if let Some(targets) = tag.child_or_insert(ids::TAG_TARGETS) {
        targets.set_child_u64(ids::TAG_TRACK_UID, uid);
    }
}
