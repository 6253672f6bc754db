//! Merging chapter atoms and editions.

use crate::ebml::{ids, Element};

use super::atom::{find_edition_with_uid_mut, get_end, get_start, get_uid, set_timestamp};

/// Merge sibling chapter atoms sharing a UID.
///
/// Within each level the first atom with a given UID absorbs all later
/// siblings with the same UID: its start becomes the smallest start
/// (missing starts count as 0) and its end the largest end. An end is
/// only written if at least one of the merged atoms had one. Nested
/// atoms of the absorbed siblings are moved into the surviving atom;
/// their other children are dropped. Every remaining master is then
/// merged recursively.
pub fn merge_entries(master: &mut Element) {
    let Some(children) = master.children_mut() else {
        return;
    };

    let mut idx = 0;
    while idx < children.len() {
        let target = &children[idx];
        let Some(uid) = target.is(ids::CHAPTER_ATOM).then(|| get_uid(target)).flatten() else {
            idx += 1;
            continue;
        };

        let mut start = get_start(target).unwrap_or(0);
        let mut end = get_end(target);
        tracing::trace!(
            "merge_entries: looking for {} with {}, {:?}",
            uid,
            start,
            end
        );

        let mut merge_idx = idx + 1;
        while merge_idx < children.len() {
            let candidate = &children[merge_idx];
            if !candidate.is(ids::CHAPTER_ATOM) || get_uid(candidate) != Some(uid) {
                merge_idx += 1;
                continue;
            }

            let mut donor = children.remove(merge_idx);
            let donor_start = get_start(&donor).unwrap_or(0);
            let donor_end = get_end(&donor);

            start = start.min(donor_start);
            end = match (end, donor_end) {
                (None, donor_end) => donor_end,
                (Some(current), Some(donor_end)) if donor_end > current => Some(donor_end),
                (current, _) => current,
            };

            for nested in donor.remove_children(ids::CHAPTER_ATOM) {
                children[idx].push(nested);
            }

            tracing::trace!(
                "merge_entries:   found one at {} with {}, {:?}; merged to {}, {:?}",
                merge_idx,
                donor_start,
                donor_end,
                start,
                end
            );
        }

        let target = &mut children[idx];
        set_timestamp(target, ids::CHAPTER_TIME_START, start);
        if let Some(end) = end {
            set_timestamp(target, ids::CHAPTER_TIME_END, end);
        }

        idx += 1;
    }

    for child in children.iter_mut().filter(|c| c.is_master()) {
        merge_entries(child);
    }
}

/// Move all editions from `src` into `dst`, keeping editions intact.
///
/// An edition whose UID already exists in `dst` only contributes its
/// chapter atoms to the existing edition (its other children are
/// dropped). Editions without a match are moved over whole. `src` is
/// empty afterwards.
pub fn move_by_edition(dst: &mut Element, src: &mut Element) {
    for mut edition in src.take_children() {
        if !edition.is_master() {
            continue;
        }

        if let Some(uid) = edition.child_u64(ids::EDITION_UID) {
            if let Some(existing) = find_edition_with_uid_mut(dst, uid) {
                let atoms = edition.remove_children(ids::CHAPTER_ATOM);
                tracing::trace!(
                    "move_by_edition: {} atom(s) into existing edition {}",
                    atoms.len(),
                    uid
                );
                for atom in atoms {
                    existing.push(atom);
                }
                continue;
            }
        }

        dst.push(edition);
    }
}
