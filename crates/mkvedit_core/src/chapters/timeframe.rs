//! Timeframe selection for chapter trees.

use crate::ebml::{ids, Element};

use super::atom::{get_end, get_start, set_timestamp};

/// End used for the last atom of a level when it has no end of its own.
const UNBOUNDED_END: i64 = 1 << 62;

/// Keep only the chapters that fall into `[min_ts, max_ts]`.
///
/// Atoms starting outside the window are removed, except for atoms that
/// start before `min_ts` but end after it: those span the window start
/// and are kept with their start clamped to `min_ts`. Atoms without an
/// end take the next atom's start as their end (or run to infinity when
/// they are the last one on their level). `offset` is subtracted from
/// every kept start and end; ends are clamped to `max_ts` first.
/// Editions left without atoms are removed.
///
/// # Arguments
///
/// * `chapters` - Chapters root element, modified in place
/// * `min_ts` - Window start in ns, `None` for no lower bound
/// * `max_ts` - Window end in ns, `None` for no upper bound
/// * `offset` - Value subtracted from kept timestamps
///
/// # Returns
///
/// `true` if at least one edition survived.
pub fn select_in_timeframe(
    chapters: &mut Element,
    min_ts: Option<i64>,
    max_ts: Option<i64>,
    offset: i64,
) -> bool {
    let min_ts = min_ts.unwrap_or(i64::MIN);

    if let Some(children) = chapters.children_mut() {
        for edition in children.iter_mut().filter(|c| c.is(ids::EDITION_ENTRY)) {
            remove_entries(edition, min_ts, max_ts, offset);
        }
    }

    chapters.retain_children(|child| {
        !child.is(ids::EDITION_ENTRY) || child.find_child(ids::CHAPTER_ATOM).is_some()
    });

    let accepted = !chapters.is_empty();
    tracing::debug!(
        "Timeframe selection [{}, {:?}] offset {}: {} edition(s) left",
        min_ts,
        max_ts,
        offset,
        chapters.len()
    );
    accepted
}

fn remove_entries(master: &mut Element, min_ts: i64, max_ts: Option<i64>, offset: i64) {
    let Some(children) = master.children_mut() else {
        return;
    };

    // (start, end) for every atom position, None for other children
    let times: Vec<Option<(i64, Option<i64>)>> = children
        .iter()
        .map(|c| {
            c.is(ids::CHAPTER_ATOM)
                .then(|| (get_start(c).unwrap_or(0), get_end(c)))
        })
        .collect();

    if times.iter().all(Option::is_none) {
        return;
    }

    let mut remove = vec![false; children.len()];

    for (i, child) in children.iter_mut().enumerate() {
        let Some((start, own_end)) = times[i] else {
            continue;
        };

        let end = own_end.unwrap_or_else(|| {
            times[i + 1..]
                .iter()
                .flatten()
                .next()
                .map_or(UNBOUNDED_END, |(next_start, _)| *next_start)
        });

        let outside = start < min_ts || max_ts.is_some_and(|max| start > max);
        let spans = outside && start < min_ts && end > min_ts;

        tracing::trace!(
            "remove_entries: entries[{}]: remove {} spans {} start {} end {}",
            i,
            outside,
            spans,
            start,
            end
        );

        if outside && !spans {
            remove[i] = true;
            continue;
        }

        let kept_start = if spans { min_ts } else { start };
        set_timestamp(child, ids::CHAPTER_TIME_START, kept_start.saturating_sub(offset));

        if let Some(end) = own_end {
            let end = max_ts.map_or(end, |max| end.min(max));
            set_timestamp(child, ids::CHAPTER_TIME_END, end.saturating_sub(offset));
        }

        remove_entries(child, min_ts, max_ts, offset);
    }

    let mut idx = 0;
    children.retain(|_| {
        let keep = !remove[idx];
        idx += 1;
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::atom::test_support::*;
    use crate::chapters::atom::{get_name, get_uid};
    use proptest::prelude::*;

    fn atoms_of(tree: &Element) -> Vec<&Element> {
        tree.children_of(ids::EDITION_ENTRY)
            .flat_map(|e| e.children_of(ids::CHAPTER_ATOM))
            .collect()
    }

    #[test]
    fn spanning_atom_is_clamped() {
        let mut tree = chapters(vec![edition(
            Some(1),
            vec![atom(1, 10 * SEC, None, "a"), atom(2, 20 * SEC, None, "b")],
        )]);

        let accepted = select_in_timeframe(
            &mut tree,
            Some(15 * SEC as i64),
            Some(25 * SEC as i64),
            0,
        );
        assert!(accepted);

        let atoms = atoms_of(&tree);
        assert_eq!(atoms.len(), 2);
        assert_eq!(get_start(atoms[0]), Some(15 * SEC as i64));
        assert_eq!(get_end(atoms[0]), None);
        assert_eq!(get_start(atoms[1]), Some(20 * SEC as i64));
    }

    #[test]
    fn offset_applies_to_kept_atoms() {
        let mut tree = chapters(vec![edition(
            None,
            vec![atom(1, 10 * SEC, None, "a"), atom(2, 20 * SEC, Some(40 * SEC), "b")],
        )]);

        select_in_timeframe(
            &mut tree,
            Some(15 * SEC as i64),
            Some(25 * SEC as i64),
            5 * SEC as i64,
        );

        let atoms = atoms_of(&tree);
        assert_eq!(get_start(atoms[0]), Some(10 * SEC as i64));
        assert_eq!(get_start(atoms[1]), Some(15 * SEC as i64));
        // end clamped to max_ts before the offset
        assert_eq!(get_end(atoms[1]), Some(20 * SEC as i64));
    }

    #[test]
    fn atoms_outside_are_removed() {
        let mut tree = chapters(vec![edition(
            None,
            vec![
                atom(1, 0, Some(SEC), "before"),
                atom(2, 5 * SEC, None, "inside"),
                atom(3, 50 * SEC, None, "after"),
            ],
        )]);

        select_in_timeframe(&mut tree, Some(2 * SEC as i64), Some(10 * SEC as i64), 0);

        let atoms = atoms_of(&tree);
        assert_eq!(atoms.len(), 1);
        assert_eq!(get_name(atoms[0]), "inside");
    }

    #[test]
    fn empty_editions_are_dropped() {
        let mut tree = chapters(vec![
            edition(Some(1), vec![atom(1, 100 * SEC, None, "late")]),
            edition(Some(2), vec![atom(2, SEC, Some(2 * SEC), "early")]),
        ]);

        assert!(select_in_timeframe(&mut tree, None, Some(10 * SEC as i64), 0));
        assert_eq!(tree.len(), 1);
        assert_eq!(atoms_of(&tree).iter().map(|a| get_uid(a)).collect::<Vec<_>>(), vec![Some(2)]);

        assert!(!select_in_timeframe(&mut tree, Some(50 * SEC as i64), None, 0));
        assert!(tree.is_empty());
    }

    #[test]
    fn nested_atoms_follow_parent() {
        let mut parent = atom(1, 10 * SEC, Some(30 * SEC), "parent");
        parent.push(atom(2, 12 * SEC, None, "early child"));
        parent.push(atom(3, 22 * SEC, None, "late child"));
        let mut tree = chapters(vec![edition(None, vec![parent])]);

        select_in_timeframe(&mut tree, Some(20 * SEC as i64), None, 0);

        let top = atoms_of(&tree);
        assert_eq!(get_start(top[0]), Some(20 * SEC as i64));
        let nested: Vec<_> = top[0].children_of(ids::CHAPTER_ATOM).collect();
        assert_eq!(nested.len(), 2);
        // the early child spans up to the late child's start
        assert_eq!(get_start(nested[0]), Some(20 * SEC as i64));
        assert_eq!(get_start(nested[1]), Some(22 * SEC as i64));
    }

    type AtomTimes = (u64, Option<u64>);

    fn arb_times() -> impl Strategy<Value = AtomTimes> {
        (0u64..1000, proptest::option::of(0u64..200))
    }

    fn arb_tree() -> impl Strategy<Value = Element> {
        let nested = proptest::collection::vec(arb_times(), 0..4);
        let atom_strategy = (arb_times(), nested);
        let edition_strategy = proptest::collection::vec(atom_strategy, 0..6);
        proptest::collection::vec(edition_strategy, 1..4).prop_map(|editions| {
            let mut uid = 0;
            let mut make = |(start, len): AtomTimes| {
                uid += 1;
                atom(uid, start, len.map(|l| start + l), "x")
            };
            chapters(
                editions
                    .into_iter()
                    .map(|atoms| {
                        let atoms = atoms
                            .into_iter()
                            .map(|(times, nested)| {
                                let mut parent = make(times);
                                for child in nested {
                                    parent.push(make(child));
                                }
                                parent
                            })
                            .collect();
                        edition(None, atoms)
                    })
                    .collect(),
            )
        })
    }

    fn count_atoms_in(master: &Element) -> usize {
        master
            .children_of(ids::CHAPTER_ATOM)
            .map(|a| 1 + count_atoms_in(a))
            .sum()
    }

    fn check_level(master: &Element, min: i64, max: i64) -> Result<(), TestCaseError> {
        for atom in master.children_of(ids::CHAPTER_ATOM) {
            let start = get_start(atom).unwrap_or(0);
            prop_assert!(start >= min && start <= max);
            if let Some(end) = get_end(atom) {
                prop_assert!(end <= max && end >= start);
            }
            check_level(atom, min, max)?;
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn selection_stays_in_window(
            tree in arb_tree(),
            min in 0i64..1000,
            len in 0i64..1000,
        ) {
            let max = min + len;
            let before = count_atoms_in_tree(&tree);
            let mut tree = tree;
            let accepted = select_in_timeframe(&mut tree, Some(min), Some(max), 0);

            prop_assert_eq!(accepted, !tree.is_empty());
            prop_assert!(count_atoms_in_tree(&tree) <= before);
            for edition in tree.children_of(ids::EDITION_ENTRY) {
                prop_assert!(edition.find_child(ids::CHAPTER_ATOM).is_some());
                check_level(edition, min, max)?;
            }
        }
    }

    fn count_atoms_in_tree(tree: &Element) -> usize {
        tree.children_of(ids::EDITION_ENTRY).map(count_atoms_in).sum()
    }
}
