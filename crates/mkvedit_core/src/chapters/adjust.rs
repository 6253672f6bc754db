//! Timestamp rescaling and atom counting.

use crate::ebml::{ids, Element};

use super::atom::{get_end, get_start, set_timestamp};

/// Rescale and shift every chapter timestamp below `master`.
///
/// Each start and end becomes `ts * numerator / denominator + offset`
/// (integer arithmetic, truncating), clamped to zero. A zero denominator
/// leaves the tree untouched.
pub fn adjust_timestamps(master: &mut Element, offset: i64, numerator: i64, denominator: i64) {
    if denominator == 0 {
        tracing::warn!("adjust_timestamps called with a zero denominator; ignoring");
        return;
    }
    adjust_level(master, offset, numerator, denominator);
}

fn adjust_level(master: &mut Element, offset: i64, numerator: i64, denominator: i64) {
    let Some(children) = master.children_mut() else {
        return;
    };

    let scale = |ts: i64| -> i64 {
        let scaled = i128::from(ts) * i128::from(numerator) / i128::from(denominator);
        let shifted = scaled + i128::from(offset);
        shifted.clamp(0, i128::from(i64::MAX)) as i64
    };

    for atom in children.iter_mut().filter(|c| c.is(ids::CHAPTER_ATOM)) {
        if let Some(start) = get_start(atom) {
            set_timestamp(atom, ids::CHAPTER_TIME_START, scale(start));
        }
        if let Some(end) = get_end(atom) {
            set_timestamp(atom, ids::CHAPTER_TIME_END, scale(end));
        }
    }

    for child in children.iter_mut().filter(|c| c.is_master()) {
        adjust_level(child, offset, numerator, denominator);
    }
}

/// Number of chapter atoms at any depth below `master`.
pub fn count_atoms(master: &Element) -> usize {
    master
        .children()
        .iter()
        .map(|child| usize::from(child.is(ids::CHAPTER_ATOM)) + count_atoms(child))
        .sum()
}
