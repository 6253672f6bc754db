//! Scope-based tag replacement.

use tracing::debug;

use super::targets::{get_tuid, remove_track_uid_targets, set_track_uid_target};
use crate::ebml::{ids, Element};

/// Which existing tags a replacement affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScope {
    /// Every tag.
    All,
    /// Tags without a track target.
    Global,
    /// Tags targeting the track with this UID.
    Track(u64),
}

/// Replace the tags of `scope` in `tags` with the ones in `replacement`.
///
/// Tags moved over are taken out of `replacement`. For the global scope
/// only replacement tags without a track target are moved; any others
/// stay behind. For a track scope, existing track targets on the
/// replacement tags are dropped and the track's UID stamped on instead.
pub fn replace_tags(tags: &mut Element, replacement: &mut Element, scope: TagScope) {
    match scope {
        TagScope::All => {
            tags.take_children();
            for tag in replacement.take_children() {
                tags.push(tag);
            }
        }

        TagScope::Global => {
            tags.retain_children(|tag| !(tag.is(ids::TAG) && get_tuid(tag).is_none()));

            let Some(children) = replacement.children_mut() else {
                return;
            };
            let (global, rest): (Vec<_>, Vec<_>) = std::mem::take(children)
                .into_iter()
                .partition(|tag| tag.is(ids::TAG) && get_tuid(tag).is_none());
            *children = rest;
            for tag in global {
                tags.push(tag);
            }
        }

        TagScope::Track(track_uid) => {
            tags.retain_children(|tag| !(tag.is(ids::TAG) && get_tuid(tag) == Some(track_uid)));

            for mut tag in replacement.take_children() {
                if !tag.is(ids::TAG) {
                    continue;
                }
                remove_track_uid_targets(&mut tag);
                set_track_uid_target(&mut tag, track_uid);
                tags.push(tag);
            }
        }
    }

    debug!("Replaced tags in scope {:?}, {} tags now present", scope, tags.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(track_uid: Option<u64>, name: &str) -> Element {
        let mut targets = Element::master_with(
            ids::TAG_TARGETS,
            vec![Element::unsigned(ids::TAG_TARGET_TYPE_VALUE, 50)],
        );
        if let Some(uid) = track_uid {
            targets.push(Element::unsigned(ids::TAG_TRACK_UID, uid));
        }
        Element::master_with(
            ids::TAG,
            vec![
                targets,
                Element::master_with(
                    ids::SIMPLE_TAG,
                    vec![
                        Element::utf8(ids::TAG_NAME, name),
                        Element::utf8(ids::TAG_STRING, "x"),
                    ],
                ),
            ],
        )
    }

    fn names(tags: &Element) -> Vec<String> {
        tags.children()
            .iter()
            .filter_map(|t| t.find_child(ids::SIMPLE_TAG))
            .filter_map(|s| s.child_str(ids::TAG_NAME))
            .map(String::from)
            .collect()
    }

    fn existing() -> Element {
        Element::master_with(
            ids::TAGS,
            vec![tag(None, "G1"), tag(Some(5), "T5"), tag(Some(6), "T6")],
        )
    }

    #[test]
    fn all_scope_replaces_everything() {
        let mut tags = existing();
        let mut replacement = Element::master_with(ids::TAGS, vec![tag(Some(9), "N")]);

        replace_tags(&mut tags, &mut replacement, TagScope::All);

        assert_eq!(names(&tags), vec!["N"]);
        assert!(replacement.is_empty());
    }

    #[test]
    fn global_scope_keeps_track_tags() {
        let mut tags = existing();
        let mut replacement = Element::master_with(
            ids::TAGS,
            vec![tag(None, "G2"), tag(Some(7), "T7")],
        );

        replace_tags(&mut tags, &mut replacement, TagScope::Global);

        assert_eq!(names(&tags), vec!["T5", "T6", "G2"]);
        assert_eq!(names(&replacement), vec!["T7"]);
    }

    #[test]
    fn track_scope_restamps_uid() {
        let mut tags = existing();
        let mut replacement = Element::master_with(
            ids::TAGS,
            vec![tag(Some(99), "A"), tag(None, "B")],
        );

        replace_tags(&mut tags, &mut replacement, TagScope::Track(5));

        assert_eq!(names(&tags), vec!["G1", "T6", "A", "B"]);
        let uids: Vec<_> = tags.children().iter().map(get_tuid).collect();
        assert_eq!(uids, vec![None, Some(6), Some(5), Some(5)]);
        assert!(replacement.is_empty());
    }
}
