//! Tag edit operations and their command line form.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use super::accountant::{add_or_replace_track_statistics_tags, StatisticsOutcome};
use super::error::{TagError, TagResult};
use super::replace::{replace_tags, TagScope};
use super::source::SegmentSource;
use super::statistics::{remove_track_statistics, WritingInfo};
use crate::chapters::parse_tags_xml;
use crate::ebml::{ids, Element};
use crate::logging::ProgressReporter;
use crate::webm::remove_elements_unsupported_by_webm;

/// How a track-scoped edit names its track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSelector {
    /// 1-based position among all track entries (`N`).
    Position(usize),
    /// Track number (`@N`).
    Number(u64),
    /// Track UID (`=UID`).
    Uid(u64),
}

impl TrackSelector {
    /// UID of the selected track in `tracks`.
    pub fn resolve(&self, tracks: &Element) -> Option<u64> {
        let mut entries = tracks.children_of(ids::TRACK_ENTRY);
        let entry = match *self {
            TrackSelector::Position(n) => entries.nth(n.checked_sub(1)?),
            TrackSelector::Number(number) => {
                entries.find(|t| t.child_u64(ids::TRACK_NUMBER) == Some(number))
            }
            TrackSelector::Uid(uid) => entries.find(|t| t.child_u64(ids::TRACK_UID) == Some(uid)),
        }?;
        entry.child_u64(ids::TRACK_UID)
    }
}

impl fmt::Display for TrackSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackSelector::Position(n) => write!(f, "{}", n),
            TrackSelector::Number(n) => write!(f, "@{}", n),
            TrackSelector::Uid(uid) => write!(f, "={}", uid),
        }
    }
}

impl FromStr for TrackSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("'{}' is not a valid track selector", s);
        if let Some(number) = s.strip_prefix('@') {
            number.parse().map(TrackSelector::Number).map_err(|_| invalid())
        } else if let Some(uid) = s.strip_prefix('=') {
            uid.parse().map(TrackSelector::Uid).map_err(|_| invalid())
        } else {
            match s.parse::<usize>() {
                Ok(n) if n > 0 => Ok(TrackSelector::Position(n)),
                _ => Err(invalid()),
            }
        }
    }
}

/// One edit of a file's tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOperation {
    /// Replace all tags with those in `file`.
    All { file: PathBuf },
    /// Replace global tags with those in `file`.
    Global { file: PathBuf },
    /// Replace the tags of one track with those in `file`.
    Track {
        selector: TrackSelector,
        file: PathBuf,
    },
    /// Recompute statistics tags for all tracks.
    AddTrackStatistics,
    /// Remove all statistics tags.
    DeleteTrackStatistics,
}

/// Parse `all:FILE`, `global:FILE` or `track:SELECTOR:FILE`.
///
/// An empty `FILE` means "remove the tags of that scope".
pub fn parse_tag_spec(spec: &str) -> TagResult<TagOperation> {
    let invalid = |reason: &str| TagError::InvalidSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    let (scope, rest) = spec
        .split_once(':')
        .ok_or_else(|| invalid("missing ':' after the scope"))?;

    match scope.to_ascii_lowercase().as_str() {
        "all" => Ok(TagOperation::All { file: rest.into() }),
        "global" => Ok(TagOperation::Global { file: rest.into() }),
        "track" => {
            let (selector, file) = rest
                .split_once(':')
                .ok_or_else(|| invalid("missing ':' after the track selector"))?;
            let selector = selector.parse().map_err(|e: String| invalid(&e))?;
            Ok(TagOperation::Track {
                selector,
                file: file.into(),
            })
        }
        _ => Err(invalid("the scope must be 'all', 'global' or 'track'")),
    }
}

impl FromStr for TagOperation {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tag_spec(s)
    }
}

impl TagOperation {
    /// Apply the operation to `tags`.
    ///
    /// `source` supplies track headers and clusters. The result is
    /// pruned to WebM-supported elements when `source` is WebM.
    pub fn execute(
        &self,
        tags: &mut Element,
        source: &mut impl SegmentSource,
        writing: &WritingInfo,
        progress: &mut ProgressReporter,
    ) -> TagResult<()> {
        match self {
            TagOperation::All { file } => {
                let mut replacement = load_tags(file)?;
                replace_tags(tags, &mut replacement, TagScope::All);
            }

            TagOperation::Global { file } => {
                let mut replacement = load_tags(file)?;
                replace_tags(tags, &mut replacement, TagScope::Global);
            }

            TagOperation::Track { selector, file } => {
                let track_uid = source
                    .read_tracks()?
                    .as_ref()
                    .and_then(|tracks| selector.resolve(tracks))
                    .ok_or_else(|| TagError::TrackNotFound(selector.to_string()))?;
                debug!("Track selector {} resolved to UID {}", selector, track_uid);

                let mut replacement = load_tags(file)?;
                replace_tags(tags, &mut replacement, TagScope::Track(track_uid));
            }

            TagOperation::AddTrackStatistics => {
                let outcome = add_or_replace_track_statistics_tags(tags, source, writing, progress)?;
                if let StatisticsOutcome::Updated { tracks } = outcome {
                    info!("Track statistics updated for {} tracks", tracks);
                }
            }

            TagOperation::DeleteTrackStatistics => {
                let removed = remove_track_statistics(tags, None);
                debug!("Removed {} statistics tags", removed);
            }
        }

        if !tags.is_empty() && source.is_webm() {
            remove_elements_unsupported_by_webm(tags);
        }

        Ok(())
    }
}

/// Read a tag XML file. An empty path yields an empty `Tags` element.
fn load_tags(file: &Path) -> TagResult<Element> {
    if file.as_os_str().is_empty() {
        return Ok(Element::master(ids::TAGS));
    }

    let text = std::fs::read_to_string(file).map_err(|source| TagError::Io {
        path: file.to_path_buf(),
        source,
    })?;

    parse_tags_xml(&text).map_err(|e| TagError::Xml {
        path: file.to_path_buf(),
        message: e.to_string(),
    })
}
