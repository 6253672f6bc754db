//! Per-track statistics accumulator and the statistics tag vocabulary.

use chrono::{DateTime, Utc};

use super::targets::{get_tuid, set_track_uid_target};
use crate::chapters::format_timestamp_ns;
use crate::ebml::{ids, Element};

pub const TAG_BPS: &str = "BPS";
pub const TAG_DURATION: &str = "DURATION";
pub const TAG_NUMBER_OF_FRAMES: &str = "NUMBER_OF_FRAMES";
pub const TAG_NUMBER_OF_BYTES: &str = "NUMBER_OF_BYTES";
pub const TAG_WRITING_APP: &str = "_STATISTICS_WRITING_APP";
pub const TAG_WRITING_DATE_UTC: &str = "_STATISTICS_WRITING_DATE_UTC";
pub const TAG_STATISTICS_TAGS: &str = "_STATISTICS_TAGS";

/// Writing application used in no-variable-data mode.
pub const NO_VARIABLE_DATA_APP: &str = "no_variable_data";

/// Reserved simple tag names making up a statistics tag.
pub const STATISTICS_VOCABULARY: &[&str] = &[
    TAG_BPS,
    TAG_DURATION,
    TAG_NUMBER_OF_FRAMES,
    TAG_NUMBER_OF_BYTES,
    TAG_WRITING_APP,
    TAG_WRITING_DATE_UTC,
    TAG_STATISTICS_TAGS,
];

const ACCOUNTED_TAGS: &[&str] = &[TAG_BPS, TAG_DURATION, TAG_NUMBER_OF_FRAMES, TAG_NUMBER_OF_BYTES];

/// Writing application and date stamped on statistics tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritingInfo {
    pub app: String,
    /// `None` omits the date tag.
    pub date: Option<DateTime<Utc>>,
}

impl WritingInfo {
    /// Stamp `app` and the current time, or the fixed placeholder app
    /// and no date when `no_variable_data` is set.
    pub fn new(app: impl Into<String>, no_variable_data: bool) -> Self {
        if no_variable_data {
            Self::no_variable_data()
        } else {
            Self {
                app: app.into(),
                date: Some(Utc::now()),
            }
        }
    }

    pub fn no_variable_data() -> Self {
        Self {
            app: NO_VARIABLE_DATA_APP.to_string(),
            date: None,
        }
    }
}

/// Running totals for one track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackStatistics {
    track_uid: u64,
    num_frames: u64,
    num_bytes: u64,
    min_timestamp: Option<u64>,
    max_timestamp_end: Option<u64>,
}

impl TrackStatistics {
    pub fn new(track_uid: u64) -> Self {
        Self {
            track_uid,
            ..Self::default()
        }
    }

    /// Account one frame.
    pub fn account(&mut self, timestamp: u64, duration: u64, num_bytes: u64) {
        self.num_frames += 1;
        self.num_bytes += num_bytes;

        if self.min_timestamp.map_or(true, |min| timestamp < min) {
            self.min_timestamp = Some(timestamp);
        }

        let end = timestamp.saturating_add(duration);
        if self.max_timestamp_end.map_or(true, |max| end > max) {
            self.max_timestamp_end = Some(end);
        }
    }

    /// Fold another accumulator for the same track into this one.
    pub fn merge(&mut self, other: &TrackStatistics) {
        self.num_frames += other.num_frames;
        self.num_bytes += other.num_bytes;
        self.min_timestamp = match (self.min_timestamp, other.min_timestamp) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max_timestamp_end = match (self.max_timestamp_end, other.max_timestamp_end) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    pub fn track_uid(&self) -> u64 {
        self.track_uid
    }

    pub fn num_frames(&self) -> u64 {
        self.num_frames
    }

    pub fn num_bytes(&self) -> u64 {
        self.num_bytes
    }

    /// Span from the earliest frame start to the latest frame end in ns.
    pub fn duration(&self) -> Option<u64> {
        Some(self.max_timestamp_end? - self.min_timestamp?)
    }

    /// Average bit rate, `None` while the duration is unknown or zero.
    pub fn bits_per_second(&self) -> Option<u64> {
        let duration = self.duration().filter(|d| *d > 0)?;
        let bps = self.num_bytes as f64 * 8.0 * 1_000_000_000.0 / duration as f64;
        Some(bps.round() as u64)
    }

    /// Build the statistics tag for this track.
    pub fn create_tag(&self, writing: &WritingInfo) -> Element {
        let mut tag = Element::master_with(
            ids::TAG,
            vec![Element::master_with(
                ids::TAG_TARGETS,
                vec![
                    Element::unsigned(ids::TAG_TARGET_TYPE_VALUE, 50),
                    Element::utf8(ids::TAG_TARGET_TYPE, "MOVIE"),
                ],
            )],
        );
        set_track_uid_target(&mut tag, self.track_uid);

        tag.push(simple_tag(TAG_BPS, &self.bits_per_second().unwrap_or(0).to_string()));
        tag.push(simple_tag(TAG_DURATION, &format_timestamp_ns(self.duration().unwrap_or(0))));
        tag.push(simple_tag(TAG_NUMBER_OF_FRAMES, &self.num_frames.to_string()));
        tag.push(simple_tag(TAG_NUMBER_OF_BYTES, &self.num_bytes.to_string()));
        tag.push(simple_tag(TAG_WRITING_APP, &writing.app));
        if let Some(date) = writing.date {
            tag.push(simple_tag(
                TAG_WRITING_DATE_UTC,
                &date.format("%Y-%m-%d %H:%M:%S").to_string(),
            ));
        }
        tag.push(simple_tag(TAG_STATISTICS_TAGS, &ACCOUNTED_TAGS.join(" ")));

        tag
    }
}

fn simple_tag(name: &str, value: &str) -> Element {
    Element::master_with(
        ids::SIMPLE_TAG,
        vec![
            Element::utf8(ids::TAG_NAME, name),
            Element::utf8(ids::TAG_LANGUAGE, "eng"),
            Element::unsigned(ids::TAG_DEFAULT, 1),
            Element::utf8(ids::TAG_STRING, value),
        ],
    )
}

/// Value of the simple tag called `name`.
pub fn simple_tag_value<'a>(tag: &'a Element, name: &str) -> Option<&'a str> {
    tag.children_of(ids::SIMPLE_TAG)
        .find(|s| s.child_str(ids::TAG_NAME) == Some(name))
        .and_then(|s| s.child_str(ids::TAG_STRING))
}

/// Whether every simple tag of `tag` uses the statistics vocabulary.
pub fn is_statistics_tag(tag: &Element) -> bool {
    let mut simple_tags = tag.children_of(ids::SIMPLE_TAG).peekable();
    if simple_tags.peek().is_none() {
        return false;
    }
    simple_tags.all(|s| {
        s.child_str(ids::TAG_NAME)
            .is_some_and(|name| STATISTICS_VOCABULARY.contains(&name))
    })
}

/// Remove statistics tags, optionally only those targeting `track_uid`.
///
/// Returns the number of tags removed.
pub fn remove_track_statistics(tags: &mut Element, track_uid: Option<u64>) -> usize {
    let before = tags.len();
    tags.retain_children(|tag| {
        let matches = tag.is(ids::TAG)
            && is_statistics_tag(tag)
            && track_uid.map_or(true, |uid| get_tuid(tag) == Some(uid));
        !matches
    });
    before - tags.len()
}
