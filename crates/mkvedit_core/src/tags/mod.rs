//! Tag editing and track statistics.
//!
//! This module provides:
//! - Target helpers and scope-based tag replacement
//! - Parsing of `all:`/`global:`/`track:` tag arguments
//! - Content decoding of track frames (zlib, header stripping)
//! - Per-track statistics accounting over a segment's clusters
//!
//! # Example
//!
//! ```no_run
//! use mkvedit_core::ebml::{ids, Element};
//! use mkvedit_core::logging::ProgressReporter;
//! use mkvedit_core::tags::{MemorySegment, TagOperation, WritingInfo};
//!
//! # fn segment() -> MemorySegment { MemorySegment::default() }
//! let mut source = segment();
//! let mut tags = Element::master(ids::TAGS);
//!
//! TagOperation::AddTrackStatistics
//!     .execute(
//!         &mut tags,
//!         &mut source,
//!         &WritingInfo::new("mkvedit", false),
//!         &mut ProgressReporter::new(10),
//!     )
//!     .unwrap();
//! ```

mod accountant;
mod decoder;
mod error;
mod operation;
mod replace;
mod source;
mod statistics;
mod targets;

pub use accountant::{
    add_or_replace_track_statistics_tags, StatisticsAccountant, StatisticsOutcome,
    DEFAULT_TIMESTAMP_SCALE,
};
pub use decoder::{ContentDecoder, TrackContentDecoder, SCOPE_BLOCK};
pub use error::{TagError, TagResult};
pub use operation::{parse_tag_spec, TagOperation, TrackSelector};
pub use replace::{replace_tags, TagScope};
pub use source::{Block, Cluster, ClusterBlock, ClusterReader, MemorySegment, SegmentSource};
pub use statistics::{
    is_statistics_tag, remove_track_statistics, simple_tag_value, TrackStatistics, WritingInfo,
    NO_VARIABLE_DATA_APP, STATISTICS_VOCABULARY, TAG_BPS, TAG_DURATION, TAG_NUMBER_OF_BYTES,
    TAG_NUMBER_OF_FRAMES, TAG_STATISTICS_TAGS, TAG_WRITING_APP, TAG_WRITING_DATE_UTC,
};
pub use targets::{get_cuid, get_tuid, remove_track_uid_targets, set_track_uid_target};
