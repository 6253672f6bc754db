//! Segment and cluster access used by the statistics pass.
//!
//! Byte-level EBML reading happens elsewhere; implementors hand over
//! already materialized headers and clusters.

use super::error::TagResult;
use crate::ebml::Element;

/// A block holding one or more frames of a single track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub track_number: u64,
    /// Timestamp relative to the cluster, in timestamp-scale ticks.
    pub relative_timestamp: i16,
    /// Frame payloads as stored (still content-encoded).
    pub frames: Vec<Vec<u8>>,
}

/// Block-carrying children of a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterBlock {
    Simple(Block),
    Group {
        block: Option<Block>,
        /// `BlockDuration` in timestamp-scale ticks.
        duration: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cluster {
    /// Cluster timestamp in timestamp-scale ticks.
    pub timestamp: u64,
    pub blocks: Vec<ClusterBlock>,
}

/// Sequential cluster reader.
pub trait ClusterReader {
    /// Next cluster, `None` at the end of the segment.
    fn read_next_cluster(&mut self) -> TagResult<Option<Cluster>>;

    /// Current byte offset.
    fn position(&self) -> u64;

    /// Total size in bytes, used for progress.
    fn size(&self) -> u64;
}

/// A segment: headers plus a cluster stream.
pub trait SegmentSource: ClusterReader {
    /// The segment's `Tracks` element.
    fn read_tracks(&mut self) -> TagResult<Option<Element>>;

    /// The segment's `Info` element.
    fn read_segment_info(&mut self) -> TagResult<Option<Element>>;

    /// Restart cluster reading at the first cluster.
    fn rewind_clusters(&mut self) -> TagResult<()>;

    /// Whether the file is a WebM file.
    fn is_webm(&self) -> bool {
        false
    }
}

/// Segment held entirely in memory.
///
/// Positions count clusters rather than bytes.
#[derive(Debug, Clone, Default)]
pub struct MemorySegment {
    pub tracks: Option<Element>,
    pub info: Option<Element>,
    pub clusters: Vec<Cluster>,
    pub webm: bool,
    next: usize,
}

impl MemorySegment {
    pub fn new(tracks: Element, clusters: Vec<Cluster>) -> Self {
        Self {
            tracks: Some(tracks),
            clusters,
            ..Self::default()
        }
    }

    pub fn with_info(mut self, info: Element) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_webm(mut self, webm: bool) -> Self {
        self.webm = webm;
        self
    }
}

impl ClusterReader for MemorySegment {
    fn read_next_cluster(&mut self) -> TagResult<Option<Cluster>> {
        let cluster = self.clusters.get(self.next).cloned();
        if cluster.is_some() {
            self.next += 1;
        }
        Ok(cluster)
    }

    fn position(&self) -> u64 {
        self.next as u64
    }

    fn size(&self) -> u64 {
        self.clusters.len() as u64
    }
}

impl SegmentSource for MemorySegment {
    fn read_tracks(&mut self) -> TagResult<Option<Element>> {
        Ok(self.tracks.clone())
    }

    fn read_segment_info(&mut self) -> TagResult<Option<Element>> {
        Ok(self.info.clone())
    }

    fn rewind_clusters(&mut self) -> TagResult<()> {
        self.next = 0;
        Ok(())
    }

    fn is_webm(&self) -> bool {
        self.webm
    }
}
