//! Track statistics accounting over a segment's clusters.

use std::collections::BTreeMap;

use tracing::{debug, info, trace, warn};

use super::decoder::{ContentDecoder, TrackContentDecoder, SCOPE_BLOCK};
use super::error::{TagError, TagResult};
use super::source::{Block, Cluster, ClusterBlock, SegmentSource};
use super::statistics::{remove_track_statistics, TrackStatistics, WritingInfo};
use crate::ebml::{ids, Element};
use crate::logging::ProgressReporter;

/// Timestamp scale used when the segment info doesn't carry one.
pub const DEFAULT_TIMESTAMP_SCALE: u64 = 1_000_000;

/// Outcome of a statistics pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsOutcome {
    /// Statistics tags were written for this many tracks.
    Updated { tracks: usize },
    /// The segment has no tracks to compute statistics for.
    NothingToDo,
}

#[derive(Debug)]
struct TrackState {
    default_duration: u64,
    decoder: TrackContentDecoder,
    statistics: TrackStatistics,
}

/// Accumulates per-track statistics cluster by cluster.
#[derive(Debug)]
pub struct StatisticsAccountant {
    timestamp_scale: u64,
    tracks: BTreeMap<u64, TrackState>,
}

impl StatisticsAccountant {
    /// Set up accumulators from the segment's `Tracks` and `Info`.
    ///
    /// Returns `Ok(None)` when there is no track to account. Fails if
    /// any track uses a content encoding that cannot be reversed.
    pub fn from_headers(tracks: Option<&Element>, info: Option<&Element>) -> TagResult<Option<Self>> {
        let timestamp_scale = info
            .and_then(|i| i.child_u64(ids::TIMESTAMP_SCALE))
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TIMESTAMP_SCALE);

        let mut states = BTreeMap::new();
        for track in tracks.into_iter().flat_map(|t| t.children_of(ids::TRACK_ENTRY)) {
            let Some(number) = track.child_u64(ids::TRACK_NUMBER) else {
                continue;
            };
            let uid = track.child_u64(ids::TRACK_UID).unwrap_or(0);

            let decoder = TrackContentDecoder::from_track(track);
            if let Some(reason) = decoder.unsupported_reason() {
                debug!("Track {} uses unsupported {}", number, reason);
                return Err(TagError::UnsupportedContentEncoding {
                    track_number: number,
                });
            }

            states.insert(
                number,
                TrackState {
                    default_duration: track.child_u64(ids::DEFAULT_DURATION).unwrap_or(0),
                    decoder,
                    statistics: TrackStatistics::new(uid),
                },
            );
        }

        if states.is_empty() {
            return Ok(None);
        }

        debug!(
            "Accounting {} tracks with timestamp scale {}",
            states.len(),
            timestamp_scale
        );

        Ok(Some(Self {
            timestamp_scale,
            tracks: states,
        }))
    }

    pub fn timestamp_scale(&self) -> u64 {
        self.timestamp_scale
    }

    /// Account every frame of every block in `cluster`.
    pub fn account_cluster(&mut self, cluster: &Cluster) -> TagResult<()> {
        let cluster_ts = cluster.timestamp as i128 * self.timestamp_scale as i128;

        for child in &cluster.blocks {
            let (block, block_duration) = match child {
                ClusterBlock::Simple(block) => (block, None),
                ClusterBlock::Group {
                    block: Some(block),
                    duration,
                } => (block, *duration),
                ClusterBlock::Group { block: None, .. } => continue,
            };
            self.account_block(cluster_ts, block, block_duration)?;
        }

        Ok(())
    }

    fn account_block(
        &mut self,
        cluster_ts: i128,
        block: &Block,
        block_duration: Option<u64>,
    ) -> TagResult<()> {
        if block.frames.is_empty() {
            return Ok(());
        }
        let scale = self.timestamp_scale;
        let Some(state) = self.tracks.get_mut(&block.track_number) else {
            trace!("Skipping block of untracked track {}", block.track_number);
            return Ok(());
        };

        let num_frames = block.frames.len() as u64;
        let frame_duration = match block_duration {
            Some(duration) => duration.saturating_mul(scale) / num_frames,
            None => state.default_duration,
        };

        let base = cluster_ts + block.relative_timestamp as i128 * scale as i128;
        let base = u64::try_from(base.max(0)).unwrap_or(u64::MAX);

        for (idx, frame) in block.frames.iter().enumerate() {
            let timestamp = base.saturating_add((idx as u64).saturating_mul(frame_duration));
            let decoded = state.decoder.reverse(frame.clone(), SCOPE_BLOCK)?;
            state
                .statistics
                .account(timestamp, frame_duration, decoded.len() as u64);
        }

        Ok(())
    }

    /// Stream all clusters of `source` from its first cluster.
    pub fn account_all_clusters(
        &mut self,
        source: &mut impl SegmentSource,
        progress: &mut ProgressReporter,
    ) -> TagResult<()> {
        info!("The file is read in order to create track statistics.");
        source.rewind_clusters()?;

        let size = source.size();
        while let Some(cluster) = source.read_next_cluster()? {
            self.account_cluster(&cluster)?;
            progress.report_position(source.position(), size);
        }
        progress.finish();

        Ok(())
    }

    /// Statistics of the track with this number.
    pub fn statistics(&self, track_number: u64) -> Option<&TrackStatistics> {
        self.tracks.get(&track_number).map(|s| &s.statistics)
    }

    /// Append one statistics tag per track, by ascending track number.
    pub fn create_tags(&self, tags: &mut Element, writing: &WritingInfo) {
        for state in self.tracks.values() {
            tags.push(state.statistics.create_tag(writing));
        }
    }
}

/// Recompute statistics for every track and replace existing ones.
pub fn add_or_replace_track_statistics_tags(
    tags: &mut Element,
    source: &mut impl SegmentSource,
    writing: &WritingInfo,
    progress: &mut ProgressReporter,
) -> TagResult<StatisticsOutcome> {
    let tracks = source.read_tracks()?;
    let info = source.read_segment_info()?;

    let Some(mut accountant) = StatisticsAccountant::from_headers(tracks.as_ref(), info.as_ref())? else {
        warn!("No track headers were found for which statistics could be calculated.");
        return Ok(StatisticsOutcome::NothingToDo);
    };

    let removed = remove_track_statistics(tags, None);
    debug!("Removed {} existing statistics tags", removed);

    accountant.account_all_clusters(source, progress)?;
    accountant.create_tags(tags, writing);

    Ok(StatisticsOutcome::Updated {
        tracks: accountant.tracks.len(),
    })
}
