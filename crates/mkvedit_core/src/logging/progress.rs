//! Percent progress reporting with step filtering.

use tracing::info;

use super::types::ProgressCallback;

/// Reports progress of a long-running pass.
///
/// Only logs when the current step bucket differs from the last one
/// logged; 100% is always reported. The optional callback sees every
/// percentage that passes the filter.
pub struct ProgressReporter {
    step: u32,
    last: Option<u32>,
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    /// Create a reporter logging at `step` percent intervals.
    ///
    /// A step of 0 is treated as 1.
    pub fn new(step: u32) -> Self {
        Self {
            step: step.max(1),
            last: None,
            callback: None,
        }
    }

    /// Attach a callback.
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Report `percent` (clamped to 100).
    ///
    /// Returns true if the value was reported, false if filtered.
    pub fn report(&mut self, percent: u32) -> bool {
        let percent = percent.min(100);
        let bucket = percent / self.step;

        if let Some(last) = self.last {
            if percent < 100 && bucket <= last / self.step {
                return false;
            }
            if percent == 100 && last == 100 {
                return false;
            }
        }

        self.last = Some(percent);
        info!("Progress: {}%", percent);
        if let Some(cb) = self.callback.as_mut() {
            cb(percent);
        }
        true
    }

    /// Report progress from a byte position within a stream of `size` bytes.
    pub fn report_position(&mut self, position: u64, size: u64) -> bool {
        if size == 0 {
            return false;
        }
        let percent = (u128::from(position) * 100 / u128::from(size)).min(100) as u32;
        self.report(percent)
    }

    /// Report completion.
    pub fn finish(&mut self) {
        self.report(100);
    }

    /// Last reported percentage.
    pub fn last(&self) -> Option<u32> {
        self.last
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(20)
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("step", &self.step)
            .field("last", &self.last)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
