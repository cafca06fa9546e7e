//! Per-call decode configuration.

use crate::time::NanoTime;

/// Options for [`decode_with`](crate::decode_with).
///
/// The default decodes every trace with samples and no merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOptions {
    /// Skip sample payloads; records keep `npts` but have no samples.
    pub head_only: bool,
    /// Drop traces that end before this time.
    pub start_time: Option<NanoTime>,
    /// Drop traces that start after this time.
    pub end_time: Option<NanoTime>,
    /// Join contiguous traces of the same channel.
    pub merge: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_head_only(mut self, head_only: bool) -> Self {
        self.head_only = head_only;
        self
    }

    pub fn with_start_time(mut self, time: NanoTime) -> Self {
        self.start_time = Some(time);
        self
    }

    pub fn with_end_time(mut self, time: NanoTime) -> Self {
        self.end_time = Some(time);
        self
    }

    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    /// Whether a trace spanning `start..=end` overlaps the time window.
    pub fn accepts(&self, start: NanoTime, end: NanoTime) -> bool {
        let after_window = self.end_time.is_some_and(|t| start > t);
        let before_window = self.start_time.is_some_and(|t| end < t);
        !(after_window || before_window)
    }
}
