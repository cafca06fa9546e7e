//! Decoder output types.
//!
//! [`TraceRecord`] is one decoded trace; [`DecodedFile`] holds the file's
//! headers and all traces in file order; [`DecodeReport`] adds the
//! trace-local warnings collected along the way.

use std::fmt;

use crate::channel_set::ChannelSetDescriptor;
use crate::header::{ExtendedHeader, GeneralHeader};
use crate::samples::SampleDecodeError;
use crate::time::NanoTime;

/// Receiver identity of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChannelId {
    pub line: u32,
    pub point: u32,
    pub index: u8,
    /// Sensor component code.
    pub code: u8,
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.line, self.point, self.index, self.code)
    }
}

/// One decoded trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRecord {
    pub channel: ChannelId,
    /// Index into [`DecodedFile::channel_sets`].
    pub channel_set: usize,
    pub trace_number: Option<u32>,
    /// Seconds between samples.
    pub sample_interval: f64,
    pub start_time: NanoTime,
    /// Samples in the trace. Equals `samples.len()` unless decoded head-only.
    pub npts: usize,
    /// Samples in physical units (raw value times `scale`).
    pub samples: Vec<f64>,
    /// Factor applied to the raw values.
    pub scale: f64,
}

impl TraceRecord {
    pub fn sample_rate(&self) -> f64 {
        1.0 / self.sample_interval
    }

    pub fn interval_nanos(&self) -> i64 {
        (self.sample_interval * 1e9).round() as i64
    }

    /// Time of the last sample.
    pub fn end_time(&self) -> NanoTime {
        let span = (self.npts.saturating_sub(1) as i64).saturating_mul(self.interval_nanos());
        self.start_time.add_nanos(span)
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} - {} | {} Hz | {} samples",
            self.channel,
            self.start_time,
            self.end_time(),
            self.sample_rate(),
            self.npts,
        )
    }
}

/// Headers and traces of one file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFile {
    pub header: GeneralHeader,
    pub extended: Option<ExtendedHeader>,
    pub channel_sets: Vec<ChannelSetDescriptor>,
    pub traces: Vec<TraceRecord>,
}

/// A condition confined to one trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceIssue {
    /// The trace's own sample count disagrees with its channel set. The
    /// trace is decoded with the channel set's count.
    TraceSizeMismatch { expected: usize, reported: usize },
    /// The trace's own extension count disagrees with its channel set. The
    /// trace is decoded with the channel set's count.
    ExtensionCountMismatch { expected: u8, reported: u8 },
    /// The payload could not be decoded; the trace is omitted.
    SampleDecodeError(SampleDecodeError),
}

impl fmt::Display for TraceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TraceSizeMismatch { expected, reported } => write!(
                f,
                "trace reports {reported} samples, channel set declares {expected}"
            ),
            Self::ExtensionCountMismatch { expected, reported } => write!(
                f,
                "trace reports {reported} extension blocks, channel set declares {expected}"
            ),
            Self::SampleDecodeError(e) => write!(f, "sample decode failed: {e}"),
        }
    }
}

/// A trace recovered with reduced confidence, or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceWarning {
    /// Position of the trace block in the file, counting from 0.
    pub trace_index: usize,
    pub channel_set: usize,
    /// Offset of the trace block.
    pub offset: usize,
    pub issue: TraceIssue,
}

impl fmt::Display for TraceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trace {} (channel set {}, byte {}): {}",
            self.trace_index, self.channel_set, self.offset, self.issue
        )
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeReport {
    pub file: DecodedFile,
    pub warnings: Vec<TraceWarning>,
    /// Offset of the first trace block that did not fit in the buffer.
    pub truncated_at: Option<usize>,
}

impl DecodeReport {
    pub fn is_truncated(&self) -> bool {
        self.truncated_at.is_some()
    }

    /// No warnings and no truncation.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && !self.is_truncated()
    }

    pub fn traces(&self) -> &[TraceRecord] {
        &self.file.traces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(npts: usize) -> TraceRecord {
        TraceRecord {
            channel: ChannelId {
                line: 1,
                point: 2,
                index: 1,
                code: 3,
            },
            channel_set: 0,
            trace_number: Some(1),
            sample_interval: 0.002,
            start_time: NanoTime::epoch(),
            npts,
            samples: vec![0.0; npts],
            scale: 1.0,
        }
    }

    #[test]
    fn test_end_time() {
        let rec = record(501);
        assert_eq!(rec.interval_nanos(), 2_000_000);
        assert_eq!(rec.sample_rate(), 500.0);
        assert_eq!(rec.end_time().to_epoch_nanos(), 1_000_000_000);
        assert_eq!(record(0).end_time(), NanoTime::epoch());
    }

    #[test]
    fn test_display() {
        let rec = record(1);
        assert_eq!(rec.channel.to_string(), "1.2.1.3");
        assert!(rec.to_string().starts_with("1.2.1.3 | 1970-001 00:00:00.000000000"));
    }

    #[test]
    fn test_warning_display() {
        let w = TraceWarning {
            trace_index: 4,
            channel_set: 1,
            offset: 900,
            issue: TraceIssue::TraceSizeMismatch {
                expected: 10,
                reported: 12,
            },
        };
        assert_eq!(
            w.to_string(),
            "trace 4 (channel set 1, byte 900): trace reports 12 samples, channel set declares 10"
        );
    }
}
