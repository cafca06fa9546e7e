//! Trace header and trace header extension blocks.

use crate::codec;
use crate::header::BLOCK_LEN;
use crate::types::ByteOrder;

/// Size of the fixed trace header preceding the extension blocks.
pub const TRACE_HEADER_LEN: usize = 20;

/// Fixed 20-byte trace header.
///
/// BCD fields are `None` when the producer left them unset (`0xFF..`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceHeader {
    pub file_number: Option<u32>,
    pub scan_type: Option<u32>,
    pub channel_set: Option<u32>,
    pub trace_number: Option<u32>,
    /// Timing offset from the reference time in units of 1/256 ms.
    pub first_timing_word: u32,
    /// Extension count as reported by the trace itself.
    pub extension_count: u8,
    pub sample_skew: u8,
    pub trace_edit: u8,
}

impl TraceHeader {
    /// Parse from exactly [`TRACE_HEADER_LEN`] bytes.
    pub fn parse(bytes: &[u8], order: ByteOrder) -> Self {
        debug_assert_eq!(bytes.len(), TRACE_HEADER_LEN);
        Self {
            file_number: codec::bcd(&bytes[0..2]),
            scan_type: codec::bcd(&bytes[2..3]),
            channel_set: codec::bcd(&bytes[3..4]),
            trace_number: codec::bcd(&bytes[4..6]),
            first_timing_word: codec::u24_at(&bytes[6..9], order),
            extension_count: bytes[9],
            sample_skew: bytes[10],
            trace_edit: bytes[11],
        }
    }

    /// First timing word converted to nanoseconds.
    pub fn timing_offset_nanos(&self) -> i64 {
        // 1/256 ms = 3906.25 ns
        self.first_timing_word as i64 * 15_625 / 4
    }
}

/// Receiver location and per-trace counts from extension block 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverInfo {
    pub line: u32,
    pub point: u32,
    pub index: u8,
    /// Samples in this trace as reported by the trace itself.
    pub samples: u32,
    pub sensor_code: u8,
    pub trace_count: u32,
}

/// Typed view of the extension blocks attached to one trace header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceHeaderExtension {
    /// Block 1.
    pub receiver: Option<ReceiverInfo>,
    /// Block 3: acquisition time in microseconds since the Unix epoch.
    pub acquisition_micros: Option<i64>,
    /// Number of 32-byte blocks present.
    pub blocks: usize,
}

impl TraceHeaderExtension {
    /// Parse a whole number of extension blocks.
    pub fn parse(raw: &[u8], order: ByteOrder) -> Self {
        debug_assert_eq!(raw.len() % BLOCK_LEN, 0);
        let mut blocks = raw.chunks_exact(BLOCK_LEN);
        let first = blocks.next();
        let third = blocks.nth(1);

        Self {
            receiver: first.map(|b| ReceiverInfo {
                line: codec::u24_at(&b[0..3], order),
                point: codec::u24_at(&b[3..6], order),
                index: b[6],
                samples: codec::u24_at(&b[7..10], order),
                sensor_code: b[20],
                trace_count: codec::u32_at(&b[21..25], order),
            }),
            acquisition_micros: third.map(|b| codec::i64_at(&b[0..8], order)),
            blocks: raw.len() / BLOCK_LEN,
        }
    }
}
