//! Channel set descriptor table.
//!
//! One 32-byte descriptor per channel set follows the general header
//! region. Together with the general header they fix the size of every
//! trace block in the file, so all offset arithmetic downstream is derived
//! from the [`ChannelSetTable`] built here.

use std::fmt;

use crate::codec;
use crate::cursor::ByteCursor;
use crate::header::{BLOCK_LEN, GeneralHeader};
use crate::trace::TRACE_HEADER_LEN;
use crate::types::SampleFormat;
use crate::{Rg16Error, Result};

/// Channel set start/end times are stored in units of 2 ms.
const TIME_UNIT_MICROS: u64 = 2_000;

/// A sample format code of zero inherits the general header's code.
const INHERIT_FORMAT: u32 = 0;

/// One decoded channel set descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSetDescriptor {
    pub scan_type: u32,
    pub number: u32,
    /// Start of the recording window, 2 ms units.
    pub start_time: u16,
    /// End of the recording window, 2 ms units.
    pub end_time: u16,
    /// Descale multiplier: a power-of-two exponent with LSB 2^-10.
    pub descale: i16,
    pub channels: u32,
    pub channel_type: u8,
    pub format: SampleFormat,
    /// Trace header extension blocks attached to every trace of the set.
    pub extension_count: u8,
    pub ru_channel: u8,
    pub samples_per_trace: usize,
}

impl ChannelSetDescriptor {
    /// Factor converting raw sample values to physical units.
    pub fn scale(&self) -> f64 {
        (self.descale as f64 / 1024.0).exp2()
    }
}

impl fmt::Display for ChannelSetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "set {} | {} channels | {} samples ({}) | {} ext",
            self.number, self.channels, self.samples_per_trace, self.format, self.extension_count,
        )
    }
}

/// Byte sizes of one trace block in a channel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLayout {
    pub header: usize,
    pub extensions: usize,
    pub payload: usize,
    pub total: usize,
}

impl TraceLayout {
    fn for_descriptor(desc: &ChannelSetDescriptor) -> Option<Self> {
        let extensions = desc.extension_count as usize * BLOCK_LEN;
        let payload = desc.format.payload_len(desc.samples_per_trace)?;
        let total = TRACE_HEADER_LEN
            .checked_add(extensions)?
            .checked_add(payload)?;
        Some(Self {
            header: TRACE_HEADER_LEN,
            extensions,
            payload,
            total,
        })
    }
}

/// Everything the trace scanner needs to walk the trace region.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSetTable {
    pub descriptors: Vec<ChannelSetDescriptor>,
    pub layouts: Vec<TraceLayout>,
    /// Sum of channel counts across all descriptors.
    pub trace_count: usize,
    /// Offset of the extended header region (right after the table).
    pub extended_start: usize,
    /// Offset of the first trace block.
    pub trace_region_start: usize,
}

/// Parse the descriptor table that follows the general header region.
///
/// Leaves the cursor at the start of the trace region.
pub fn parse_channel_sets(
    cur: &mut ByteCursor<'_>,
    header: &GeneralHeader,
) -> Result<ChannelSetTable> {
    cur.seek(header.region_len())?;

    let count = header.channel_sets as usize;
    let mut descriptors = Vec::with_capacity(count.min(cur.remaining() / BLOCK_LEN));
    let mut layouts = Vec::with_capacity(descriptors.capacity());
    let mut trace_count: usize = 0;

    for _ in 0..count {
        let offset = cur.position();
        let block = cur.read(BLOCK_LEN)?;
        let desc = parse_descriptor(block, offset, header, cur)?;
        let layout = TraceLayout::for_descriptor(&desc)
            .ok_or_else(|| Rg16Error::malformed(offset, "trace block size overflows"))?;
        trace_count = trace_count
            .checked_add(desc.channels as usize)
            .ok_or_else(|| Rg16Error::malformed(offset + 8, "total channel count overflows"))?;

        log::debug!("channel set at {offset}: {desc}, {} bytes per trace", layout.total);
        descriptors.push(desc);
        layouts.push(layout);
    }

    let extended_start = cur.position();
    let trailing_blocks = header.extended_headers as usize + header.external_headers as usize;
    let trace_region_start = trailing_blocks
        .checked_mul(BLOCK_LEN)
        .and_then(|n| n.checked_add(extended_start))
        .ok_or_else(|| Rg16Error::malformed(extended_start, "header block counts overflow"))?;
    // Extended and external headers belong to the header region: running
    // out of bytes here is fatal.
    cur.seek(trace_region_start)?;

    log::debug!(
        "{} channel sets, {trace_count} traces, trace region at {trace_region_start}",
        descriptors.len()
    );

    Ok(ChannelSetTable {
        descriptors,
        layouts,
        trace_count,
        extended_start,
        trace_region_start,
    })
}

fn parse_descriptor(
    block: &[u8],
    offset: usize,
    header: &GeneralHeader,
    cur: &ByteCursor<'_>,
) -> Result<ChannelSetDescriptor> {
    let order = cur.byte_order();
    let bcd_field = |start: usize, len: usize, name: &str| {
        codec::bcd(&block[start..start + len])
            .ok_or_else(|| Rg16Error::malformed(offset + start, format!("{name} is not valid BCD")))
    };

    let scan_type = bcd_field(0, 1, "scan type")?;
    let number = bcd_field(1, 1, "channel set number")?;
    let start_time = codec::u16_at(&block[2..4], order);
    let end_time = codec::u16_at(&block[4..6], order);
    let descale = codec::i16_at(&block[6..8], order);
    let channels = bcd_field(8, 2, "channel count")?;
    let channel_type = codec::high_nibble(block[10]);

    let format_code = match bcd_field(26, 2, "sample format code")? {
        INHERIT_FORMAT => header.format_code,
        code => code,
    };
    let format = SampleFormat::from_code(format_code).ok_or_else(|| {
        Rg16Error::malformed(offset + 26, format!("unknown sample format code {format_code}"))
    })?;

    let extension_count = codec::low_nibble(block[28]);
    let ru_channel = block[30];

    if end_time < start_time {
        return Err(Rg16Error::malformed(
            offset + 4,
            format!("end time {end_time} precedes start time {start_time}"),
        ));
    }
    let span_micros = (end_time - start_time) as u64 * TIME_UNIT_MICROS;
    let interval = header.sample_interval.micros() as u64;
    if span_micros % interval != 0 {
        return Err(Rg16Error::malformed(
            offset + 2,
            format!("{span_micros} us window is not a whole number of {interval} us samples"),
        ));
    }

    Ok(ChannelSetDescriptor {
        scan_type,
        number,
        start_time,
        end_time,
        descale,
        channels,
        channel_type,
        format,
        extension_count,
        ru_channel,
        samples_per_trace: (span_micros / interval) as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::parse_general_header;
    use crate::synth::{ChannelSetSpec, FileSpec, build_file};

    fn table_for(spec: &FileSpec) -> Result<ChannelSetTable> {
        let data = build_file(spec);
        parse_table(&data)
    }

    fn parse_table(data: &[u8]) -> Result<ChannelSetTable> {
        let header = parse_general_header(data)?;
        let mut cur = ByteCursor::new(data, header.byte_order());
        parse_channel_sets(&mut cur, &header)
    }

    fn descriptor_offset(set: usize) -> usize {
        64 + set * BLOCK_LEN
    }

    #[test]
    fn test_trace_count_is_sum_of_channels() {
        let spec = FileSpec {
            channel_sets: vec![
                ChannelSetSpec::float32(3, 4),
                ChannelSetSpec::float32(5, 4),
                ChannelSetSpec::float32(0, 4),
            ],
            ..FileSpec::default()
        };
        let table = table_for(&spec).unwrap();
        assert_eq!(table.descriptors.len(), 3);
        assert_eq!(table.trace_count, 8);
    }

    #[test]
    fn test_layout_sizes() {
        let spec = FileSpec {
            channel_sets: vec![
                ChannelSetSpec::float32(2, 4),
                ChannelSetSpec {
                    format: SampleFormat::Packed20,
                    extension_count: 1,
                    ..ChannelSetSpec::float32(1, 6)
                },
            ],
            ..FileSpec::default()
        };
        let table = table_for(&spec).unwrap();
        assert_eq!(table.descriptors[0].samples_per_trace, 4);
        assert_eq!(
            table.layouts[0],
            TraceLayout {
                header: 20,
                extensions: 3 * 32,
                payload: 16,
                total: 20 + 96 + 16
            }
        );
        assert_eq!(table.layouts[1].payload, 20);
        assert_eq!(table.layouts[1].total, 20 + 32 + 20);
    }

    #[test]
    fn test_trace_region_follows_extended_and_external_headers() {
        let spec = FileSpec {
            extended_headers: 3,
            external_headers: 2,
            ..FileSpec::default()
        };
        let table = table_for(&spec).unwrap();
        let n = spec.channel_sets.len();
        assert_eq!(table.extended_start, 64 + n * 32);
        assert_eq!(table.trace_region_start, 64 + n * 32 + 5 * 32);
    }

    #[test]
    fn test_zero_format_code_inherits_general_header() {
        let table = table_for(&FileSpec::default()).unwrap();
        assert_eq!(table.descriptors[0].format, SampleFormat::Float32);
    }

    #[test]
    fn test_unknown_format_code() {
        let mut data = build_file(&FileSpec::default());
        let off = descriptor_offset(0) + 26;
        data[off..off + 2].copy_from_slice(&[0x80, 0x48]);
        let err = parse_table(&data).unwrap_err();
        assert_eq!(
            err,
            Rg16Error::MalformedDescriptor {
                offset: off,
                reason: "unknown sample format code 8048".into()
            }
        );
    }

    #[test]
    fn test_invalid_bcd_channel_count() {
        let mut data = build_file(&FileSpec::default());
        let off = descriptor_offset(0) + 8;
        data[off] = 0xAB;
        let err = parse_table(&data).unwrap_err();
        assert!(matches!(err, Rg16Error::MalformedDescriptor { offset, .. } if offset == off));
    }

    #[test]
    fn test_end_before_start() {
        let mut data = build_file(&FileSpec::default());
        let off = descriptor_offset(0);
        data[off + 2..off + 4].copy_from_slice(&100u16.to_be_bytes());
        data[off + 4..off + 6].copy_from_slice(&10u16.to_be_bytes());
        let err = parse_table(&data).unwrap_err();
        assert!(matches!(err, Rg16Error::MalformedDescriptor { .. }));
    }

    #[test]
    fn test_fractional_sample_window() {
        // 4 ms interval, a 2 ms window is half a sample
        let mut data = build_file(&FileSpec::default());
        let off = descriptor_offset(0);
        data[off + 2..off + 4].copy_from_slice(&0u16.to_be_bytes());
        data[off + 4..off + 6].copy_from_slice(&1u16.to_be_bytes());
        assert!(matches!(
            parse_table(&data),
            Err(Rg16Error::MalformedDescriptor { .. })
        ));
    }

    #[test]
    fn test_truncated_table_is_out_of_bounds() {
        let data = build_file(&FileSpec::default());
        let err = parse_table(&data[..descriptor_offset(0) + 10]).unwrap_err();
        assert!(matches!(err, Rg16Error::OutOfBounds { .. }));
    }

    #[test]
    fn test_scale_from_descale() {
        let mut desc = table_for(&FileSpec::default()).unwrap().descriptors[0].clone();
        assert_eq!(desc.scale(), 1.0);
        desc.descale = 1024 * 3;
        assert_eq!(desc.scale(), 8.0);
        desc.descale = -1024;
        assert_eq!(desc.scale(), 0.5);
    }
}
