//! Synthetic Receiver Gather files.
//!
//! Builds small, fully specified files for tests and benchmarks. Only
//! compiled for tests or with the `synth` feature.
//!
//! Generated sample values are exactly representable in every sample
//! format, so decoded traces can be compared with [`expected_samples`]
//! without tolerance.

use crate::codec::encode_bcd;
use crate::header::{
    BASE_SCAN_OFFSET, BLOCK_LEN, FORMAT_CODE, MANUFACTURER_CODE, MANUFACTURER_OFFSET, REVISION_OFFSET,
};
use crate::samples::encode_packed20;
use crate::time::NanoTime;
use crate::trace::TRACE_HEADER_LEN;
use crate::types::{ByteOrder, FormatRevision, SampleFormat, SampleInterval};

/// One channel set of a synthetic file.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSetSpec {
    pub channels: u32,
    pub samples: usize,
    pub format: SampleFormat,
    pub extension_count: u8,
    pub descale: i16,
    pub channel_type: u8,
    /// Raw values per channel. Generated when `None`.
    pub values: Option<Vec<Vec<f64>>>,
}

impl ChannelSetSpec {
    /// Float samples with the three usual extension blocks.
    pub fn float32(channels: u32, samples: usize) -> Self {
        Self {
            channels,
            samples,
            format: SampleFormat::Float32,
            extension_count: 3,
            descale: 0,
            channel_type: 1,
            values: None,
        }
    }

    /// Use explicit raw values, one vector per channel.
    pub fn with_values(mut self, values: Vec<Vec<f64>>) -> Self {
        self.values = Some(values);
        self
    }

    fn scale(&self) -> f64 {
        (self.descale as f64 / 1024.0).exp2()
    }

    fn trace_len(&self) -> usize {
        let payload = self
            .format
            .payload_len(self.samples)
            .expect("synthetic payload size overflows");
        TRACE_HEADER_LEN + self.extension_count as usize * BLOCK_LEN + payload
    }
}

/// Layout and content of a synthetic file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSpec {
    pub reference_time: NanoTime,
    pub interval: SampleInterval,
    /// General header blocks after the first, block 2 included.
    pub additional_blocks: u8,
    pub extended_headers: u32,
    pub external_headers: u32,
    pub channel_sets: Vec<ChannelSetSpec>,
    pub line: u32,
    /// Receiver point of channel 0; channel `n` sits at `first_point + n`.
    pub first_point: u32,
    /// Acquisition time written to extension block 3.
    pub start_micros: i64,
}

impl Default for FileSpec {
    fn default() -> Self {
        Self {
            reference_time: NanoTime {
                year: 2017,
                day: 216,
                hour: 12,
                minute: 30,
                second: 45,
                nanosecond: 0,
            },
            interval: SampleInterval::FourMs,
            additional_blocks: 1,
            extended_headers: 0,
            external_headers: 0,
            channel_sets: vec![ChannelSetSpec::float32(2, 4)],
            line: 7,
            first_point: 1001,
            start_micros: 1_501_849_845_250_000,
        }
    }
}

impl FileSpec {
    fn region_len(&self) -> usize {
        (self.additional_blocks.max(1) as usize + 1) * BLOCK_LEN
    }

    fn trace_count(&self) -> u32 {
        self.channel_sets.iter().map(|c| c.channels).sum()
    }
}

/// Offset of trace block `index` in the file built from `spec`.
///
/// `index` may equal the trace count, giving the file length.
pub fn trace_offset(spec: &FileSpec, index: usize) -> usize {
    let trailing = (spec.extended_headers + spec.external_headers) as usize;
    let mut offset = spec.region_len() + (spec.channel_sets.len() + trailing) * BLOCK_LEN;
    let mut left = index;
    for cs in &spec.channel_sets {
        let n = left.min(cs.channels as usize);
        offset += n * cs.trace_len();
        left -= n;
    }
    offset
}

/// Physical values the decoder should produce for one channel.
pub fn expected_samples(spec: &FileSpec, set: usize, channel: u32) -> Vec<f64> {
    let cs = &spec.channel_sets[set];
    let scale = cs.scale();
    raw_values(cs, set, channel)
        .into_iter()
        .map(|v| v * scale)
        .collect()
}

fn raw_values(cs: &ChannelSetSpec, set: usize, channel: u32) -> Vec<f64> {
    if let Some(values) = &cs.values {
        return values[channel as usize].clone();
    }
    (0..cs.samples)
        .map(|k| {
            let base = ((k * 37 + channel as usize * 11 + set * 5) % 200) as f64 - 100.0;
            match cs.format {
                SampleFormat::Float32 => base / 4.0,
                // Beyond 16 bits, so packed groups need non-zero exponents
                SampleFormat::Packed20 => base * 1024.0,
                SampleFormat::Int24 | SampleFormat::Int32 => base * 1000.0,
            }
        })
        .collect()
}

/// Serialize `spec` into a complete file.
///
/// # Panics
///
/// Panics if a channel set's samples do not fill a whole number of 2 ms
/// window units at the spec's interval.
pub fn build_file(spec: &FileSpec) -> Vec<u8> {
    let mut out = general_header(spec);

    for (i, cs) in spec.channel_sets.iter().enumerate() {
        out.extend_from_slice(&descriptor(spec, cs, i));
    }

    let mut extended = vec![0u8; spec.extended_headers as usize * BLOCK_LEN];
    if spec.extended_headers >= 3 {
        extended[47] = 1;
        extended[48..52].copy_from_slice(&spec.trace_count().to_be_bytes());
        extended[64..68].copy_from_slice(&spec.line.to_be_bytes());
        extended[68..72].copy_from_slice(&spec.first_point.to_be_bytes());
        extended[72] = 1;
    }
    out.extend_from_slice(&extended);
    out.resize(out.len() + spec.external_headers as usize * BLOCK_LEN, b' ');

    let mut index = 0u32;
    for (set, cs) in spec.channel_sets.iter().enumerate() {
        for channel in 0..cs.channels {
            index += 1;
            write_trace(&mut out, spec, cs, set, channel, index);
        }
    }
    out
}

fn general_header(spec: &FileSpec) -> Vec<u8> {
    let mut h = vec![0u8; spec.region_len()];
    let t = spec.reference_time;

    encode_bcd(&mut h[0..2], 1);
    encode_bcd(&mut h[2..4], FORMAT_CODE);
    encode_bcd(&mut h[10..11], t.year as u32 % 100);
    h[11] = (spec.additional_blocks << 4) | (t.day / 100) as u8;
    encode_bcd(&mut h[12..13], t.day as u32 % 100);
    encode_bcd(&mut h[13..14], t.hour as u32);
    encode_bcd(&mut h[14..15], t.minute as u32);
    encode_bcd(&mut h[15..16], t.second as u32);
    encode_bcd(&mut h[MANUFACTURER_OFFSET..MANUFACTURER_OFFSET + 1], MANUFACTURER_CODE);
    encode_bcd(&mut h[17..19], 1234);
    h[BASE_SCAN_OFFSET] = spec.interval.base_scan();

    write_count(&mut h, 28, 35..37, spec.channel_sets.len() as u32);
    write_count(&mut h, 30, 37..39, spec.extended_headers);
    write_count(&mut h, 31, 39..42, spec.external_headers);

    h[32..35].copy_from_slice(&1u32.to_be_bytes()[1..]);
    h[REVISION_OFFSET..REVISION_OFFSET + 2].copy_from_slice(&FormatRevision::Rev1_6.to_bytes());
    let record_ms = spec
        .channel_sets
        .iter()
        .map(|c| c.samples as u32 * spec.interval.micros() / 1_000)
        .max()
        .unwrap_or(0);
    h[46..49].copy_from_slice(&record_ms.to_be_bytes()[1..]);
    h
}

/// Small counts go in the BCD byte; larger ones in the block 2 field.
fn write_count(h: &mut [u8], at: usize, extended: std::ops::Range<usize>, count: u32) {
    let bytes = count.to_be_bytes();
    let width = extended.len();
    h[extended].copy_from_slice(&bytes[4 - width..]);
    if count > 99 {
        h[at] = 0xFF;
    } else {
        encode_bcd(&mut h[at..at + 1], count);
    }
}

fn descriptor(spec: &FileSpec, cs: &ChannelSetSpec, set: usize) -> [u8; BLOCK_LEN] {
    let mut d = [0u8; BLOCK_LEN];
    let span_micros = cs.samples as u64 * spec.interval.micros() as u64;
    assert_eq!(span_micros % 2_000, 0, "window must be whole 2 ms units");

    encode_bcd(&mut d[0..1], 1);
    encode_bcd(&mut d[1..2], set as u32 + 1);
    d[4..6].copy_from_slice(&((span_micros / 2_000) as u16).to_be_bytes());
    d[6..8].copy_from_slice(&cs.descale.to_be_bytes());
    encode_bcd(&mut d[8..10], cs.channels);
    d[10] = cs.channel_type << 4;
    // Float samples inherit the general header's format code
    if cs.format != SampleFormat::Float32 {
        encode_bcd(&mut d[26..28], cs.format.to_code());
    }
    d[28] = cs.extension_count & 0x0F;
    d
}

fn write_trace(
    out: &mut Vec<u8>,
    spec: &FileSpec,
    cs: &ChannelSetSpec,
    set: usize,
    channel: u32,
    index: u32,
) {
    let mut th = [0u8; TRACE_HEADER_LEN];
    th[0..2].copy_from_slice(&[0xFF, 0xFF]);
    encode_bcd(&mut th[2..3], 1);
    encode_bcd(&mut th[3..4], set as u32 + 1);
    encode_bcd(&mut th[4..6], index);
    th[9] = cs.extension_count;
    out.extend_from_slice(&th);

    let mut ext = vec![0u8; cs.extension_count as usize * BLOCK_LEN];
    if cs.extension_count >= 1 {
        ext[0..3].copy_from_slice(&spec.line.to_be_bytes()[1..]);
        ext[3..6].copy_from_slice(&(spec.first_point + channel).to_be_bytes()[1..]);
        ext[6] = 1;
        ext[7..10].copy_from_slice(&(cs.samples as u32).to_be_bytes()[1..]);
        ext[20] = cs.channel_type;
        ext[21..25].copy_from_slice(&index.to_be_bytes());
    }
    if cs.extension_count >= 3 {
        ext[64..72].copy_from_slice(&spec.start_micros.to_be_bytes());
    }
    out.extend_from_slice(&ext);

    let raw = raw_values(cs, set, channel);
    match cs.format {
        SampleFormat::Float32 => {
            for v in raw {
                out.extend_from_slice(&(v as f32).to_be_bytes());
            }
        }
        SampleFormat::Int32 => {
            for v in raw {
                out.extend_from_slice(&(v as i32).to_be_bytes());
            }
        }
        SampleFormat::Int24 => {
            for v in raw {
                out.extend_from_slice(&(v as i32).to_be_bytes()[1..]);
            }
        }
        SampleFormat::Packed20 => {
            let ints: Vec<i32> = raw.into_iter().map(|v| v as i32).collect();
            out.extend_from_slice(&encode_packed20(&ints, ByteOrder::Big));
        }
    }
}
