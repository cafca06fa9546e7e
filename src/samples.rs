//! Sample payload decoding.
//!
//! Dispatch is a closed `match` over [`SampleFormat`]. Every variant must
//! consume exactly the payload span the channel set layout assigns to a
//! trace and yield exactly the declared number of samples.

use thiserror::Error;

use crate::codec;
use crate::types::{ByteOrder, SampleFormat};

/// Samples per 10-byte group in the packed 20-bit format.
const PACKED_GROUP_SAMPLES: usize = 4;
const PACKED_GROUP_LEN: usize = 10;

/// Why one trace's payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleDecodeError {
    #[error("payload is {actual} bytes, {format} needs {expected}")]
    SpanLength {
        format: SampleFormat,
        expected: usize,
        actual: usize,
    },

    #[error("sample {index} is not a finite float")]
    NonFinite { index: usize },
}

/// Raw decoded sample values, before descaling.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Int(v) => v.len(),
            Samples::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to physical units by multiplying with `scale`.
    pub fn scaled(&self, scale: f64) -> Vec<f64> {
        match self {
            Samples::Int(v) => v.iter().map(|&x| x as f64 * scale).collect(),
            Samples::Float(v) => v.iter().map(|&x| x as f64 * scale).collect(),
        }
    }
}

/// Decode one trace payload of `num_samples` values.
pub fn decode_samples(
    data: &[u8],
    format: SampleFormat,
    num_samples: usize,
    byte_order: ByteOrder,
) -> Result<Samples, SampleDecodeError> {
    let expected = format
        .payload_len(num_samples)
        .unwrap_or(usize::MAX);
    if data.len() != expected {
        return Err(SampleDecodeError::SpanLength {
            format,
            expected,
            actual: data.len(),
        });
    }

    match format {
        SampleFormat::Float32 => decode_float32(data, byte_order),
        SampleFormat::Int32 => Ok(Samples::Int(
            data.chunks_exact(4)
                .map(|b| codec::i32_at(b, byte_order))
                .collect(),
        )),
        SampleFormat::Int24 => Ok(Samples::Int(
            data.chunks_exact(3)
                .map(|b| codec::i24_at(b, byte_order))
                .collect(),
        )),
        SampleFormat::Packed20 => Ok(decode_packed20(data, num_samples, byte_order)),
    }
}

fn decode_float32(data: &[u8], byte_order: ByteOrder) -> Result<Samples, SampleDecodeError> {
    let mut samples = Vec::with_capacity(data.len() / 4);
    for (index, b) in data.chunks_exact(4).enumerate() {
        let val = codec::f32_at(b, byte_order);
        if !val.is_finite() {
            return Err(SampleDecodeError::NonFinite { index });
        }
        samples.push(val);
    }
    Ok(Samples::Float(samples))
}

/// Each group: a 16-bit word holding four 4-bit exponents (first sample in
/// the top nibble), then four signed 16-bit mantissas. value = m * 2^e.
fn decode_packed20(data: &[u8], num_samples: usize, byte_order: ByteOrder) -> Samples {
    let mut samples = Vec::with_capacity(num_samples);
    for group in data.chunks_exact(PACKED_GROUP_LEN) {
        let exponents = codec::u16_at(&group[0..2], byte_order);
        for i in 0..PACKED_GROUP_SAMPLES {
            // Padding mantissas of the last group are ignored
            if samples.len() == num_samples {
                break;
            }
            let exp = (exponents >> (12 - 4 * i)) & 0x0F;
            let mantissa = codec::i16_at(&group[2 + 2 * i..4 + 2 * i], byte_order);
            samples.push((mantissa as i32) << exp);
        }
    }
    Samples::Int(samples)
}

/// Inverse of [`decode_packed20`], choosing the smallest exponent that
/// represents each value exactly enough for round trips.
#[cfg(any(test, feature = "synth"))]
pub(crate) fn encode_packed20(values: &[i32], byte_order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len().div_ceil(4) * PACKED_GROUP_LEN);
    for chunk in values.chunks(PACKED_GROUP_SAMPLES) {
        let mut exponents = 0u16;
        let mut mantissas = [0i16; PACKED_GROUP_SAMPLES];
        for (i, &v) in chunk.iter().enumerate() {
            let mut exp = 0u16;
            while exp < 15 && !(i16::MIN as i32..=i16::MAX as i32).contains(&(v >> exp)) {
                exp += 1;
            }
            exponents |= exp << (12 - 4 * i);
            mantissas[i] = (v >> exp) as i16;
        }
        match byte_order {
            ByteOrder::Big => out.extend_from_slice(&exponents.to_be_bytes()),
            ByteOrder::Little => out.extend_from_slice(&exponents.to_le_bytes()),
        }
        for m in mantissas {
            match byte_order {
                ByteOrder::Big => out.extend_from_slice(&m.to_be_bytes()),
                ByteOrder::Little => out.extend_from_slice(&m.to_le_bytes()),
            }
        }
    }
    out
}
