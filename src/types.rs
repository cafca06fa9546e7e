//! Shared types: [`ByteOrder`], [`FormatRevision`], [`SampleFormat`] and
//! [`SampleInterval`].

use std::fmt;

/// Byte order for multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

/// Receiver Gather format revision, from general header block 2.
///
/// Only 1.6 is decoded. The revision fixes the byte order of every field
/// in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRevision {
    /// Receiver Gather 1.6-1 (revision bytes `01 06`).
    Rev1_6,
}

impl FormatRevision {
    /// Map the two raw revision bytes to a known revision.
    pub fn from_bytes(bytes: [u8; 2]) -> Option<Self> {
        match bytes {
            [0x01, 0x06] => Some(Self::Rev1_6),
            _ => None,
        }
    }

    pub fn to_bytes(self) -> [u8; 2] {
        match self {
            Self::Rev1_6 => [0x01, 0x06],
        }
    }

    pub fn byte_order(self) -> ByteOrder {
        match self {
            Self::Rev1_6 => ByteOrder::Big,
        }
    }
}

impl fmt::Display for FormatRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rev1_6 => write!(f, "Receiver Gather 1.6-1"),
        }
    }
}

/// Sample encoding used by the traces of one channel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 20-bit packed: four 4-bit exponents then four i16 mantissas per
    /// 10-byte group (code 8015).
    Packed20,
    /// 24-bit two's complement integer (code 8036).
    Int24,
    /// 32-bit two's complement integer (code 8038).
    Int32,
    /// 32-bit IEEE float (code 8058).
    Float32,
}

impl SampleFormat {
    /// Convert a decoded (BCD) sample format code to a `SampleFormat`.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            8015 => Some(Self::Packed20),
            8036 => Some(Self::Int24),
            8038 => Some(Self::Int32),
            8058 => Some(Self::Float32),
            _ => None,
        }
    }

    pub fn to_code(self) -> u32 {
        match self {
            Self::Packed20 => 8015,
            Self::Int24 => 8036,
            Self::Int32 => 8038,
            Self::Float32 => 8058,
        }
    }

    /// Size in bytes of a payload holding `samples` values, or `None` on
    /// overflow.
    pub fn payload_len(self, samples: usize) -> Option<usize> {
        match self {
            Self::Packed20 => samples.div_ceil(4).checked_mul(10),
            Self::Int24 => samples.checked_mul(3),
            Self::Int32 | Self::Float32 => samples.checked_mul(4),
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Packed20 => write!(f, "PACKED20"),
            Self::Int24 => write!(f, "INT24"),
            Self::Int32 => write!(f, "INT32"),
            Self::Float32 => write!(f, "FLOAT32"),
        }
    }
}

/// Sample interval selected by the general header's base scan code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleInterval {
    /// 0.5 ms, 2000 Hz (base scan 8).
    HalfMs,
    /// 1 ms, 1000 Hz (base scan 16).
    OneMs,
    /// 2 ms, 500 Hz (base scan 32).
    TwoMs,
    /// 4 ms, 250 Hz (base scan 64).
    FourMs,
}

impl SampleInterval {
    pub fn from_base_scan(code: u8) -> Option<Self> {
        match code {
            8 => Some(Self::HalfMs),
            16 => Some(Self::OneMs),
            32 => Some(Self::TwoMs),
            64 => Some(Self::FourMs),
            _ => None,
        }
    }

    pub fn base_scan(self) -> u8 {
        match self {
            Self::HalfMs => 8,
            Self::OneMs => 16,
            Self::TwoMs => 32,
            Self::FourMs => 64,
        }
    }

    pub fn micros(self) -> u32 {
        match self {
            Self::HalfMs => 500,
            Self::OneMs => 1_000,
            Self::TwoMs => 2_000,
            Self::FourMs => 4_000,
        }
    }

    pub fn nanos(self) -> i64 {
        self.micros() as i64 * 1_000
    }

    pub fn seconds(self) -> f64 {
        self.micros() as f64 / 1_000_000.0
    }

    pub fn sample_rate(self) -> f64 {
        1_000_000.0 / self.micros() as f64
    }
}

impl fmt::Display for SampleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.sample_rate())
    }
}
