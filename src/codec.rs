//! Scalar field codecs.
//!
//! Pure functions over fixed-width byte spans. Widths are fixed by the
//! format layout, so a span of the wrong length is a caller bug and is only
//! checked in debug builds.

use crate::types::ByteOrder;

#[inline]
pub fn u16_at(bytes: &[u8], byte_order: ByteOrder) -> u16 {
    debug_assert_eq!(bytes.len(), 2);
    let b = [bytes[0], bytes[1]];
    match byte_order {
        ByteOrder::Big => u16::from_be_bytes(b),
        ByteOrder::Little => u16::from_le_bytes(b),
    }
}

#[inline]
pub fn i16_at(bytes: &[u8], byte_order: ByteOrder) -> i16 {
    u16_at(bytes, byte_order) as i16
}

/// Read a 3-byte unsigned integer.
#[inline]
pub fn u24_at(bytes: &[u8], byte_order: ByteOrder) -> u32 {
    debug_assert_eq!(bytes.len(), 3);
    match byte_order {
        ByteOrder::Big => u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]),
        ByteOrder::Little => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]),
    }
}

/// Read a 3-byte two's complement integer, sign-extended to 32 bits.
#[inline]
pub fn i24_at(bytes: &[u8], byte_order: ByteOrder) -> i32 {
    ((u24_at(bytes, byte_order) << 8) as i32) >> 8
}

#[inline]
pub fn u32_at(bytes: &[u8], byte_order: ByteOrder) -> u32 {
    debug_assert_eq!(bytes.len(), 4);
    let b = [bytes[0], bytes[1], bytes[2], bytes[3]];
    match byte_order {
        ByteOrder::Big => u32::from_be_bytes(b),
        ByteOrder::Little => u32::from_le_bytes(b),
    }
}

#[inline]
pub fn i32_at(bytes: &[u8], byte_order: ByteOrder) -> i32 {
    u32_at(bytes, byte_order) as i32
}

#[inline]
pub fn i64_at(bytes: &[u8], byte_order: ByteOrder) -> i64 {
    debug_assert_eq!(bytes.len(), 8);
    let b = [
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ];
    match byte_order {
        ByteOrder::Big => i64::from_be_bytes(b),
        ByteOrder::Little => i64::from_le_bytes(b),
    }
}

#[inline]
pub fn f32_at(bytes: &[u8], byte_order: ByteOrder) -> f32 {
    f32::from_bits(u32_at(bytes, byte_order))
}

#[inline]
pub fn high_nibble(byte: u8) -> u8 {
    byte >> 4
}

#[inline]
pub fn low_nibble(byte: u8) -> u8 {
    byte & 0x0F
}

/// Decode packed binary-coded decimal, two digits per byte, most
/// significant digit first.
///
/// Returns `None` if any nibble is above 9.
pub fn bcd(bytes: &[u8]) -> Option<u32> {
    bytes.iter().try_fold(0u32, |acc, &b| {
        let (hi, lo) = (high_nibble(b), low_nibble(b));
        if hi > 9 || lo > 9 {
            return None;
        }
        Some(acc * 100 + hi as u32 * 10 + lo as u32)
    })
}

/// Decode a single BCD digit stored in one nibble.
#[inline]
pub fn bcd_digit(nibble: u8) -> Option<u32> {
    (nibble <= 9).then_some(nibble as u32)
}

/// Encode `value` as packed BCD into `dest`, most significant digit first.
///
/// Digits that do not fit are dropped.
#[cfg(any(test, feature = "synth"))]
pub fn encode_bcd(dest: &mut [u8], mut value: u32) {
    for slot in dest.iter_mut().rev() {
        let lo = (value % 10) as u8;
        value /= 10;
        let hi = (value % 10) as u8;
        value /= 10;
        *slot = (hi << 4) | lo;
    }
}
