//! General header parsing and format detection.
//!
//! The two fixed general header blocks at offset 0 describe the file
//! identity and the sizes of every block that follows. Identity (format
//! code, manufacturer, revision) is checked before any other field is
//! interpreted.

use std::fmt;

use crate::codec;
use crate::cursor::ByteCursor;
use crate::time::NanoTime;
use crate::types::{ByteOrder, FormatRevision, SampleInterval};
use crate::{Rg16Error, Result};

/// Size of every header, descriptor and extension block.
pub const BLOCK_LEN: usize = 32;

/// BCD format code identifying Receiver Gather files.
pub const FORMAT_CODE: u32 = 8058;
/// BCD manufacturer code assigned to Fairfield.
pub const MANUFACTURER_CODE: u32 = 20;

pub(crate) const FORMAT_CODE_OFFSET: usize = 2;
pub(crate) const MANUFACTURER_OFFSET: usize = 16;
pub(crate) const REVISION_OFFSET: usize = 42;
pub(crate) const BASE_SCAN_OFFSET: usize = 22;

/// Count byte value meaning "see the extended field in block 2".
const EXTENDED_COUNT: u8 = 0xFF;

/// Decoded general header blocks 1 and 2.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralHeader {
    pub file_number: u32,
    /// Always [`FORMAT_CODE`] for a decoded file.
    pub format_code: u32,
    pub revision: FormatRevision,
    pub manufacturer_code: u32,
    /// `None` when the serial field is not valid BCD.
    pub manufacturer_serial: Option<u32>,
    /// General header blocks after the first, block 2 included.
    pub additional_blocks: u8,
    pub channel_sets: u32,
    pub extended_headers: u32,
    pub external_headers: u32,
    pub base_scan: u8,
    pub sample_interval: SampleInterval,
    pub record_length: u32,
    /// Recording start reference time.
    pub reference_time: NanoTime,
}

impl GeneralHeader {
    /// Total size of the general header region in bytes.
    pub fn region_len(&self) -> usize {
        (self.additional_blocks.max(1) as usize + 1) * BLOCK_LEN
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.revision.byte_order()
    }
}

impl fmt::Display for GeneralHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | file {} | {} channel sets | {} | {}",
            self.revision, self.file_number, self.channel_sets, self.sample_interval,
            self.reference_time,
        )
    }
}

/// Line and receiver metadata from the first three extended header blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedHeader {
    pub collection_method: u8,
    pub num_records: u32,
    pub line_number: u32,
    pub receiver_point: u32,
    pub point_index: u8,
}

/// Cheap format check: inspects only the identity fields.
///
/// Never fails; a buffer too short to hold the identity fields is simply
/// not a Receiver Gather file.
pub fn probe(data: &[u8]) -> bool {
    let cur = ByteCursor::new(data, ByteOrder::Big);
    let field = |offset, len| cur.peek_at(offset, len).ok();

    let format = field(FORMAT_CODE_OFFSET, 2).and_then(codec::bcd);
    let manufacturer = field(MANUFACTURER_OFFSET, 1).and_then(codec::bcd);
    let revision = field(REVISION_OFFSET, 2).and_then(|b| FormatRevision::from_bytes([b[0], b[1]]));

    format == Some(FORMAT_CODE) && manufacturer == Some(MANUFACTURER_CODE) && revision.is_some()
}

/// Parse the general header region starting at offset 0.
///
/// Any additional general header blocks are skipped; the returned header's
/// [`region_len()`](GeneralHeader::region_len) gives the offset of the channel set table.
pub fn parse_general_header(data: &[u8]) -> Result<GeneralHeader> {
    let revision = check_identity(data)?;
    let mut cur = ByteCursor::new(data, revision.byte_order());

    // --- Block 1 ---
    let file_number_bcd = cur.read_bcd(2)?;
    cur.skip(8)?; // format code + general constants
    let year_offset = cur.position();
    let year = cur.read_bcd(1)?;
    let packed = cur.read_u8()?;
    let additional_blocks = codec::high_nibble(packed);
    let day_hundreds = codec::bcd_digit(codec::low_nibble(packed));
    let day_rest = cur.read_bcd(1)?;
    let hour = cur.read_bcd(1)?;
    let minute = cur.read_bcd(1)?;
    let second = cur.read_bcd(1)?;
    cur.skip(1)?; // manufacturer code
    let manufacturer_serial = cur.read_bcd(2)?;
    cur.skip(3)?;
    let base_scan = cur.read_u8()?;
    cur.skip(5)?;
    let channel_sets_raw = cur.read_u8()?;
    cur.skip(1)?; // skew blocks
    let extended_raw = cur.read_u8()?;
    let external_raw = cur.read_u8()?;

    // --- Block 2 ---
    let expanded_file_number = cur.read_u24()?;
    let channel_sets_ext = cur.read_u16()?;
    let extended_ext = cur.read_u16()?;
    let external_ext = cur.read_u24()?;
    cur.skip(4)?; // revision + general trailer blocks
    let record_length = cur.read_u24()?;
    cur.skip(BLOCK_LEN * 2 - cur.position())?;

    // Blocks after block 2 carry nothing we decode, but they must be
    // present for the table that follows to be addressable.
    cur.skip(additional_blocks.saturating_sub(1) as usize * BLOCK_LEN)?;

    let sample_interval = SampleInterval::from_base_scan(base_scan).ok_or_else(|| {
        Rg16Error::unsupported(
            BASE_SCAN_OFFSET,
            format!("unsupported base scan interval code {base_scan}"),
        )
    })?;

    let reference_time = match (year, day_hundreds, day_rest, hour, minute, second) {
        (Some(yy), Some(dh), Some(dr), Some(h), Some(m), Some(s)) => {
            build_reference_time(yy, dh * 100 + dr, h, m, s)
                .ok_or_else(|| Rg16Error::unsupported(year_offset, "reference time out of range"))?
        }
        _ => {
            return Err(Rg16Error::unsupported(
                year_offset,
                "reference time is not valid BCD",
            ));
        }
    };

    let file_number = match file_number_bcd {
        Some(n) => n,
        None => expanded_file_number,
    };

    let header = GeneralHeader {
        file_number,
        format_code: FORMAT_CODE,
        revision,
        manufacturer_code: MANUFACTURER_CODE,
        manufacturer_serial,
        additional_blocks,
        channel_sets: resolve_count(channel_sets_raw, channel_sets_ext as u32, 28)?,
        extended_headers: resolve_count(extended_raw, extended_ext as u32, 30)?,
        external_headers: resolve_count(external_raw, external_ext, 31)?,
        base_scan,
        sample_interval,
        record_length,
        reference_time,
    };

    log::debug!("general header: {header}");
    Ok(header)
}

/// Validate format code, manufacturer and revision, in that order.
fn check_identity(data: &[u8]) -> Result<FormatRevision> {
    let cur = ByteCursor::new(data, ByteOrder::Big);

    let format = codec::bcd(cur.peek_at(FORMAT_CODE_OFFSET, 2)?);
    if format != Some(FORMAT_CODE) {
        return Err(Rg16Error::unsupported(
            FORMAT_CODE_OFFSET,
            format!("format code is not {FORMAT_CODE}"),
        ));
    }

    let manufacturer = codec::bcd(cur.peek_at(MANUFACTURER_OFFSET, 1)?);
    if manufacturer != Some(MANUFACTURER_CODE) {
        return Err(Rg16Error::unsupported(
            MANUFACTURER_OFFSET,
            format!("manufacturer code is not {MANUFACTURER_CODE}"),
        ));
    }

    let rev = cur.peek_at(REVISION_OFFSET, 2)?;
    FormatRevision::from_bytes([rev[0], rev[1]]).ok_or_else(|| {
        Rg16Error::unsupported(
            REVISION_OFFSET,
            format!("unsupported format revision {:02X}{:02X}", rev[0], rev[1]),
        )
    })
}

/// A one-byte BCD count, or the block 2 field when the byte is `0xFF`.
fn resolve_count(raw: u8, extended: u32, offset: usize) -> Result<u32> {
    if raw == EXTENDED_COUNT {
        return Ok(extended);
    }
    codec::bcd(&[raw])
        .ok_or_else(|| Rg16Error::unsupported(offset, format!("count byte {raw:#04X} is not BCD")))
}

fn build_reference_time(yy: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<NanoTime> {
    if !(1..=366).contains(&day) || hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    let year = if yy < 70 { 2000 + yy } else { 1900 + yy };
    Some(NanoTime {
        year: year as u16,
        day: day as u16,
        hour: hour as u8,
        minute: minute as u8,
        second: second as u8,
        nanosecond: 0,
    })
}

/// Read line/receiver metadata from the extended header region.
///
/// Returns `None` when fewer than three extended blocks are declared.
pub fn parse_extended_header(
    cur: &ByteCursor<'_>,
    start: usize,
    blocks: u32,
) -> Result<Option<ExtendedHeader>> {
    if blocks < 3 {
        return Ok(None);
    }
    let mut ext = ByteCursor::new(cur.peek_at(start, 3 * BLOCK_LEN)?, cur.byte_order());
    ext.seek(47)?;
    let collection_method = ext.read_u8()?;
    let num_records = ext.read_u32()?;
    ext.seek(64)?;
    let header = ExtendedHeader {
        collection_method,
        num_records,
        line_number: ext.read_u32()?,
        receiver_point: ext.read_u32()?,
        point_index: ext.read_u8()?,
    };
    log::debug!("extended header at {start}: {header:?}");
    Ok(Some(header))
}
