//! Decode whole Receiver Gather files from raw bytes.
//!
//! The main entry points are [`decode()`] and [`decode_with()`]. Decoding
//! runs as an ordered pipeline: general header, channel set table,
//! extended header metadata, then one pass over the trace region.

use crate::channel_set::parse_channel_sets;
use crate::cursor::ByteCursor;
use crate::header::{parse_extended_header, parse_general_header};
use crate::merge::quick_merge;
use crate::options::DecodeOptions;
use crate::record::{DecodeReport, DecodedFile, TraceIssue, TraceWarning};
use crate::scan::TraceScanner;
use crate::{Result, assemble};

/// Decode every trace of a file with default options.
pub fn decode(data: &[u8]) -> Result<DecodeReport> {
    decode_with(data, &DecodeOptions::default())
}

/// Decode a file.
///
/// Fails only when the header region is unusable. Problems confined to
/// single traces, and a buffer that ends inside the trace region, are
/// reported in the returned [`DecodeReport`].
pub fn decode_with(data: &[u8], opts: &DecodeOptions) -> Result<DecodeReport> {
    let header = parse_general_header(data)?;
    let mut cur = ByteCursor::new(data, header.byte_order());
    let table = parse_channel_sets(&mut cur, &header)?;
    let extended = parse_extended_header(&cur, table.extended_start, header.extended_headers)?;

    let mut scanner = TraceScanner::new(cur, &table)?;
    let mut traces = Vec::with_capacity(table.trace_count.min(data.len() / 64));
    let mut warnings = Vec::new();

    for block in scanner.by_ref() {
        let desc = &table.descriptors[block.channel_set];
        let mut warn = |issue: TraceIssue| {
            let w = TraceWarning {
                trace_index: block.index,
                channel_set: block.channel_set,
                offset: block.offset,
                issue,
            };
            log::warn!("{w}");
            warnings.push(w);
        };

        for issue in block.issues.iter().cloned() {
            warn(issue);
        }
        match assemble::assemble(&block, &header, extended.as_ref(), desc, opts) {
            Ok(Some(record)) => traces.push(record),
            Ok(None) => {}
            Err(e) => warn(TraceIssue::SampleDecodeError(e)),
        }
    }
    let truncated_at = scanner.truncated_at();

    log::debug!(
        "decoded {} of {} traces, {} warnings",
        traces.len(),
        table.trace_count,
        warnings.len()
    );

    if opts.merge {
        traces = quick_merge(traces);
    }

    Ok(DecodeReport {
        file: DecodedFile {
            header,
            extended,
            channel_sets: table.descriptors,
            traces,
        },
        warnings,
        truncated_at,
    })
}
