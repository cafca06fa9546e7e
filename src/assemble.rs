//! Trace assembly: header fields, extensions and payload to [`TraceRecord`].

use crate::channel_set::ChannelSetDescriptor;
use crate::header::{ExtendedHeader, GeneralHeader};
use crate::options::DecodeOptions;
use crate::record::{ChannelId, TraceRecord};
use crate::samples::{SampleDecodeError, decode_samples};
use crate::scan::TraceBlock;
use crate::time::NanoTime;

/// Build the record for one trace block.
///
/// Returns `Ok(None)` when the trace lies outside the options' time
/// window; the payload is not decoded in that case.
pub fn assemble(
    block: &TraceBlock<'_>,
    header: &GeneralHeader,
    extended: Option<&ExtendedHeader>,
    desc: &ChannelSetDescriptor,
    opts: &DecodeOptions,
) -> Result<Option<TraceRecord>, SampleDecodeError> {
    let mut record = TraceRecord {
        channel: channel_id(block, extended, desc),
        channel_set: block.channel_set,
        trace_number: block.header.trace_number,
        sample_interval: header.sample_interval.seconds(),
        start_time: start_time(block, header),
        npts: desc.samples_per_trace,
        samples: Vec::new(),
        scale: desc.scale(),
    };

    if !opts.accepts(record.start_time, record.end_time()) {
        log::trace!("trace {} outside time window", block.index);
        return Ok(None);
    }

    if !opts.head_only {
        let raw = decode_samples(
            block.payload,
            desc.format,
            desc.samples_per_trace,
            header.byte_order(),
        )?;
        record.samples = raw.scaled(record.scale);
    }

    Ok(Some(record))
}

/// Extension block 3 carries an absolute acquisition time; without it the
/// trace starts at the reference time plus its first timing word.
fn start_time(block: &TraceBlock<'_>, header: &GeneralHeader) -> NanoTime {
    match block.extensions.acquisition_micros {
        Some(micros) => NanoTime::from_epoch_micros(micros),
        None => header
            .reference_time
            .add_nanos(block.header.timing_offset_nanos()),
    }
}

fn channel_id(
    block: &TraceBlock<'_>,
    extended: Option<&ExtendedHeader>,
    desc: &ChannelSetDescriptor,
) -> ChannelId {
    match (block.extensions.receiver, extended) {
        (Some(rx), _) => ChannelId {
            line: rx.line,
            point: rx.point,
            index: rx.index,
            code: rx.sensor_code,
        },
        (None, Some(ext)) => ChannelId {
            line: ext.line_number,
            point: ext.receiver_point,
            index: ext.point_index,
            code: desc.channel_type,
        },
        (None, None) => ChannelId {
            code: desc.channel_type,
            ..ChannelId::default()
        },
    }
}
