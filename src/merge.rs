//! Joining of contiguous traces.
//!
//! Receiver Gather files split continuous recordings into many short
//! traces per channel. [`quick_merge`] joins runs of traces from the same
//! channel whose start follows the previous trace's last sample within one
//! sample interval.

use crate::record::TraceRecord;

/// Slack added to one sample interval when deciding contiguity.
const TOLERANCE_NANOS: i64 = 1_000;

/// Merge contiguous traces of the same channel.
///
/// Traces only merge when channel, sample interval and scale agree. The
/// output is ordered by channel, then start time.
pub fn quick_merge(mut traces: Vec<TraceRecord>) -> Vec<TraceRecord> {
    traces.sort_by(|a, b| {
        a.channel
            .cmp(&b.channel)
            .then(a.start_time.cmp(&b.start_time))
    });

    let mut out: Vec<TraceRecord> = Vec::with_capacity(traces.len());
    for trace in traces {
        match out.last_mut() {
            Some(last) if is_contiguous(last, &trace) => {
                last.npts += trace.npts;
                last.samples.extend(trace.samples);
            }
            _ => out.push(trace),
        }
    }
    log::debug!("merged into {} traces", out.len());
    out
}

fn is_contiguous(prev: &TraceRecord, next: &TraceRecord) -> bool {
    if prev.channel != next.channel
        || prev.interval_nanos() != next.interval_nanos()
        || prev.scale != next.scale
    {
        return false;
    }
    let gap = next
        .start_time
        .to_epoch_nanos()
        .saturating_sub(prev.end_time().to_epoch_nanos());
    gap.unsigned_abs() <= prev.interval_nanos().unsigned_abs() + TOLERANCE_NANOS as u64
}
