//! Trace region scanner.
//!
//! [`TraceScanner`] walks the trace blocks in file order: channel sets in
//! declared order, then each channel of the set. Block offsets advance by
//! the sizes in the [`ChannelSetTable`]; fields read from a trace header
//! are only cross-checked, never used to move the cursor.

use crate::channel_set::{ChannelSetTable, TraceLayout};
use crate::cursor::ByteCursor;
use crate::record::TraceIssue;
use crate::trace::{TRACE_HEADER_LEN, TraceHeader, TraceHeaderExtension};
use crate::Result;

/// One trace block located by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceBlock<'a> {
    /// Position in file order, counting from 0.
    pub index: usize,
    /// Index of the owning channel set descriptor.
    pub channel_set: usize,
    /// Offset of the trace header.
    pub offset: usize,
    pub header: TraceHeader,
    pub extensions: TraceHeaderExtension,
    /// Raw sample payload; its length always equals the layout's payload.
    pub payload: &'a [u8],
    /// Cross-check failures. The block is still usable.
    pub issues: Vec<TraceIssue>,
}

/// Iterator over the trace blocks of a file.
///
/// Iteration ends after the last declared trace, or at the first trace
/// block that does not fit in the buffer. In the latter case
/// [`truncated_at`](Self::truncated_at) reports where.
pub struct TraceScanner<'a, 't> {
    cur: ByteCursor<'a>,
    table: &'t ChannelSetTable,
    set: usize,
    channel: u32,
    index: usize,
    truncated_at: Option<usize>,
}

impl<'a, 't> TraceScanner<'a, 't> {
    /// Start scanning at `table.trace_region_start`.
    pub fn new(mut cur: ByteCursor<'a>, table: &'t ChannelSetTable) -> Result<Self> {
        cur.seek(table.trace_region_start)?;
        Ok(Self {
            cur,
            table,
            set: 0,
            channel: 0,
            index: 0,
            truncated_at: None,
        })
    }

    pub fn truncated_at(&self) -> Option<usize> {
        self.truncated_at
    }

    /// Advance to the next (channel set, layout) that still has channels.
    fn next_slot(&mut self) -> Option<(usize, TraceLayout)> {
        while let Some(desc) = self.table.descriptors.get(self.set) {
            if self.channel < desc.channels {
                return Some((self.set, self.table.layouts[self.set]));
            }
            self.set += 1;
            self.channel = 0;
        }
        None
    }

    fn read_block(&mut self, set: usize, layout: TraceLayout) -> Result<TraceBlock<'a>> {
        let desc = &self.table.descriptors[set];
        let order = self.cur.byte_order();
        let offset = self.cur.position();

        let header = TraceHeader::parse(self.cur.read(TRACE_HEADER_LEN)?, order);
        let extensions = TraceHeaderExtension::parse(self.cur.read(layout.extensions)?, order);
        let payload = self.cur.read(layout.payload)?;

        let mut issues = Vec::new();
        if header.extension_count != desc.extension_count {
            issues.push(TraceIssue::ExtensionCountMismatch {
                expected: desc.extension_count,
                reported: header.extension_count,
            });
        }
        if let Some(rx) = extensions.receiver {
            if rx.samples as usize != desc.samples_per_trace {
                issues.push(TraceIssue::TraceSizeMismatch {
                    expected: desc.samples_per_trace,
                    reported: rx.samples as usize,
                });
            }
        }

        Ok(TraceBlock {
            index: self.index,
            channel_set: set,
            offset,
            header,
            extensions,
            payload,
            issues,
        })
    }
}

impl<'a> Iterator for TraceScanner<'a, '_> {
    type Item = TraceBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.truncated_at.is_some() {
            return None;
        }
        let (set, layout) = self.next_slot()?;
        let offset = self.cur.position();

        match self.read_block(set, layout) {
            Ok(block) => {
                log::trace!(
                    "trace {} at {offset}: set {set}, {} payload bytes",
                    self.index,
                    block.payload.len()
                );
                self.channel += 1;
                self.index += 1;
                Some(block)
            }
            Err(e) => {
                log::warn!(
                    "trace region truncated at byte {offset} after {} traces: {e}",
                    self.index
                );
                self.truncated_at = Some(offset);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_set::parse_channel_sets;
    use crate::header::parse_general_header;
    use crate::synth::{ChannelSetSpec, FileSpec, build_file, trace_offset};

    fn scan(data: &[u8]) -> (Vec<TraceBlock<'_>>, Option<usize>) {
        let header = parse_general_header(data).unwrap();
        let mut cur = ByteCursor::new(data, header.byte_order());
        let table = parse_channel_sets(&mut cur, &header).unwrap();
        let mut scanner = TraceScanner::new(cur, &table).unwrap();
        let blocks: Vec<_> = scanner.by_ref().collect();
        (blocks, scanner.truncated_at())
    }

    fn two_sets() -> FileSpec {
        FileSpec {
            channel_sets: vec![ChannelSetSpec::float32(2, 4), ChannelSetSpec::float32(3, 8)],
            ..FileSpec::default()
        }
    }

    #[test]
    fn test_scan_visits_every_trace_in_order() {
        let spec = two_sets();
        let data = build_file(&spec);
        let (blocks, truncated) = scan(&data);
        assert_eq!(truncated, None);
        assert_eq!(blocks.len(), 5);
        let sets: Vec<_> = blocks.iter().map(|b| b.channel_set).collect();
        assert_eq!(sets, vec![0, 0, 1, 1, 1]);
        for (i, b) in blocks.iter().enumerate() {
            assert_eq!(b.index, i);
            assert_eq!(b.offset, trace_offset(&spec, i));
            assert!(b.issues.is_empty());
        }
        assert_eq!(blocks[0].payload.len(), 16);
        assert_eq!(blocks[4].payload.len(), 32);
    }

    #[test]
    fn test_empty_channel_sets_are_skipped() {
        let spec = FileSpec {
            channel_sets: vec![
                ChannelSetSpec::float32(0, 4),
                ChannelSetSpec::float32(1, 4),
                ChannelSetSpec::float32(0, 4),
            ],
            ..FileSpec::default()
        };
        let data = build_file(&spec);
        let (blocks, _) = scan(&data);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].channel_set, 1);
    }

    #[test]
    fn test_truncation_stops_at_block_boundary() {
        let spec = two_sets();
        let data = build_file(&spec);
        let cut = trace_offset(&spec, 3) + 25;
        let (blocks, truncated) = scan(&data[..cut]);
        assert_eq!(blocks.len(), 3);
        assert_eq!(truncated, Some(trace_offset(&spec, 3)));
    }

    #[test]
    fn test_sample_count_cross_check() {
        let spec = two_sets();
        let mut data = build_file(&spec);
        // Extension block 1, bytes 7-9: samples per trace
        let at = trace_offset(&spec, 1) + TRACE_HEADER_LEN + 7;
        data[at..at + 3].copy_from_slice(&[0, 0, 9]);
        let (blocks, _) = scan(&data);
        assert_eq!(blocks.len(), 5);
        assert_eq!(
            blocks[1].issues,
            vec![TraceIssue::TraceSizeMismatch {
                expected: 4,
                reported: 9
            }]
        );
        // Offsets are unaffected by the bad field
        assert_eq!(blocks[2].offset, trace_offset(&spec, 2));
        assert!(blocks.iter().enumerate().all(|(i, b)| i == 1 || b.issues.is_empty()));
    }

    #[test]
    fn test_extension_count_cross_check() {
        let spec = two_sets();
        let mut data = build_file(&spec);
        data[trace_offset(&spec, 0) + 9] = 7;
        let (blocks, _) = scan(&data);
        assert_eq!(
            blocks[0].issues,
            vec![TraceIssue::ExtensionCountMismatch {
                expected: 3,
                reported: 7
            }]
        );
        assert_eq!(blocks[1].offset, trace_offset(&spec, 1));
    }
}
