//! Pure Rust decoder for Fairfield Nodal Receiver Gather 1.6-1 files.
//!
//! Zero `unsafe`, zero C dependencies. Reads the general header, channel
//! set descriptors and extended header metadata, then every trace block
//! with its extension blocks and sample payload (20-bit packed, 24/32-bit
//! integer, 32-bit float). Problems confined to one trace and truncated
//! files produce warnings instead of errors.
//!
//! # Detecting a file
//!
//! ```
//! use rg16_rs::probe;
//!
//! assert!(!probe(b"not a receiver gather file"));
//! ```
//!
//! # Decoding a file
//!
//! ```no_run
//! use rg16_rs::decode;
//!
//! let data = std::fs::read("line7_point1001.fcnt").unwrap();
//! let report = decode(&data).unwrap();
//!
//! println!("{}", report.file.header);
//! for trace in report.traces() {
//!     println!("{trace}");
//! }
//! for warning in &report.warnings {
//!     eprintln!("{warning}");
//! }
//! ```
//!
//! # Decoding with options
//!
//! ```no_run
//! use rg16_rs::{DecodeOptions, NanoTime, decode_with};
//!
//! let data = std::fs::read("line7_point1001.fcnt").unwrap();
//! let opts = DecodeOptions::new()
//!     .with_head_only(true)
//!     .with_start_time(NanoTime {
//!         year: 2017, day: 216, hour: 12,
//!         minute: 30, second: 0, nanosecond: 0,
//!     })
//!     .with_merge(true);
//!
//! let report = decode_with(&data, &opts).unwrap();
//! for trace in report.traces() {
//!     assert!(trace.samples.is_empty());
//!     println!("{} samples from {}", trace.npts, trace.start_time);
//! }
//! ```

pub mod assemble;
pub mod channel_set;
pub mod codec;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod header;
pub mod merge;
pub mod options;
pub mod record;
pub mod samples;
pub mod scan;
#[cfg(any(test, feature = "synth"))]
pub mod synth;
pub mod time;
pub mod trace;
pub mod types;

pub use channel_set::ChannelSetDescriptor;
pub use error::{Result, Rg16Error};
pub use header::{ExtendedHeader, GeneralHeader, probe};
pub use merge::quick_merge;
pub use options::DecodeOptions;
pub use record::{ChannelId, DecodeReport, DecodedFile, TraceIssue, TraceRecord, TraceWarning};
pub use samples::SampleDecodeError;
pub use time::NanoTime;
pub use types::{ByteOrder, FormatRevision, SampleFormat, SampleInterval};

pub use decode::{decode, decode_with};
