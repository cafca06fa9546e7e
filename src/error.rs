//! Error types for Receiver Gather decoding.
//!
//! Only file-fatal conditions live here. Problems confined to a single
//! trace are reported as [`TraceIssue`](crate::TraceIssue) values inside
//! the decode report instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rg16Error {
    #[error("unsupported format at byte {offset}: {reason}")]
    UnsupportedFormat { offset: usize, reason: String },

    #[error("malformed channel set descriptor at byte {offset}: {reason}")]
    MalformedDescriptor { offset: usize, reason: String },

    #[error("out of bounds at byte {offset}: requested {requested} bytes, {available} available")]
    OutOfBounds {
        offset: usize,
        requested: usize,
        available: usize,
    },
}

impl Rg16Error {
    /// Byte offset at which the problem was detected.
    pub fn offset(&self) -> usize {
        match self {
            Self::UnsupportedFormat { offset, .. }
            | Self::MalformedDescriptor { offset, .. }
            | Self::OutOfBounds { offset, .. } => *offset,
        }
    }

    pub(crate) fn unsupported(offset: usize, reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Rg16Error>;
