use thiserror::Error;

use crate::level::{Level, NodePath};

/// Failure of a single bounds-checked read, before any tree context is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("negative offset {offset}")]
    NegativeOffset { offset: i64 },

    #[error("negative count {count}")]
    NegativeCount { count: i64 },

    #[error("{size} bytes at {address} lie outside buffer of length {len}")]
    OffsetOutOfBounds { address: i64, size: i64, len: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VtxError {
    #[error("malformed header: {field} = {value}: {reason}")]
    MalformedHeader {
        field: &'static str,
        value: i64,
        reason: String,
    },

    #[error("unsupported vtx version {found}, expected {expected}")]
    UnsupportedVersion { found: i32, expected: i32 },

    #[error("{level} table of {path} declares negative count {count}")]
    NegativeCount {
        level: Level,
        path: NodePath,
        count: i64,
    },

    #[error("{level} table of {path} resolves to negative address {offset}")]
    NegativeOffset {
        level: Level,
        path: NodePath,
        offset: i64,
    },

    #[error("{level} {index} of {path}: {size} bytes at {address} exceed buffer length {len}")]
    OffsetOutOfBounds {
        level: Level,
        path: NodePath,
        index: usize,
        address: i64,
        size: i64,
        len: usize,
    },

    #[error("{path}: skeleton has {expected} {level}(s), vtx has {found}")]
    ShapeMismatch {
        level: Level,
        path: NodePath,
        expected: usize,
        found: usize,
    },

    #[error("{dimension} index {index} out of range, {count} available")]
    IndexOutOfRange {
        dimension: Level,
        index: usize,
        count: usize,
    },

    /// Tables shared between records expand to more data than the file holds.
    #[error("{level} table of {path} takes the decoded size past the limit of {limit} bytes")]
    ReadLimitExceeded {
        level: Level,
        path: NodePath,
        limit: usize,
    },
}

impl VtxError {
    /// Attaches tree context to a failed table read.
    ///
    /// `table` is the resolved address of the table and `wire_size` the size of
    /// one entry; an out of bounds read is reported against the first entry
    /// that does not fit.
    pub fn from_read(
        err: ReadError,
        level: Level,
        path: NodePath,
        table: i64,
        wire_size: usize,
    ) -> Self {
        match err {
            ReadError::NegativeOffset { offset } => VtxError::NegativeOffset {
                level,
                path,
                offset,
            },
            ReadError::NegativeCount { count } => VtxError::NegativeCount { level, path, count },
            ReadError::OffsetOutOfBounds { len, size, .. } => {
                let wire = wire_size.max(1) as i64;
                let fits = (len as i64 - table).max(0) / wire;
                // A zero sized read can only fail by starting past the end.
                let (index, address, size) = if size == 0 {
                    (0, table, 0)
                } else {
                    (fits as usize, table + fits * wire, wire)
                };
                VtxError::OffsetOutOfBounds {
                    level,
                    path,
                    index,
                    address,
                    size,
                    len,
                }
            }
        }
    }

    /// The level of the tree this error was raised at, if any.
    pub fn level(&self) -> Option<Level> {
        match self {
            VtxError::MalformedHeader { .. } | VtxError::UnsupportedVersion { .. } => {
                Some(Level::Header)
            }
            VtxError::NegativeCount { level, .. }
            | VtxError::NegativeOffset { level, .. }
            | VtxError::OffsetOutOfBounds { level, .. }
            | VtxError::ShapeMismatch { level, .. }
            | VtxError::ReadLimitExceeded { level, .. } => Some(*level),
            VtxError::IndexOutOfRange { dimension, .. } => Some(*dimension),
        }
    }
}

pub type Result<T> = std::result::Result<T, VtxError>;
