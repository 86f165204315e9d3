//! Asset payload validation errors

use thiserror::Error;

/// Why an asset payload was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("data too short for header: {len} bytes, need {needed}")]
    TruncatedHeader { len: usize, needed: usize },
    #[error("invalid header: {0}")]
    InvalidHeader(&'static str),
    #[error("payload too short: {len} bytes, need {needed}")]
    TruncatedBody { len: usize, needed: usize },
    #[error("payload size mismatch: {len} bytes, expected {expected}")]
    SizeMismatch { len: usize, expected: usize },
    #[error("{what} {value} exceeds limit {limit}")]
    TooLarge {
        what: &'static str,
        value: usize,
        limit: usize,
    },
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: u32 },
}
