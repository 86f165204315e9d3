//! Resource subsystem errors

use thiserror::Error;

use crate::record::AssetKind;

/// Failure of an asset, handle or partition operation
///
/// Init-path variants trap the guest; render-path variants are logged and
/// turned into a no-op or a `0` result by the FFI layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("{operation}: only allowed during init()")]
    NotInitPhase { operation: &'static str },

    #[error("{kind} '{id}' not found in archive")]
    AssetNotFound { kind: AssetKind, id: String },

    #[error("failed to decode {kind}: {reason}")]
    AssetDecodeError { kind: AssetKind, reason: String },

    #[error("invalid {expected} handle {handle}")]
    InvalidHandle { handle: u32, expected: AssetKind },

    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("{what} limit of {limit} exceeded")]
    CapacityExceeded { what: &'static str, limit: usize },

    #[error("immutable state changed after init: {what}")]
    PartitionViolation { what: &'static str },
}

impl ResourceError {
    pub(crate) fn decode(kind: AssetKind, reason: impl ToString) -> Self {
        Self::AssetDecodeError {
            kind,
            reason: reason.to_string(),
        }
    }

    /// True for failures the FFI layer defers to seal instead of trapping
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::AssetNotFound { .. })
    }
}
