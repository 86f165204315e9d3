//! Asset handles
//!
//! Guests see handles as plain `u32`s where `0` means "invalid / not found".
//! Inside the host a handle is always non-zero; the sentinel only exists at
//! the FFI boundary.

use std::fmt;
use std::num::NonZeroU32;

/// Permanent, never-reused identifier of one loaded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(NonZeroU32);

impl Handle {
    /// Convert a guest-supplied value; `0` yields `None`
    #[inline]
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Value handed to the guest
    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0.get()
    }

    /// Zero-based slot in the registry's record table
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw FFI form of an optional handle
#[inline]
pub fn raw_or_zero(handle: Option<Handle>) -> u32 {
    handle.map_or(0, Handle::to_raw)
}
