//! Memory primitives for the transport core
//!
//! ## Components
//!
//! - Userspace address newtype shared by both sides of a delivery
//! - Page-span arithmetic for page-boundary bookkeeping
//! - Trait seams for the host kernel's process/memory-manager objects
//! - Sender-side user-memory read primitive

pub mod pin;
pub mod span;
pub mod user;

#[cfg(test)]
pub(crate) mod fixture;

pub use pin::{MemoryContext, PinError, PinFlags, PinnedPage, Process};
pub use span::PageSpan;
pub use user::{UserMemError, UserSource};

/// Page size of the receiving side, in bytes.
pub const PAGE_SIZE: usize = 4096;

/// Userspace virtual address.
///
/// Addresses of both the sender's source range and the receiver's
/// registered buffer are plain numbers to this crate; neither is ever
/// dereferenced directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct UserAddr(pub u64);

impl UserAddr {
    /// Create a new userspace address
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Get the raw address value
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Offset the address by `bytes`
    ///
    /// # Panics
    ///
    /// Panics on address overflow; offsets computed from a registered
    /// buffer's bookkeeping can never wrap, so a wrap is a caller bug.
    pub const fn offset(self, bytes: u64) -> Self {
        match self.0.checked_add(bytes) {
            Some(addr) => Self(addr),
            None => panic!("user address overflow"),
        }
    }
}
