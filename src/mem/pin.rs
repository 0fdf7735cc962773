//! Page-pinning seam to the host memory manager
//!
//! The copy engine never touches page tables itself. The surrounding
//! kernel implements these traits on its task and mm objects; the engine
//! only asks for pages to be pinned and for short-lived kernel-visible
//! mappings of them.
//!
//! Pins are modeled as owning handles: dropping a [`PinnedPage`] releases
//! the pin. Every error path that abandons a partially pinned set
//! therefore releases it without any explicit cleanup call.

use alloc::vec::Vec;
use bitflags::bitflags;

bitflags! {
    /// Access requested when pinning pages
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PinFlags: u32 {
        /// Pages will be written through the pin
        const WRITE = 1 << 0;
        /// Override read-only protection (never set by this crate)
        const FORCE = 1 << 1;
    }
}

/// Errors reported by the pin primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// The range is not a valid candidate for pinning (bad base address)
    BadAddress,
    /// Bookkeeping allocation failed
    NoMemory,
}

/// A physical page held against reclamation.
///
/// The pin lasts for the lifetime of the handle and is released on drop;
/// it keeps the page alive independent of the memory context it was
/// obtained from.
pub trait PinnedPage {
    /// Run `f` over a temporary kernel-visible mapping of the page.
    ///
    /// The mapping exists only for the duration of the closure, so a
    /// caller can never hold two page mappings at once, and the mapping
    /// is gone by the time the closure's result is inspected.
    fn with_mapping<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R;
}

/// A process's memory-management context.
///
/// The value is an owned reference in the manner of the kernel's mm
/// handle: dropping it releases the reference, while pins obtained from
/// it remain valid on their own.
pub trait MemoryContext {
    /// Pin handle type produced by this context.
    type Page: PinnedPage;

    /// Pin up to `count` pages starting at the page-aligned `base`,
    /// requesting `flags` access.
    ///
    /// Implementations take their own mapping lock for the duration of
    /// the call; the call may block while the owning process manipulates
    /// its mappings, and may fault pages in synchronously. Returning
    /// fewer pages than `count` means the tail of the range is unmapped
    /// or lacks the requested access.
    fn pin_pages(
        &self,
        base: u64,
        count: usize,
        flags: PinFlags,
    ) -> Result<Vec<Self::Page>, PinError>;
}

/// A handle on a process that can be the target of a delivery.
pub trait Process {
    /// Memory-context reference type for this process.
    type Mm: MemoryContext;

    /// Obtain a stable reference to the process's current memory context.
    ///
    /// Returns `None` once the process has exited or detached from its
    /// address space; the caller treats that as the receiver being gone.
    fn memory_context(&self) -> Option<Self::Mm>;
}
