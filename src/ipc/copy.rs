//! Page-pinned copy channel
//!
//! Makes a byte range in the receiving process's address space writable
//! from the sender's thread of control: the backing physical pages are
//! pinned against reclamation for the duration of the copy, and each page
//! is mapped into kernel-visible space only for the moment its bytes are
//! written.
//!
//! A channel is either open or closed; a failure during `open` hands back
//! a plain error with every partially acquired pin already released (pin
//! handles release on drop), never a half-open channel.

use alloc::vec::Vec;
use core::fmt;

use crate::mem::{
    MemoryContext, PageSpan, PinFlags, PinnedPage, Process, UserAddr, UserSource, PAGE_SIZE,
};

/// Errors reported by the copy channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyError {
    /// Target process has no memory context (exited or detaching)
    ProcessGone,
    /// Page pin failed, the destination range is not fully mapped
    /// writable, or the source became unreadable mid-copy
    Fault,
}

/// An open copy channel into another process's memory.
///
/// Holds the pinned page set for one in-progress delivery plus the write
/// cursor over it. Dropping (or [`close`]-ing) the channel unpins every
/// page unconditionally, whether or not writes succeeded.
///
/// [`close`]: CopyChannel::close
pub struct CopyChannel<P: PinnedPage> {
    /// Pinned pages covering the destination range, in address order
    pages: Vec<P>,
    /// Index of the page the cursor is on
    cur: usize,
    /// Byte offset inside the current page
    pos: usize,
    /// Destination bytes not yet written
    remaining: usize,
}

impl<P: PinnedPage> CopyChannel<P> {
    /// Open a channel over `[dst, dst + len)` in `target`'s address space.
    ///
    /// Pins every page the range touches, requesting write access. On
    /// success exactly `len` bytes are writable through the channel
    /// without further faults. On any failure all pins taken so far are
    /// released before the error is returned.
    pub fn open<Pr>(target: &Pr, dst: UserAddr, len: usize) -> Result<Self, CopyError>
    where
        Pr: Process,
        Pr::Mm: MemoryContext<Page = P>,
    {
        let span = PageSpan::new(dst.as_u64(), len);

        let mm = target.memory_context().ok_or(CopyError::ProcessGone)?;
        let pages = mm
            .pin_pages(span.base(), span.page_count(), PinFlags::WRITE)
            .map_err(|err| {
                log::debug!("copy open: pin failed: {:?}", err);
                CopyError::Fault
            })?;
        // Pins keep the physical pages alive on their own; the context
        // reference is not needed past this point.
        drop(mm);

        if pages.len() < span.page_count() {
            // Short pin: part of the range is unmapped or read-only.
            // Dropping `pages` releases whatever was pinned.
            log::debug!("copy open: pinned {} of {} pages", pages.len(), span.page_count());
            return Err(CopyError::Fault);
        }
        assert_eq!(
            pages.len(),
            span.page_count(),
            "pin primitive returned more pages than the span holds"
        );

        Ok(Self { pages, cur: 0, pos: span.lead(), remaining: len })
    }

    /// Stream the next `len` bytes of `src` into the destination range.
    ///
    /// Walks the pinned pages strictly sequentially: each step copies
    /// `min(PAGE_SIZE - pos, len)` bytes through a temporary mapping of
    /// the current page, releases the mapping, and only then inspects the
    /// copy result. A source failure aborts the write with
    /// [`CopyError::Fault`]; bytes already copied stay in place and the
    /// channel remains open for the caller to close. Asking for more than
    /// the bytes left from `open` is also a fault.
    pub fn write<S: UserSource>(&mut self, src: &mut S, len: usize) -> Result<(), CopyError> {
        if len > self.remaining {
            return Err(CopyError::Fault);
        }
        let mut len = len;
        while len > 0 {
            let bytes = usize::min(PAGE_SIZE - self.pos, len);
            let pos = self.pos;
            let page = &self.pages[self.cur];

            // The mapping lives only inside the closure; by the time the
            // result is checked it is already released, and the next
            // page's mapping is never taken while this one is held.
            let copied = page.with_mapping(|frame| src.copy_into(&mut frame[pos..pos + bytes]));
            copied.map_err(|_| CopyError::Fault)?;

            self.pos += bytes;
            if self.pos == PAGE_SIZE {
                self.pos = 0;
                self.cur += 1;
            }
            self.remaining -= bytes;
            len -= bytes;
        }
        Ok(())
    }

    /// Destination bytes still writable through this channel
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Close the channel, unpinning every page in the set.
    ///
    /// Equivalent to dropping the channel; safe after failed writes and
    /// never blocks indefinitely.
    pub fn close(self) {}
}

// Pin handles carry no useful state of their own; report the cursor over
// them instead of requiring `P: Debug`.
impl<P: PinnedPage> fmt::Debug for CopyChannel<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyChannel")
            .field("pages", &self.pages.len())
            .field("cur", &self.cur)
            .field("pos", &self.pos)
            .field("remaining", &self.remaining)
            .finish()
    }
}
