//! In-memory stand-ins for the process/memory-manager seam
//!
//! Backs every cross-address-space test in the crate: heap-allocated page
//! frames play the receiver's physical memory, and an atomic pin-balance
//! counter checks that every pin taken is given back.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicIsize, Ordering};
use spin::Mutex;

use super::pin::{MemoryContext, PinError, PinFlags, PinnedPage, Process};
use super::user::{UserMemError, UserSource};
use super::PAGE_SIZE;

/// One fake physical page.
struct Frame {
    bytes: Mutex<[u8; PAGE_SIZE]>,
}

impl Frame {
    fn new() -> Arc<Self> {
        Arc::new(Self { bytes: Mutex::new([0u8; PAGE_SIZE]) })
    }
}

/// Fake memory-management context: one contiguous mapped region.
pub(crate) struct TestMm {
    base: u64,
    frames: Vec<Arc<Frame>>,
    pins: Arc<AtomicIsize>,
}

/// Fake target process, optionally already exited.
pub(crate) struct TestProcess {
    mm: Option<Arc<TestMm>>,
}

impl TestProcess {
    /// Process with `pages` pages mapped at `base` (must be page-aligned).
    pub(crate) fn with_region(base: u64, pages: usize) -> Self {
        assert_eq!(base as usize % PAGE_SIZE, 0);
        let frames = (0..pages).map(|_| Frame::new()).collect();
        let mm = TestMm { base, frames, pins: Arc::new(AtomicIsize::new(0)) };
        Self { mm: Some(Arc::new(mm)) }
    }

    /// Process whose memory context is already gone.
    pub(crate) fn exited() -> Self {
        Self { mm: None }
    }

    /// Outstanding pin count; zero when every pin has been released.
    pub(crate) fn pin_balance(&self) -> isize {
        self.mm.as_ref().map_or(0, |mm| mm.pins.load(Ordering::SeqCst))
    }

    /// Read back region bytes the way the receiver would (straight from
    /// its own mapped pages).
    pub(crate) fn read_bytes(&self, addr: u64, len: usize) -> Vec<u8> {
        let mm = self.mm.as_ref().expect("process has no memory");
        let mut out = Vec::with_capacity(len);
        let mut addr = addr;
        let mut remaining = len;
        while remaining > 0 {
            let page = ((addr - mm.base) as usize) / PAGE_SIZE;
            let off = (addr as usize) % PAGE_SIZE;
            let take = usize::min(PAGE_SIZE - off, remaining);
            let bytes = mm.frames[page].bytes.lock();
            out.extend_from_slice(&bytes[off..off + take]);
            addr += take as u64;
            remaining -= take;
        }
        out
    }
}

impl Process for TestProcess {
    type Mm = Arc<TestMm>;

    fn memory_context(&self) -> Option<Arc<TestMm>> {
        self.mm.clone()
    }
}

impl MemoryContext for Arc<TestMm> {
    type Page = TestPage;

    fn pin_pages(
        &self,
        base: u64,
        count: usize,
        _flags: PinFlags,
    ) -> Result<Vec<TestPage>, PinError> {
        if base as usize % PAGE_SIZE != 0 || base < self.base {
            return Err(PinError::BadAddress);
        }
        let first = ((base - self.base) as usize) / PAGE_SIZE;
        let mut pages = Vec::with_capacity(count);
        for index in first..first + count {
            // Range runs off the mapped region: hand back what we have,
            // the same way the real pin primitive reports a short count.
            let Some(frame) = self.frames.get(index) else { break };
            self.pins.fetch_add(1, Ordering::SeqCst);
            pages.push(TestPage { frame: frame.clone(), pins: self.pins.clone() });
        }
        Ok(pages)
    }
}

/// Pin handle over a fake frame; releases the pin on drop.
pub(crate) struct TestPage {
    frame: Arc<Frame>,
    pins: Arc<AtomicIsize>,
}

impl PinnedPage for TestPage {
    fn with_mapping<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let mut bytes = self.frame.bytes.lock();
        f(&mut bytes[..])
    }
}

impl Drop for TestPage {
    fn drop(&mut self) {
        self.pins.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Source wrapper that becomes unreadable after `budget` bytes.
pub(crate) struct FaultAfter<S> {
    inner: S,
    budget: usize,
}

impl<S> FaultAfter<S> {
    pub(crate) fn new(inner: S, budget: usize) -> Self {
        Self { inner, budget }
    }
}

impl<S: UserSource> UserSource for FaultAfter<S> {
    fn copy_into(&mut self, dst: &mut [u8]) -> Result<(), UserMemError> {
        if dst.len() > self.budget {
            return Err(UserMemError::BadAddress);
        }
        self.budget -= dst.len();
        self.inner.copy_into(dst)
    }
}
