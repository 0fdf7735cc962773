//! Page-span arithmetic
//!
//! Pure bookkeeping over `(address, length, page size)`. The copy engine
//! pins whole pages, so every destination range has to be translated into
//! a page-aligned base, a lead-in offset inside the first page, and an
//! exact page count. Keeping that arithmetic free of any process or
//! memory-manager dependency makes it testable in isolation.

use super::PAGE_SIZE;

/// The set of pages covered by a byte range in some address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSpan {
    base: u64,
    lead: usize,
    page_count: usize,
}

impl PageSpan {
    /// Computes the span of `[addr, addr + len)` using [`PAGE_SIZE`].
    pub fn new(addr: u64, len: usize) -> Self {
        Self::with_page_size(addr, len, PAGE_SIZE)
    }

    /// Computes the span for an explicit page size.
    ///
    /// `page_size` must be a power of two. A zero-length range covers zero
    /// pages regardless of alignment.
    pub fn with_page_size(addr: u64, len: usize, page_size: usize) -> Self {
        debug_assert!(page_size.is_power_of_two());
        let ps = page_size as u64;
        let base = addr & !(ps - 1);
        let lead = (addr - base) as usize;
        let page_count = if len == 0 {
            0
        } else {
            // pages touched = last page index - first page index + 1
            ((addr + len as u64 - 1) / ps - addr / ps + 1) as usize
        };
        Self { base, lead, page_count }
    }

    /// Page-aligned base address of the first page.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Byte offset of the range start inside the first page.
    pub fn lead(&self) -> usize {
        self.lead
    }

    /// Number of pages the range touches.
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_single_page() {
        let span = PageSpan::new(0x1000, 100);
        assert_eq!(span.base(), 0x1000);
        assert_eq!(span.lead(), 0);
        assert_eq!(span.page_count(), 1);
    }

    #[test]
    fn test_aligned_exact_pages() {
        let span = PageSpan::new(0x2000, 2 * PAGE_SIZE);
        assert_eq!(span.base(), 0x2000);
        assert_eq!(span.page_count(), 2);
    }

    #[test]
    fn test_mid_page_start_spills_into_second_page() {
        // Start at byte 4000 of a page, 200 bytes: 96 bytes left in the
        // first page, 104 in the second.
        let span = PageSpan::new(0x1000 + 4000, 200);
        assert_eq!(span.base(), 0x1000);
        assert_eq!(span.lead(), 4000);
        assert_eq!(span.page_count(), 2);
    }

    #[test]
    fn test_mid_page_start_within_one_page() {
        let span = PageSpan::new(0x1000 + 100, 200);
        assert_eq!(span.lead(), 100);
        assert_eq!(span.page_count(), 1);
    }

    #[test]
    fn test_range_ending_on_page_boundary() {
        // Fills the first page exactly; must not claim the next page.
        let span = PageSpan::new(0x1000 + 4000, 96);
        assert_eq!(span.page_count(), 1);
    }

    #[test]
    fn test_zero_length_covers_no_pages() {
        assert_eq!(PageSpan::new(0x1000, 0).page_count(), 0);
        assert_eq!(PageSpan::new(0x1234, 0).page_count(), 0);
    }

    #[test]
    fn test_explicit_page_size() {
        let span = PageSpan::with_page_size(0x80, 0x100, 0x100);
        assert_eq!(span.base(), 0x0);
        assert_eq!(span.lead(), 0x80);
        assert_eq!(span.page_count(), 2);
    }
}
