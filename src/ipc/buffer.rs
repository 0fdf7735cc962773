//! Receive-buffer slab allocator
//!
//! Hands out non-overlapping byte ranges inside the receiver's registered
//! buffer and reclaims them in aggregate. The policy is a bump allocator
//! with occupancy-counted reset: the write cursor only ever moves forward,
//! and snaps back to zero when the last outstanding reservation is
//! released. Message buffers are bounded and drained close to fully in the
//! common case, which keeps this simple policy adequate; the policy state
//! is confined to [`BumpState`] so an interval-tracking allocator can
//! replace it behind the same `reserve`/`release` contract.

use spin::Mutex;

use crate::mem::UserAddr;

/// Alignment of every reservation start, in bytes.
const RESERVE_ALIGN: usize = 8;

/// Errors reported by the allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// No contiguous space left; expected under load and recoverable
    Full,
}

/// A claimed range inside a receive buffer.
///
/// Opaque to the transport layer beyond being the destination of one
/// message; it stays allocated until passed back to
/// [`ReceiveBuffer::release`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reservation {
    addr: UserAddr,
    len: usize,
}

impl Reservation {
    /// Receiver-space address of the start of the range
    pub fn addr(&self) -> UserAddr {
        self.addr
    }

    /// Length of the range in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the reservation covers zero bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump-allocator policy state, guarded by the per-buffer lock.
struct BumpState {
    /// Next free offset, kept 8-byte aligned on reserve
    cursor: usize,
    /// Count of currently-unreleased reservations
    occupancy: usize,
}

/// The receiver's registered buffer.
///
/// One per receiving connection. `base` points into the receiver's
/// address space and is never dereferenced here; this type is pure
/// offset/occupancy bookkeeping.
pub struct ReceiveBuffer {
    base: UserAddr,
    capacity: usize,
    state: Mutex<BumpState>,
}

impl ReceiveBuffer {
    /// Wrap a receiver-registered region of `capacity` bytes at `base`.
    pub fn new(base: UserAddr, capacity: usize) -> Self {
        Self { base, capacity, state: Mutex::new(BumpState { cursor: 0, occupancy: 0 }) }
    }

    /// Total size of the registered region
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reserve `len` bytes, returning the receiver-space range.
    ///
    /// The cursor is rounded up to 8-byte alignment first. Fails with
    /// [`BufferError::Full`] exactly when the aligned cursor plus `len`
    /// exceeds the capacity; no data is written by this call.
    pub fn reserve(&self, len: usize) -> Result<Reservation, BufferError> {
        let mut state = self.state.lock();
        let aligned = align_reserve(state.cursor);
        if aligned.checked_add(len).map_or(true, |end| end > self.capacity) {
            return Err(BufferError::Full);
        }
        state.cursor = aligned + len;
        state.occupancy += 1;
        log::trace!("buffer reserve: offset {} len {}", aligned, len);
        Ok(Reservation { addr: self.base.offset(aligned as u64), len })
    }

    /// Release a reservation previously handed out by [`reserve`].
    ///
    /// `None` (a "no message" caller) is a no-op. When the last
    /// outstanding reservation goes away the cursor resets to zero,
    /// reclaiming the whole buffer in one step.
    ///
    /// # Panics
    ///
    /// Panics if the buffer has no outstanding reservations; that means
    /// the caller's bookkeeping has desynchronized from the allocator's
    /// and must not be papered over.
    ///
    /// [`reserve`]: ReceiveBuffer::reserve
    pub fn release(&self, reservation: Option<Reservation>) {
        if reservation.is_none() {
            return;
        }
        let mut state = self.state.lock();
        assert!(state.occupancy > 0, "release on a buffer with zero occupancy");
        state.occupancy -= 1;
        if state.occupancy == 0 {
            state.cursor = 0;
            log::trace!("buffer empty, cursor reset");
        }
    }

    /// Number of currently-unreleased reservations
    pub fn occupancy(&self) -> usize {
        self.state.lock().occupancy
    }
}

/// Round `offset` up to the reservation alignment.
const fn align_reserve(offset: usize) -> usize {
    (offset + (RESERVE_ALIGN - 1)) & !(RESERVE_ALIGN - 1)
}
