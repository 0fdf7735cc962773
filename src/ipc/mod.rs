//! # Zero-Copy IPC Receive Path
//!
//! Message delivery writes the sender's bytes straight into the receiver's
//! registered buffer; the kernel never stages the payload in its own
//! memory.
//!
//! ## Design
//!
//! A delivery runs synchronously on the sending thread:
//! 1. Reserve a range in the receiver's [`ReceiveBuffer`]
//! 2. Open a [`CopyChannel`] over that range in the receiver's address
//!    space (pins the backing pages)
//! 3. Stream the message bytes through the channel, page by page
//! 4. Close the channel (unpins); the reservation stays allocated until
//!    the receiver consumes and releases it
//!
//! All delivery failures are ordinary result values. `Full` is expected
//! under load and answered with backpressure; `ProcessGone` and `Fault`
//! mean this delivery is discarded and its reservation released. None of
//! them terminate the connection.

mod buffer;
mod conn;
mod copy;

pub use buffer::{BufferError, ReceiveBuffer, Reservation};
pub use conn::Connection;
pub use copy::{CopyChannel, CopyError};

/// Errors reported for a whole message delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliverError {
    /// No contiguous space left in the receiver's buffer; apply
    /// backpressure and retry once the receiver drains
    Full,
    /// Receiver has exited; unreachable for this delivery
    ProcessGone,
    /// Page pin or source read failed; the delivery is discarded
    Fault,
}

impl From<BufferError> for DeliverError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::Full => DeliverError::Full,
        }
    }
}

impl From<CopyError> for DeliverError {
    fn from(err: CopyError) -> Self {
        match err {
            CopyError::ProcessGone => DeliverError::ProcessGone,
            CopyError::Fault => DeliverError::Fault,
        }
    }
}
