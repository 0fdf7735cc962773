//! Receiving-connection glue
//!
//! A connection on the bus registers one flat buffer to receive into; the
//! transport layer drives delivery through it. Only the receive path
//! lives here: the connection's broader lifecycle (creation, refcounting,
//! disconnect, reply timers) and name/match handling belong to the layers
//! above.

use core::sync::atomic::{AtomicU64, Ordering};

use super::buffer::{ReceiveBuffer, Reservation};
use super::copy::CopyChannel;
use super::DeliverError;
use crate::mem::{Process, UserAddr, UserSource};

/// A receiving connection's transport state.
pub struct Connection {
    /// Connection ID on the bus
    id: u64,
    /// The buffer the receiver registered for incoming messages
    buffer: ReceiveBuffer,
    /// Messages delivered and not yet consumed
    msg_count: AtomicU64,
}

impl Connection {
    /// Register a receive buffer of `capacity` bytes at `base` in the
    /// receiver's address space.
    pub fn new(id: u64, base: UserAddr, capacity: usize) -> Self {
        log::debug!("conn {}: registered {} byte receive buffer", id, capacity);
        Self { id, buffer: ReceiveBuffer::new(base, capacity), msg_count: AtomicU64::new(0) }
    }

    /// Connection ID on the bus
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The connection's registered receive buffer
    pub fn buffer(&self) -> &ReceiveBuffer {
        &self.buffer
    }

    /// Messages delivered to this connection and not yet consumed
    pub fn msg_count(&self) -> u64 {
        self.msg_count.load(Ordering::Relaxed)
    }

    /// Deliver one message of `len` bytes from `src` into this
    /// connection's buffer inside `target`'s address space.
    ///
    /// Runs the whole receive path on the calling (sender's) thread:
    /// reserve a range, pin its pages, stream the bytes, unpin. On any
    /// failure after the reservation was taken, the reservation is
    /// released again; a partially written range is never handed to the
    /// receiver. The returned [`Reservation`] stays allocated until the
    /// receiver passes it back through [`consume`].
    ///
    /// [`consume`]: Connection::consume
    pub fn deliver<Pr, S>(
        &self,
        target: &Pr,
        src: &mut S,
        len: usize,
    ) -> Result<Reservation, DeliverError>
    where
        Pr: Process,
        S: UserSource,
    {
        let slot = self.buffer.reserve(len)?;

        let mut channel = match CopyChannel::open(target, slot.addr(), len) {
            Ok(channel) => channel,
            Err(err) => {
                self.buffer.release(Some(slot));
                return Err(err.into());
            }
        };

        if let Err(err) = channel.write(src, len) {
            // Bytes already copied are not rolled back; the slot may be
            // partially populated and must not reach the receiver.
            channel.close();
            self.buffer.release(Some(slot));
            log::debug!("conn {}: delivery of {} bytes faulted", self.id, len);
            return Err(err.into());
        }
        channel.close();

        self.msg_count.fetch_add(1, Ordering::Relaxed);
        log::trace!("conn {}: delivered {} bytes", self.id, len);
        Ok(slot)
    }

    /// Release a delivered message's range after the receiver has read
    /// it. `None` (no message) is a no-op.
    pub fn consume(&self, slot: Option<Reservation>) {
        if slot.is_some() {
            self.msg_count.fetch_sub(1, Ordering::Relaxed);
        }
        self.buffer.release(slot);
    }
}
