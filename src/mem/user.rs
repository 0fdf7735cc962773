//! Sender-side userspace memory access
//!
//! The copy engine reads the message bytes out of the *calling* process's
//! memory. That read is a privileged primitive of the surrounding kernel
//! (it must tolerate the source becoming unreadable mid-copy), so it sits
//! behind a trait the caller implements over its `copy_from_user`
//! equivalent.

/// Errors that can occur while reading the sender's memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMemError {
    /// Source range is not currently readable (unmapped, protected, or
    /// truncated since the send began)
    BadAddress,
}

/// Sequential byte source in the calling process's memory.
///
/// Each call consumes the next `dst.len()` bytes of the source range.
/// The copy engine only ever asks for chunks that stay within the length
/// it was handed, so an implementation wrapping a raw user pointer can
/// advance a cursor without further bounds bookkeeping.
pub trait UserSource {
    /// Copy the next `dst.len()` bytes into kernel-addressable memory.
    fn copy_into(&mut self, dst: &mut [u8]) -> Result<(), UserMemError>;
}

/// In-kernel byte source, used for messages the kernel itself originates
/// (notifications, synthesized replies).
impl UserSource for &[u8] {
    fn copy_into(&mut self, dst: &mut [u8]) -> Result<(), UserMemError> {
        if self.len() < dst.len() {
            return Err(UserMemError::BadAddress);
        }
        let (head, tail) = self.split_at(dst.len());
        dst.copy_from_slice(head);
        *self = tail;
        Ok(())
    }
}
