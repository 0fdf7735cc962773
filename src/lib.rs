//! # Bus Transport Core
//!
//! Zero-copy receive path for a kernel-resident message bus.
//!
//! Messages are written directly from the sending process's address space
//! into memory the receiver registered for that purpose; there is no
//! kernel-owned staging copy. Two components carry the whole path:
//!
//! - [`ipc::ReceiveBuffer`]: reserves and releases byte ranges inside the
//!   receiver's registered region (a bump allocator with occupancy-counted
//!   reset).
//! - [`ipc::CopyChannel`]: pins the physical pages backing a reserved range
//!   and streams the sender's bytes into them page by page.
//!
//! The surrounding kernel supplies process and memory-manager objects
//! through the trait seams in [`mem::pin`] and [`mem::user`]; everything
//! here is synchronous and runs on the sending thread.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

pub mod ipc;
pub mod mem;
