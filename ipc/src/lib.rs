//! # Inter-Process Communication (IPC)
//!
//! Message and mailbox primitives for the kernel's message-passing facility.
//!
//! ## Philosophy
//!
//! - **Fixed-width messages**: Every message is a single 32-bit value
//! - **Bounded queues**: A mailbox never grows past its capacity
//! - **No sentinels**: Occupancy is counted, never inferred from slot contents
//!
//! This crate holds data structures only. Locking, blocking and wake-up
//! live in the `messaging` crate.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod mailbox;
pub mod message;

pub use mailbox::{Mailbox, MailboxError, DEFAULT_MAILBOX_CAPACITY};
pub use message::Message;
