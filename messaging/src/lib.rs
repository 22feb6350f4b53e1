//! # Messaging
//!
//! Bounded, blocking mailbox messaging between processes.
//!
//! ## Model
//!
//! Every process owns one fixed-capacity mailbox of 32-bit messages. Any
//! process may deliver into any live mailbox; only the owner takes messages
//! out, in FIFO order, blocking while its mailbox cannot satisfy the request.
//!
//! ## Guarantees
//!
//! - **Atomic operations**: every mailbox check, mutation and wait-state
//!   change happens inside one [`CriticalSection`], so concurrent senders
//!   are queued in the order the section was granted to them
//! - **No lost wake-ups**: a receiver records that it is blocked before it
//!   leaves the section, and a sender readies it inside the same section
//! - **Re-validated wake-ups**: a woken receiver always re-checks its own
//!   mailbox; a wake is a hint, not a promise of data
//! - **No hidden drops**: a message is only discarded when the destination
//!   is full, and the sender is told
//!
//! The process table, the mailboxes and the scheduler's wait states belong to
//! the process subsystem, reached through [`kernel_api::ProcessScheduler`].

pub mod audit;
pub mod config;
pub mod critical;
pub mod error;
pub mod receive;
mod send;
pub mod system;

#[cfg(test)]
mod testing;

pub use audit::{IpcAuditEvent, IpcAuditLog, IpcEvent, RejectReason};
pub use config::MessagingConfig;
pub use critical::{CriticalGuard, CriticalSection};
pub use error::{AttachError, ConfigError};
pub use receive::ProcessContext;
pub use system::MessageSystem;
