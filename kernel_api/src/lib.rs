//! # Kernel API
//!
//! This crate defines the seams of the message-passing facility.
//!
//! ## Interfaces
//!
//! - [`ProcessScheduler`]: what the messaging core needs from the process
//!   subsystem (liveness, mailbox lookup, wait states, wake-up)
//! - [`MessageSender`] / [`MessageReceiver`]: what processes get from the
//!   messaging core
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A scheduler (ready queues and time slicing live elsewhere)
//! - A transport (messages never leave the machine)

pub mod error;
pub mod messaging;
pub mod process;

pub use error::{BatchSendError, ReceiveError, SendError};
pub use messaging::{MessageReceiver, MessageSender};
pub use process::{ProcessScheduler, WaitState};
