//! # Core Types
//!
//! Identifiers shared by every layer of the message-passing system.
//!
//! ## Key Types
//!
//! - [`ProcessId`]: Handle naming a process and, through it, the process's mailbox

pub mod ids;

pub use ids::ProcessId;
