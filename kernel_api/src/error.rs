//! Messaging error types
//!
//! Every failure is returned as a value. Nothing here is retried or
//! escalated on the caller's behalf.

use core_types::ProcessId;
use thiserror::Error;

/// Errors returned by a single-destination send
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SendError {
    /// Destination is unknown or has terminated
    #[error("Invalid destination: {0}")]
    InvalidDestination(ProcessId),

    /// Destination mailbox is at capacity; the message was discarded
    #[error("Mailbox full: {0}")]
    MailboxFull(ProcessId),
}

/// Errors returned by batch and fan-out sends
///
/// Partial delivery is not an error; it is reported as a success count.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BatchSendError {
    /// Not a single message was accepted
    #[error("All {attempted} deliveries dropped")]
    AllDropped {
        /// Number of deliveries that were attempted
        attempted: usize,
    },
}

/// Errors returned by the receive path
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ReceiveError {
    /// Batch request can never be satisfied by the caller's mailbox
    #[error("Requested {requested} messages but mailbox capacity is {capacity}")]
    RequestExceedsCapacity {
        /// Number of messages asked for
        requested: usize,
        /// Capacity of the caller's mailbox
        capacity: usize,
    },

    /// Timed receive expired with the predicate still unmet
    #[error("Receive timed out")]
    TimedOut,

    /// The receiving process was terminated while waiting
    #[error("Process terminated: {0}")]
    ProcessTerminated(ProcessId),
}
