//! Errors owned by the messaging core itself

use core_types::ProcessId;
use thiserror::Error;

/// Failure to bind a receiver to a process
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AttachError {
    /// Process is unknown or has terminated
    #[error("Unknown process: {0}")]
    UnknownProcess(ProcessId),

    /// Another receiver already owns this mailbox
    #[error("Process already attached: {0}")]
    AlreadyAttached(ProcessId),
}

/// Invalid messaging configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Audit is enabled with no room for events
    #[error("Audit capacity must be non-zero when auditing is enabled")]
    ZeroAuditCapacity,

    /// Configuration text could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),
}
