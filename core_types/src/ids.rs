//! Process identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Handle naming a process
///
/// The messaging core treats this as an opaque key: it is used to look up
/// the owning process's mailbox and its wait state, and nothing else.
/// Handles are never reused, so a handle to a terminated process stays
/// invalid forever instead of aliasing a newer process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessId(Uuid);

impl ProcessId {
    /// Creates a new random process ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a process ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProcessId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Process({})", self.0)
    }
}
