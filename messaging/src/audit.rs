//! IPC Audit Trail
//!
//! Records what the send and receive paths did, in the order their critical
//! sections were granted. Tests assert on this trail to check ordering and
//! wake-up behaviour; tooling can serialize it for inspection.
//!
//! ## Example
//!
//! ```
//! use messaging::audit::{IpcAuditLog, IpcEvent};
//! use core_types::ProcessId;
//! use ipc::Message;
//!
//! let mut audit_log = IpcAuditLog::with_capacity(16);
//! let to = ProcessId::new();
//!
//! audit_log.record_event(
//!     7,
//!     IpcEvent::Delivered {
//!         to,
//!         message: Message::new(42),
//!         woke_receiver: false,
//!     },
//! );
//!
//! assert_eq!(audit_log.len(), 1);
//! assert_eq!(audit_log.events_for_process(to).len(), 1);
//! ```

use core_types::ProcessId;
use ipc::Message;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Why a delivery was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    InvalidDestination,
    MailboxFull,
}

/// Something the messaging core did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpcEvent {
    /// Message queued in `to`'s mailbox
    Delivered {
        to: ProcessId,
        message: Message,
        woke_receiver: bool,
    },
    /// Message refused and discarded
    Rejected {
        to: ProcessId,
        message: Message,
        reason: RejectReason,
    },
    /// Message handed to its owner
    Received { by: ProcessId, message: Message },
    /// Owner suspended with fewer than `wanted` messages queued
    Blocked {
        process: ProcessId,
        wanted: usize,
        available: usize,
    },
    /// Owner resumed and is re-checking its mailbox
    Woken { process: ProcessId },
    /// Timed receive gave up
    TimedOut { process: ProcessId },
}

impl IpcEvent {
    /// Returns the process whose mailbox the event concerns
    pub fn process(&self) -> ProcessId {
        match self {
            IpcEvent::Delivered { to, .. } | IpcEvent::Rejected { to, .. } => *to,
            IpcEvent::Received { by, .. } => *by,
            IpcEvent::Blocked { process, .. }
            | IpcEvent::Woken { process }
            | IpcEvent::TimedOut { process } => *process,
        }
    }
}

/// A single audit event with timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpcAuditEvent {
    /// Scheduler tick at which the event occurred
    pub timestamp_ticks: u64,
    /// The event that occurred
    pub event: IpcEvent,
}

/// Bounded chronological record of IPC events
///
/// Once full, recording a new event evicts the oldest one.
#[derive(Debug)]
pub struct IpcAuditLog {
    events: VecDeque<IpcAuditEvent>,
    capacity: usize,
}

impl IpcAuditLog {
    /// Creates an empty log keeping at most `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity,
        }
    }

    /// Records an event at the given tick
    pub fn record_event(&mut self, timestamp_ticks: u64, event: IpcEvent) {
        if self.capacity == 0 {
            return;
        }
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(IpcAuditEvent {
            timestamp_ticks,
            event,
        });
    }

    /// Returns all retained events, oldest first
    pub fn get_events(&self) -> Vec<IpcAuditEvent> {
        self.events.iter().cloned().collect()
    }

    /// Returns events concerning a specific process
    pub fn events_for_process(&self, process: ProcessId) -> Vec<&IpcAuditEvent> {
        self.events
            .iter()
            .filter(|e| e.event.process() == process)
            .collect()
    }

    /// Counts events matching the predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&IpcEvent) -> bool,
    {
        self.events.iter().filter(|e| predicate(&e.event)).count()
    }

    /// Checks if any event matches the predicate
    pub fn has_event<F>(&self, predicate: F) -> bool
    where
        F: Fn(&IpcEvent) -> bool,
    {
        self.events.iter().any(|e| predicate(&e.event))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
