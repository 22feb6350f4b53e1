//! Process and scheduler interface consumed by the messaging core

use core_types::ProcessId;
use ipc::Mailbox;
use serde::{Deserialize, Serialize};

/// Receive-side wait state of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitState {
    /// Running or ready to run
    Running,
    /// Suspended until a message is delivered
    BlockedForReceive,
    /// Suspended until a message is delivered or `wake_tick` is reached
    BlockedForReceiveTimed { wake_tick: u64 },
}

impl WaitState {
    /// Checks if the process is waiting for a delivery
    pub fn is_blocked_for_receive(&self) -> bool {
        matches!(
            self,
            WaitState::BlockedForReceive | WaitState::BlockedForReceiveTimed { .. }
        )
    }
}

/// The process subsystem as seen by the messaging core
///
/// The implementor owns the process table, the mailbox of every process and
/// the scheduler's wait states. The messaging core calls these methods only
/// while it holds its critical section, so implementations need no locking
/// of their own.
///
/// Mailboxes are created with their process and destroyed with it; an
/// implementation must return `None` from [`mailbox`](Self::mailbox) for a
/// process that is not live.
pub trait ProcessScheduler {
    /// Checks whether `process` exists and has not terminated
    fn is_live(&self, process: ProcessId) -> bool;

    /// Returns the mailbox owned by `process`
    fn mailbox(&self, process: ProcessId) -> Option<&Mailbox>;

    /// Returns the mailbox owned by `process` for mutation
    fn mailbox_mut(&mut self, process: ProcessId) -> Option<&mut Mailbox>;

    /// Returns the receive-side wait state of `process`
    fn wait_state(&self, process: ProcessId) -> Option<WaitState>;

    /// Records a wait-state transition for `process`
    fn set_wait_state(&mut self, process: ProcessId, state: WaitState);

    /// Makes `process` ready to run
    ///
    /// Idempotent. Any pending receive timeout is cancelled.
    fn make_ready(&mut self, process: ProcessId);

    /// Returns the scheduler's current tick count
    fn current_ticks(&self) -> u64;
}
