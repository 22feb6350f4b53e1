//! # Simulated Kernel
//!
//! This crate provides a simulated process subsystem for the messaging core.
//!
//! ## Purpose
//!
//! The simulated kernel allows testing message passing without hardware:
//! - Runs under `cargo test`
//! - Deterministic (time only advances when told to)
//! - Inspectable (all state is accessible)
//!
//! It owns the process table, one mailbox per process, and the scheduler
//! that tracks which processes are blocked waiting for a message. The
//! messaging core reaches all of it through [`ProcessScheduler`].

pub mod scheduler;
pub mod test_utils;

use core_types::ProcessId;
use ipc::{Mailbox, DEFAULT_MAILBOX_CAPACITY};
use kernel_api::{ProcessScheduler, WaitState};
use scheduler::{Scheduler, SchedulerConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Simulated kernel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Capacity of the mailbox created for every new process
    pub mailbox_capacity: usize,
    /// Scheduler settings
    pub scheduler: SchedulerConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            scheduler: SchedulerConfig::default(),
        }
    }
}

#[derive(Debug)]
struct ProcessEntry {
    name: String,
    mailbox: Mailbox,
}

/// Simulated kernel state
///
/// Unlike a real kernel, this state is directly accessible for testing.
pub struct SimulatedKernel {
    config: SimConfig,
    /// Live processes and their mailboxes
    processes: HashMap<ProcessId, ProcessEntry>,
    scheduler: Scheduler,
}

impl SimulatedKernel {
    /// Creates a new simulated kernel
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Creates a simulated kernel with custom configuration
    pub fn with_config(config: SimConfig) -> Self {
        let scheduler = Scheduler::with_config(config.scheduler.clone());
        Self {
            config,
            processes: HashMap::new(),
            scheduler,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Creates a process with an empty mailbox and makes it runnable
    pub fn spawn_process(&mut self, name: &str) -> ProcessId {
        let process = ProcessId::new();
        self.processes.insert(
            process,
            ProcessEntry {
                name: name.to_string(),
                mailbox: Mailbox::with_capacity(self.config.mailbox_capacity),
            },
        );
        self.scheduler.admit(process);
        tracing::debug!(%process, name, "process spawned");
        process
    }

    /// Terminates a process, destroying its mailbox and any queued messages
    ///
    /// Returns false if the process was not live.
    pub fn terminate_process(&mut self, process: ProcessId) -> bool {
        let Some(entry) = self.processes.remove(&process) else {
            return false;
        };
        self.scheduler.exit_process(process);
        tracing::debug!(
            %process,
            name = %entry.name,
            discarded = entry.mailbox.len(),
            "process terminated"
        );
        true
    }

    /// Advances simulated time, preempting the running process at the end
    /// of its quantum and expiring receive timeouts
    pub fn advance_ticks(&mut self, delta: u64) {
        self.scheduler.on_tick_advanced(delta);
        if self.scheduler.should_preempt() {
            self.scheduler.preempt_current();
        }
    }

    /// Picks the next runnable process
    pub fn schedule_next(&mut self) -> Option<ProcessId> {
        self.scheduler.dequeue_next()
    }

    /// Returns the name a process was spawned with
    pub fn process_name(&self, process: ProcessId) -> Option<&str> {
        self.processes
            .get(&process)
            .map(|entry| entry.name.as_str())
    }

    /// Returns the number of live processes
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Returns the number of queued messages across all mailboxes
    pub fn pending_message_count(&self) -> usize {
        self.processes
            .values()
            .map(|entry| entry.mailbox.len())
            .sum()
    }

    /// Returns the scheduler state
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

impl Default for SimulatedKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessScheduler for SimulatedKernel {
    fn is_live(&self, process: ProcessId) -> bool {
        self.processes.contains_key(&process)
    }

    fn mailbox(&self, process: ProcessId) -> Option<&Mailbox> {
        self.processes.get(&process).map(|entry| &entry.mailbox)
    }

    fn mailbox_mut(&mut self, process: ProcessId) -> Option<&mut Mailbox> {
        self.processes
            .get_mut(&process)
            .map(|entry| &mut entry.mailbox)
    }

    fn wait_state(&self, process: ProcessId) -> Option<WaitState> {
        if !self.is_live(process) {
            return None;
        }
        self.scheduler
            .process_state(process)
            .and_then(|state| state.wait_state())
    }

    fn set_wait_state(&mut self, process: ProcessId, state: WaitState) {
        match state {
            WaitState::Running => self.scheduler.make_ready(process),
            WaitState::BlockedForReceive => self.scheduler.block_for_receive(process, None),
            WaitState::BlockedForReceiveTimed { wake_tick } => {
                self.scheduler.block_for_receive(process, Some(wake_tick))
            }
        }
    }

    fn make_ready(&mut self, process: ProcessId) {
        self.scheduler.make_ready(process);
    }

    fn current_ticks(&self) -> u64 {
        self.scheduler.current_ticks()
    }
}
