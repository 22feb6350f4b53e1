//! Deterministic round-robin scheduler for the simulated kernel.
//!
//! ## Philosophy
//!
//! - **Determinism first**: Same inputs + same ticks => same schedule.
//! - **Blocking is explicit**: A process leaves the run queue only when it
//!   blocks for a receive or exits, and re-enters it only when made ready.
//! - **Time only moves when told**: Timed receive waits expire on
//!   `on_tick_advanced()`, never on their own.
//!
//! ## Design
//!
//! - **Round-robin scheduling**: Ready processes are served in FIFO order.
//! - **Time-sliced execution**: Each process gets a quantum of ticks before
//!   it is preempted and moved to the back of the run queue.
//! - **No priorities**: All processes are equal.

use core_types::ProcessId;
use kernel_api::WaitState;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Process state in the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    /// Process is running or ready to run
    Runnable,
    /// Process is waiting for a message
    /// With a `wake_tick`, it is made ready once current_ticks >= wake_tick
    BlockedForReceive { wake_tick: Option<u64> },
    /// Process has exited
    Exited,
}

impl ProcessState {
    /// Maps the scheduler state onto the messaging core's view
    pub fn wait_state(&self) -> Option<WaitState> {
        match *self {
            ProcessState::Runnable => Some(WaitState::Running),
            ProcessState::BlockedForReceive { wake_tick: None } => {
                Some(WaitState::BlockedForReceive)
            }
            ProcessState::BlockedForReceive {
                wake_tick: Some(wake_tick),
            } => Some(WaitState::BlockedForReceiveTimed { wake_tick }),
            ProcessState::Exited => None,
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of ticks a process can run before being preempted
    pub quantum_ticks: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quantum_ticks: 10, // Small quantum for testing
        }
    }
}

/// Scheduling event for audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEvent {
    /// Process was selected to run
    ProcessSelected {
        process: ProcessId,
        timestamp_ticks: u64,
    },
    /// Process was preempted at the end of its quantum
    ProcessPreempted {
        process: ProcessId,
        timestamp_ticks: u64,
    },
    /// Process blocked waiting for a message
    ProcessBlocked {
        process: ProcessId,
        wake_tick: Option<u64>,
        timestamp_ticks: u64,
    },
    /// Blocked process was made ready
    ProcessWoken {
        process: ProcessId,
        reason: WakeReason,
        timestamp_ticks: u64,
    },
    /// Process exited
    ProcessExited {
        process: ProcessId,
        timestamp_ticks: u64,
    },
}

/// Why a blocked process became ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WakeReason {
    /// Explicitly readied, normally by a message delivery
    Readied,
    /// Its receive timeout expired
    TimeoutExpired,
}

/// Process metadata tracked by scheduler
#[derive(Debug)]
struct ProcessInfo {
    state: ProcessState,
    /// Ticks consumed since last scheduling
    ticks_in_quantum: u64,
}

/// Run queue for processes
///
/// This is a simple FIFO queue using VecDeque for deterministic ordering.
#[derive(Debug, Default)]
struct RunQueue {
    queue: VecDeque<ProcessId>,
}

impl RunQueue {
    fn enqueue(&mut self, process: ProcessId) {
        if !self.queue.contains(&process) {
            self.queue.push_back(process);
        }
    }

    fn dequeue(&mut self) -> Option<ProcessId> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn remove(&mut self, process: ProcessId) {
        self.queue.retain(|&id| id != process);
    }
}

/// Preemptive scheduler
pub struct Scheduler {
    config: SchedulerConfig,
    run_queue: RunQueue,
    processes: HashMap<ProcessId, ProcessInfo>,
    current_process: Option<ProcessId>,
    current_ticks: u64,
    /// Audit log for scheduling events (test-only)
    audit_log: Vec<ScheduleEvent>,
}

impl Scheduler {
    /// Creates a new scheduler with default configuration
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Creates a new scheduler with custom configuration
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            run_queue: RunQueue::default(),
            processes: HashMap::new(),
            current_process: None,
            current_ticks: 0,
            audit_log: Vec::new(),
        }
    }

    /// Admits a new process as runnable
    pub fn admit(&mut self, process: ProcessId) {
        self.processes.insert(
            process,
            ProcessInfo {
                state: ProcessState::Runnable,
                ticks_in_quantum: 0,
            },
        );
        self.run_queue.enqueue(process);
    }

    /// Dequeues the next process to run
    ///
    /// Returns None if no processes are runnable.
    pub fn dequeue_next(&mut self) -> Option<ProcessId> {
        let next = self.run_queue.dequeue();
        self.current_process = next;

        if let Some(process) = next {
            if let Some(info) = self.processes.get_mut(&process) {
                info.ticks_in_quantum = 0;
            }
            self.audit_log.push(ScheduleEvent::ProcessSelected {
                process,
                timestamp_ticks: self.current_ticks,
            });
        }
        next
    }

    /// Advances the scheduler clock
    ///
    /// Charges the ticks to the running process and readies every process
    /// whose receive timeout has expired.
    pub fn on_tick_advanced(&mut self, delta_ticks: u64) {
        self.current_ticks = self.current_ticks.saturating_add(delta_ticks);

        if let Some(process) = self.current_process {
            if let Some(info) = self.processes.get_mut(&process) {
                info.ticks_in_quantum = info.ticks_in_quantum.saturating_add(delta_ticks);
            }
        }

        self.expire_timeouts();
    }

    fn expire_timeouts(&mut self) {
        let now = self.current_ticks;
        let mut expired: Vec<ProcessId> = self
            .processes
            .iter()
            .filter_map(|(process, info)| match info.state {
                ProcessState::BlockedForReceive {
                    wake_tick: Some(wake_tick),
                } if now >= wake_tick => Some(*process),
                _ => None,
            })
            .collect();
        // HashMap order is not deterministic; wake in a stable order.
        expired.sort_by_key(|process| process.as_uuid());

        for process in expired {
            self.wake(process, WakeReason::TimeoutExpired);
        }
    }

    /// Checks if the running process has used up its quantum
    pub fn should_preempt(&self) -> bool {
        self.current_process
            .and_then(|process| self.processes.get(&process))
            .is_some_and(|info| info.ticks_in_quantum >= self.config.quantum_ticks)
    }

    /// Preempts the running process and re-enqueues it
    ///
    /// Returns true if a process was preempted.
    pub fn preempt_current(&mut self) -> bool {
        let Some(process) = self.current_process.take() else {
            return false;
        };
        let Some(info) = self.processes.get_mut(&process) else {
            return false;
        };
        if info.state != ProcessState::Runnable {
            return false;
        }

        info.ticks_in_quantum = 0;
        self.run_queue.enqueue(process);
        self.audit_log.push(ScheduleEvent::ProcessPreempted {
            process,
            timestamp_ticks: self.current_ticks,
        });
        true
    }

    /// Blocks a process until it is made ready or `wake_tick` is reached
    pub fn block_for_receive(&mut self, process: ProcessId, wake_tick: Option<u64>) {
        let Some(info) = self.processes.get_mut(&process) else {
            return;
        };
        if info.state == ProcessState::Exited {
            return;
        }
        info.state = ProcessState::BlockedForReceive { wake_tick };
        info.ticks_in_quantum = 0;

        self.run_queue.remove(process);
        if self.current_process == Some(process) {
            self.current_process = None;
        }
        self.audit_log.push(ScheduleEvent::ProcessBlocked {
            process,
            wake_tick,
            timestamp_ticks: self.current_ticks,
        });
    }

    /// Makes a blocked process runnable, cancelling any pending timeout
    ///
    /// Does nothing for a process that is already runnable or has exited.
    pub fn make_ready(&mut self, process: ProcessId) {
        self.wake(process, WakeReason::Readied);
    }

    fn wake(&mut self, process: ProcessId, reason: WakeReason) {
        let Some(info) = self.processes.get_mut(&process) else {
            return;
        };
        if !matches!(info.state, ProcessState::BlockedForReceive { .. }) {
            return;
        }
        info.state = ProcessState::Runnable;
        info.ticks_in_quantum = 0;

        self.run_queue.enqueue(process);
        self.audit_log.push(ScheduleEvent::ProcessWoken {
            process,
            reason,
            timestamp_ticks: self.current_ticks,
        });
    }

    /// Marks a process as exited
    ///
    /// Exited processes are removed from scheduling.
    pub fn exit_process(&mut self, process: ProcessId) {
        let Some(info) = self.processes.get_mut(&process) else {
            return;
        };
        info.state = ProcessState::Exited;

        self.run_queue.remove(process);
        if self.current_process == Some(process) {
            self.current_process = None;
        }
        self.audit_log.push(ScheduleEvent::ProcessExited {
            process,
            timestamp_ticks: self.current_ticks,
        });
    }

    /// Returns the currently running process
    pub fn current_process(&self) -> Option<ProcessId> {
        self.current_process
    }

    /// Returns the number of runnable processes in the queue
    pub fn runnable_count(&self) -> usize {
        self.run_queue.len()
    }

    /// Returns the process state
    pub fn process_state(&self, process: ProcessId) -> Option<ProcessState> {
        self.processes.get(&process).map(|info| info.state)
    }

    /// Returns the current scheduler tick count
    pub fn current_ticks(&self) -> u64 {
        self.current_ticks
    }

    /// Returns a reference to the audit log
    ///
    /// Used in tests to verify scheduling behavior.
    pub fn audit_log(&self) -> &[ScheduleEvent] {
        &self.audit_log
    }

    /// Clears the audit log
    pub fn clear_audit_log(&mut self) {
        self.audit_log.clear();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
