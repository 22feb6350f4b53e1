//! Minimal process subsystem for unit tests.

use core_types::ProcessId;
use ipc::Mailbox;
use kernel_api::{ProcessScheduler, WaitState};
use std::collections::HashMap;

pub(crate) struct TestScheduler {
    capacity: usize,
    processes: HashMap<ProcessId, (Mailbox, WaitState)>,
    ticks: u64,
    pub(crate) ready_calls: usize,
}

impl TestScheduler {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            processes: HashMap::new(),
            ticks: 0,
            ready_calls: 0,
        }
    }

    pub(crate) fn spawn(&mut self) -> ProcessId {
        let pid = ProcessId::new();
        self.processes.insert(
            pid,
            (Mailbox::with_capacity(self.capacity), WaitState::Running),
        );
        pid
    }

    pub(crate) fn terminate(&mut self, pid: ProcessId) {
        self.processes.remove(&pid);
    }

    /// Advances the clock and readies every timed waiter that expired.
    pub(crate) fn advance(&mut self, delta: u64) {
        self.ticks += delta;
        let now = self.ticks;
        for (_, state) in self.processes.values_mut() {
            if let WaitState::BlockedForReceiveTimed { wake_tick } = *state {
                if now >= wake_tick {
                    *state = WaitState::Running;
                }
            }
        }
    }
}

impl ProcessScheduler for TestScheduler {
    fn is_live(&self, process: ProcessId) -> bool {
        self.processes.contains_key(&process)
    }

    fn mailbox(&self, process: ProcessId) -> Option<&Mailbox> {
        self.processes.get(&process).map(|(mailbox, _)| mailbox)
    }

    fn mailbox_mut(&mut self, process: ProcessId) -> Option<&mut Mailbox> {
        self.processes.get_mut(&process).map(|(mailbox, _)| mailbox)
    }

    fn wait_state(&self, process: ProcessId) -> Option<WaitState> {
        self.processes.get(&process).map(|(_, state)| *state)
    }

    fn set_wait_state(&mut self, process: ProcessId, state: WaitState) {
        if let Some((_, current)) = self.processes.get_mut(&process) {
            *current = state;
        }
    }

    fn make_ready(&mut self, process: ProcessId) {
        self.ready_calls += 1;
        self.set_wait_state(process, WaitState::Running);
    }

    fn current_ticks(&self) -> u64 {
        self.ticks
    }
}
