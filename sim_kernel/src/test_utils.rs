//! Test utilities for messaging tests
//!
//! Helpers for booting a message system on the simulated kernel and for
//! synchronizing a test driver with receivers running on other threads.

use crate::{SimConfig, SimulatedKernel};
use core_types::ProcessId;
use kernel_api::WaitState;
use messaging::MessageSystem;
use std::time::{Duration, Instant};

/// Message system over the simulated kernel
pub type SimMessageSystem = MessageSystem<SimulatedKernel>;

/// How long [`wait_until_blocked`] waits before declaring a hang
const BLOCK_WAIT_LIMIT: Duration = Duration::from_secs(10);

/// Boots a message system with one process per name
///
/// Processes are returned in the order their names were given.
pub fn boot(names: &[&str]) -> (SimMessageSystem, Vec<ProcessId>) {
    boot_with_config(SimConfig::default(), names)
}

/// Boots a message system whose mailboxes hold `capacity` messages
pub fn boot_with_capacity(capacity: usize, names: &[&str]) -> (SimMessageSystem, Vec<ProcessId>) {
    let config = SimConfig {
        mailbox_capacity: capacity,
        ..SimConfig::default()
    };
    boot_with_config(config, names)
}

/// Boots a message system on a kernel with the given configuration
pub fn boot_with_config(config: SimConfig, names: &[&str]) -> (SimMessageSystem, Vec<ProcessId>) {
    let mut kernel = SimulatedKernel::with_config(config);
    let processes = names
        .iter()
        .map(|name| kernel.spawn_process(name))
        .collect();
    (MessageSystem::new(kernel), processes)
}

/// Spawns an additional process on a running system
pub fn spawn(system: &SimMessageSystem, name: &str) -> ProcessId {
    system.with_scheduler(|kernel| kernel.spawn_process(name))
}

/// Terminates a process on a running system, waking it if it was blocked
pub fn terminate(system: &SimMessageSystem, process: ProcessId) -> bool {
    system.with_scheduler(|kernel| kernel.terminate_process(process))
}

/// Advances simulated time, waking receivers whose timeout expired
pub fn advance_ticks(system: &SimMessageSystem, delta: u64) {
    system.with_scheduler(|kernel| kernel.advance_ticks(delta));
}

/// Spins until `process` is blocked waiting for a message
///
/// # Panics
///
/// Panics if the process does not block within a generous real-time limit,
/// so a broken wake-up shows up as a failure instead of a hung test.
pub fn wait_until_blocked(system: &SimMessageSystem, process: ProcessId) {
    let started = Instant::now();
    while !system
        .wait_state(process)
        .is_some_and(|state| state.is_blocked_for_receive())
    {
        assert!(
            started.elapsed() < BLOCK_WAIT_LIMIT,
            "{} never blocked for receive",
            process
        );
        std::thread::yield_now();
    }
}

/// Checks that `process` is live and not waiting for a message
pub fn is_running(system: &SimMessageSystem, process: ProcessId) -> bool {
    system.wait_state(process) == Some(WaitState::Running)
}
