//! Messaging Test Utilities
//!
//! This crate provides shared utilities for end-to-end messaging tests.
//!
//! ## Test Philosophy
//!
//! - **Real concurrency**: receivers run on their own threads and really block
//! - **Deterministic checkpoints**: the driver waits for receivers to block
//!   before each step, so every run sees the same mailbox contents
//! - **No lost messages**: everything accepted by a send is eventually received

use core_types::ProcessId;
use ipc::Message;
use kernel_api::{MessageReceiver, ReceiveError};
use sim_kernel::test_utils::SimMessageSystem;

pub use sim_kernel::test_utils::{
    advance_ticks, boot, boot_with_capacity, spawn, terminate, wait_until_blocked,
};

/// Builds messages from raw values
pub fn msgs(values: impl IntoIterator<Item = u32>) -> Vec<Message> {
    values.into_iter().map(Message::new).collect()
}

/// Raw values of a slice of messages
pub fn values(messages: &[Message]) -> Vec<u32> {
    messages.iter().map(|message| message.value()).collect()
}

/// Snapshot of the values queued for `process`, oldest first
pub fn queued(system: &SimMessageSystem, process: ProcessId) -> Vec<u32> {
    system.inspect(|kernel| {
        use kernel_api::ProcessScheduler;
        kernel
            .mailbox(process)
            .map(|mailbox| mailbox.iter().map(|message| message.value()).collect())
            .unwrap_or_default()
    })
}

/// Attaches to `process` and performs `rounds` receives of `batch` messages
///
/// A batch of one uses the single-message receive.
pub fn receive_rounds(
    system: &SimMessageSystem,
    process: ProcessId,
    batch: usize,
    rounds: usize,
) -> Result<Vec<Vec<u32>>, ReceiveError> {
    let mut context = system
        .attach(process)
        .map_err(|_| ReceiveError::ProcessTerminated(process))?;

    let mut collected = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        let received = if batch == 1 {
            vec![context.receive()?]
        } else {
            context.receive_batch(batch)?
        };
        collected.push(values(&received));
    }
    Ok(collected)
}
