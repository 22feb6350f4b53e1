//! Message-passing API offered to processes

use crate::{BatchSendError, ReceiveError, SendError};
use core_types::ProcessId;
use ipc::Message;

/// Delivery side of the message-passing API
///
/// Any process may send to any live process. Each delivery is atomic with
/// respect to every other mailbox operation.
///
/// # Example
///
/// ```
/// use kernel_api::{BatchSendError, MessageSender};
/// use core_types::ProcessId;
/// use ipc::Message;
///
/// fn broadcast<S: MessageSender>(
///     sender: &S,
///     peers: &[ProcessId],
/// ) -> Result<usize, BatchSendError> {
///     sender.send_to_many(peers, Message::new(42))
/// }
/// ```
pub trait MessageSender {
    /// Delivers `message` to `destination`, waking it if it is blocked
    /// waiting to receive
    ///
    /// Never retries. A full mailbox discards the message.
    fn send(&self, destination: ProcessId, message: Message) -> Result<(), SendError>;

    /// Delivers `messages` to `destination` in order
    ///
    /// Returns how many were accepted. Messages that do not fit are dropped.
    /// Fails only when none were accepted.
    fn send_batch(
        &self,
        destination: ProcessId,
        messages: &[Message],
    ) -> Result<usize, BatchSendError>;

    /// Delivers `message` to each of `destinations` in order
    ///
    /// A failure for one destination does not stop delivery to the rest.
    /// Returns how many destinations accepted the message. Fails only when
    /// none did.
    fn send_to_many(
        &self,
        destinations: &[ProcessId],
        message: Message,
    ) -> Result<usize, BatchSendError>;
}

/// Receive side of the message-passing API
///
/// Implemented by the owning process's handle on its own mailbox; there is
/// exactly one receiver per mailbox.
pub trait MessageReceiver {
    /// Returns the process this receiver belongs to
    fn current_process(&self) -> ProcessId;

    /// Removes the oldest message, blocking while the mailbox is empty
    fn receive(&mut self) -> Result<Message, ReceiveError>;

    /// Removes exactly `count` messages in FIFO order, blocking until that
    /// many are queued
    ///
    /// Never returns a partial batch.
    fn receive_batch(&mut self, count: usize) -> Result<Vec<Message>, ReceiveError>;

    /// Like [`receive`](Self::receive), but gives up after `ticks` scheduler
    /// ticks
    fn receive_timeout(&mut self, ticks: u64) -> Result<Message, ReceiveError>;
}
