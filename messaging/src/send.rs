//! Send path: single, batch and fan-out delivery.

use crate::audit::{IpcEvent, RejectReason};
use crate::system::{KernelTables, MessageSystem};
use core_types::ProcessId;
use ipc::Message;
use kernel_api::{BatchSendError, MessageSender, ProcessScheduler, SendError};

impl<S: ProcessScheduler> KernelTables<S> {
    /// Queues `message` for `destination` and readies it if it was waiting.
    ///
    /// Returns whether a blocked receiver was readied. Must run inside the
    /// critical section.
    fn deliver(&mut self, destination: ProcessId, message: Message) -> Result<bool, SendError> {
        if !self.scheduler.is_live(destination) {
            self.record(IpcEvent::Rejected {
                to: destination,
                message,
                reason: RejectReason::InvalidDestination,
            });
            return Err(SendError::InvalidDestination(destination));
        }

        let queued = match self.scheduler.mailbox_mut(destination) {
            Some(mailbox) => mailbox.enqueue(message).is_ok(),
            None => return Err(SendError::InvalidDestination(destination)),
        };
        if !queued {
            self.record(IpcEvent::Rejected {
                to: destination,
                message,
                reason: RejectReason::MailboxFull,
            });
            return Err(SendError::MailboxFull(destination));
        }

        let waiting = self
            .scheduler
            .wait_state(destination)
            .is_some_and(|state| state.is_blocked_for_receive());
        if waiting {
            self.scheduler.make_ready(destination);
        }

        self.record(IpcEvent::Delivered {
            to: destination,
            message,
            woke_receiver: waiting,
        });
        Ok(waiting)
    }
}

/// Turns a success count into the batch result.
fn tally(delivered: usize, attempted: usize) -> Result<usize, BatchSendError> {
    if delivered == 0 {
        Err(BatchSendError::AllDropped { attempted })
    } else {
        Ok(delivered)
    }
}

impl<S: ProcessScheduler> MessageSender for MessageSystem<S> {
    fn send(&self, destination: ProcessId, message: Message) -> Result<(), SendError> {
        let result = self.section.enter().deliver(destination, message);

        match result {
            Ok(woke_receiver) => {
                tracing::trace!(%destination, %message, woke_receiver, "message sent");
                if woke_receiver {
                    self.section.notify_ready();
                }
                Ok(())
            }
            Err(err) => {
                tracing::debug!(%destination, %message, error = %err, "message not sent");
                Err(err)
            }
        }
    }

    fn send_batch(
        &self,
        destination: ProcessId,
        messages: &[Message],
    ) -> Result<usize, BatchSendError> {
        let delivered = messages
            .iter()
            .filter(|message| self.send(destination, **message).is_ok())
            .count();

        tracing::debug!(
            %destination,
            delivered,
            attempted = messages.len(),
            "batch send finished"
        );
        tally(delivered, messages.len())
    }

    fn send_to_many(
        &self,
        destinations: &[ProcessId],
        message: Message,
    ) -> Result<usize, BatchSendError> {
        let delivered = destinations
            .iter()
            .filter(|destination| self.send(**destination, message).is_ok())
            .count();

        tracing::debug!(
            %message,
            delivered,
            attempted = destinations.len(),
            "fan-out send finished"
        );
        tally(delivered, destinations.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestScheduler;
    use kernel_api::WaitState;

    fn msgs(values: impl IntoIterator<Item = u32>) -> Vec<Message> {
        values.into_iter().map(Message::new).collect()
    }

    fn queued(system: &MessageSystem<TestScheduler>, pid: ProcessId) -> Vec<u32> {
        system.inspect(|s| {
            s.mailbox(pid)
                .map(|m| m.iter().map(|msg| msg.value()).collect())
                .unwrap_or_default()
        })
    }

    #[test]
    fn test_send_to_idle_mailbox() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        system.send(pid, Message::new(10)).unwrap();
        system.send(pid, Message::new(0)).unwrap();

        assert_eq!(queued(&system, pid), vec![10, 0]);
        // Nobody was waiting, so nobody was readied
        assert_eq!(system.inspect(|s| s.ready_calls), 0);
    }

    #[test]
    fn test_send_to_unknown_process() {
        let system = MessageSystem::new(TestScheduler::new(8));
        let stranger = ProcessId::new();
        assert_eq!(
            system.send(stranger, Message::new(1)),
            Err(SendError::InvalidDestination(stranger))
        );
    }

    #[test]
    fn test_send_to_terminated_process() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        system.with_scheduler(|s| s.terminate(pid));
        assert_eq!(
            system.send(pid, Message::new(1)),
            Err(SendError::InvalidDestination(pid))
        );
    }

    #[test]
    fn test_full_mailbox_unchanged() {
        let mut scheduler = TestScheduler::new(2);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        system.send(pid, Message::new(1)).unwrap();
        system.send(pid, Message::new(2)).unwrap();
        assert_eq!(
            system.send(pid, Message::new(3)),
            Err(SendError::MailboxFull(pid))
        );
        assert_eq!(queued(&system, pid), vec![1, 2]);

        let events = system.audit_events();
        assert!(matches!(
            events.last().map(|e| &e.event),
            Some(IpcEvent::Rejected {
                reason: RejectReason::MailboxFull,
                ..
            })
        ));
    }

    #[test]
    fn test_send_readies_blocked_receiver() {
        let mut scheduler = TestScheduler::new(4);
        let pid = scheduler.spawn();
        scheduler.set_wait_state(pid, WaitState::BlockedForReceive);
        let system = MessageSystem::new(scheduler);

        system.send(pid, Message::new(5)).unwrap();

        assert_eq!(system.wait_state(pid), Some(WaitState::Running));
        assert_eq!(system.inspect(|s| s.ready_calls), 1);
        assert!(system
            .audit_events()
            .iter()
            .any(|e| matches!(e.event, IpcEvent::Delivered { woke_receiver: true, .. })));
    }

    #[test]
    fn test_send_cancels_timed_wait() {
        let mut scheduler = TestScheduler::new(4);
        let pid = scheduler.spawn();
        scheduler.set_wait_state(pid, WaitState::BlockedForReceiveTimed { wake_tick: 100 });
        let system = MessageSystem::new(scheduler);

        system.send(pid, Message::new(5)).unwrap();
        assert_eq!(system.wait_state(pid), Some(WaitState::Running));
    }

    #[test]
    fn test_send_to_full_mailbox_does_not_wake() {
        let mut scheduler = TestScheduler::new(1);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);
        system.send(pid, Message::new(1)).unwrap();

        system.with_scheduler(|s| s.set_wait_state(pid, WaitState::BlockedForReceive));
        assert!(system.send(pid, Message::new(2)).is_err());
        assert_eq!(system.wait_state(pid), Some(WaitState::BlockedForReceive));
    }

    #[test]
    fn test_send_batch_partial_delivery() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        system.send_batch(pid, &msgs(0..5)).unwrap();
        let accepted = system.send_batch(pid, &msgs(100..108)).unwrap();

        assert_eq!(accepted, 3);
        assert_eq!(queued(&system, pid), vec![0, 1, 2, 3, 4, 100, 101, 102]);
    }

    #[test]
    fn test_send_batch_all_dropped() {
        let mut scheduler = TestScheduler::new(2);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        assert_eq!(system.send_batch(pid, &msgs(0..2)), Ok(2));
        assert_eq!(
            system.send_batch(pid, &msgs(2..5)),
            Err(BatchSendError::AllDropped { attempted: 3 })
        );
    }

    #[test]
    fn test_send_batch_empty_is_failure() {
        let mut scheduler = TestScheduler::new(2);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        assert_eq!(
            system.send_batch(pid, &[]),
            Err(BatchSendError::AllDropped { attempted: 0 })
        );
    }

    #[test]
    fn test_send_to_many_counts_accepting_destinations() {
        let mut scheduler = TestScheduler::new(1);
        let a = scheduler.spawn();
        let b = scheduler.spawn();
        let full = scheduler.spawn();
        let system = MessageSystem::new(scheduler);
        system.send(full, Message::new(0)).unwrap();

        let stranger = ProcessId::new();
        let accepted = system
            .send_to_many(&[a, stranger, full, b], Message::new(42))
            .unwrap();

        assert_eq!(accepted, 2);
        assert_eq!(queued(&system, a), vec![42]);
        assert_eq!(queued(&system, b), vec![42]);
        assert_eq!(queued(&system, full), vec![0]);
    }

    #[test]
    fn test_send_to_many_all_dropped() {
        let system = MessageSystem::new(TestScheduler::new(1));
        assert_eq!(
            system.send_to_many(&[ProcessId::new(), ProcessId::new()], Message::new(1)),
            Err(BatchSendError::AllDropped { attempted: 2 })
        );
    }

    #[test]
    fn test_delivery_order_follows_destination_order() {
        let mut scheduler = TestScheduler::new(4);
        let a = scheduler.spawn();
        let b = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        system.send_to_many(&[b, a], Message::new(9)).unwrap();

        let order: Vec<ProcessId> = system
            .audit_events()
            .iter()
            .filter_map(|e| match e.event {
                IpcEvent::Delivered { to, .. } => Some(to),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec![b, a]);
    }
}
