//! Receive path: the owning process drains its own mailbox.

use crate::audit::IpcEvent;
use crate::system::MessageSystem;
use core_types::ProcessId;
use ipc::Message;
use kernel_api::{MessageReceiver, ProcessScheduler, ReceiveError, WaitState};

/// A process's handle on its own mailbox
///
/// Obtained from [`MessageSystem::attach`]. At most one context exists per
/// process, which makes its owner the only consumer of the mailbox.
pub struct ProcessContext<'a, S: ProcessScheduler> {
    system: &'a MessageSystem<S>,
    process: ProcessId,
}

impl<'a, S: ProcessScheduler> ProcessContext<'a, S> {
    pub(crate) fn new(system: &'a MessageSystem<S>, process: ProcessId) -> Self {
        Self { system, process }
    }

    /// Waits until at least `wanted` messages are queued, then removes
    /// exactly that many.
    ///
    /// Every wake-up re-checks the predicate from scratch: a wake only means
    /// something changed, not that enough messages arrived.
    fn wait_for(
        &mut self,
        wanted: usize,
        timeout: Option<u64>,
    ) -> Result<Vec<Message>, ReceiveError> {
        let process = self.process;
        let section = &self.system.section;
        let mut tables = section.enter();

        let capacity = tables
            .scheduler
            .mailbox(process)
            .map(|mailbox| mailbox.capacity())
            .ok_or(ReceiveError::ProcessTerminated(process))?;
        if wanted > capacity {
            return Err(ReceiveError::RequestExceedsCapacity {
                requested: wanted,
                capacity,
            });
        }

        let wake_tick = timeout.map(|ticks| tables.scheduler.current_ticks().saturating_add(ticks));

        loop {
            let available = match tables.scheduler.mailbox(process) {
                Some(mailbox) if tables.scheduler.is_live(process) => mailbox.len(),
                _ => return Err(ReceiveError::ProcessTerminated(process)),
            };

            if available >= wanted {
                let mut received = Vec::with_capacity(wanted);
                if let Some(mailbox) = tables.scheduler.mailbox_mut(process) {
                    received.extend((0..wanted).map_while(|_| mailbox.dequeue()));
                }
                for message in &received {
                    tables.record(IpcEvent::Received {
                        by: process,
                        message: *message,
                    });
                }
                tracing::trace!(%process, count = received.len(), "messages received");
                return Ok(received);
            }

            if let Some(wake_tick) = wake_tick {
                if tables.scheduler.current_ticks() >= wake_tick {
                    tables.scheduler.set_wait_state(process, WaitState::Running);
                    tables.record(IpcEvent::TimedOut { process });
                    return Err(ReceiveError::TimedOut);
                }
            }

            let state = match wake_tick {
                Some(wake_tick) => WaitState::BlockedForReceiveTimed { wake_tick },
                None => WaitState::BlockedForReceive,
            };
            tables.scheduler.set_wait_state(process, state);
            tables.record(IpcEvent::Blocked {
                process,
                wanted,
                available,
            });
            tracing::trace!(%process, wanted, available, "blocked for receive");

            // Yield until the scheduler makes us ready again.
            while tables
                .scheduler
                .wait_state(process)
                .is_some_and(|state| state.is_blocked_for_receive())
            {
                tables = section.suspend(tables);
            }
            tables.record(IpcEvent::Woken { process });
        }
    }
}

impl<S: ProcessScheduler> MessageReceiver for ProcessContext<'_, S> {
    fn current_process(&self) -> ProcessId {
        self.process
    }

    fn receive(&mut self) -> Result<Message, ReceiveError> {
        self.wait_for(1, None)?
            .pop()
            .ok_or(ReceiveError::ProcessTerminated(self.process))
    }

    fn receive_batch(&mut self, count: usize) -> Result<Vec<Message>, ReceiveError> {
        self.wait_for(count, None)
    }

    fn receive_timeout(&mut self, ticks: u64) -> Result<Message, ReceiveError> {
        self.wait_for(1, Some(ticks))?
            .pop()
            .ok_or(ReceiveError::ProcessTerminated(self.process))
    }
}

impl<S: ProcessScheduler> Drop for ProcessContext<'_, S> {
    fn drop(&mut self) {
        self.system.detach(self.process);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestScheduler;
    use kernel_api::MessageSender;
    use std::thread;

    fn wait_until_blocked(system: &MessageSystem<TestScheduler>, pid: ProcessId) {
        while !system
            .wait_state(pid)
            .is_some_and(|state| state.is_blocked_for_receive())
        {
            thread::yield_now();
        }
    }

    #[test]
    fn test_receive_without_blocking() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);
        system.send(pid, Message::new(7)).unwrap();
        system.send(pid, Message::new(8)).unwrap();

        let mut context = system.attach(pid).unwrap();
        assert_eq!(context.current_process(), pid);
        assert_eq!(context.receive(), Ok(Message::new(7)));
        assert_eq!(context.receive(), Ok(Message::new(8)));
        assert_eq!(system.pending(pid), Some(0));
    }

    #[test]
    fn test_receive_blocks_until_send() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        thread::scope(|scope| {
            let receiver = scope.spawn(|| {
                let mut context = system.attach(pid).unwrap();
                context.receive()
            });

            wait_until_blocked(&system, pid);
            assert!(!receiver.is_finished());
            system.send(pid, Message::new(0)).unwrap();

            assert_eq!(receiver.join().unwrap(), Ok(Message::new(0)));
        });

        assert_eq!(system.pending(pid), Some(0));
        assert_eq!(system.wait_state(pid), Some(WaitState::Running));
    }

    #[test]
    fn test_receive_batch_waits_for_full_count() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        thread::scope(|scope| {
            let receiver = scope.spawn(|| {
                let mut context = system.attach(pid).unwrap();
                context.receive_batch(3)
            });

            for value in 1..=3u32 {
                wait_until_blocked(&system, pid);
                assert!(!receiver.is_finished());
                system.send(pid, Message::new(value)).unwrap();
            }

            assert_eq!(
                receiver.join().unwrap(),
                Ok(vec![Message::new(1), Message::new(2), Message::new(3)])
            );
        });

        // One block per insufficient check
        let blocks = system
            .audit_events()
            .iter()
            .filter(|e| matches!(e.event, IpcEvent::Blocked { .. }))
            .count();
        assert_eq!(blocks, 3);
    }

    #[test]
    fn test_receive_batch_leaves_extra_messages() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);
        for value in 0..5 {
            system.send(pid, Message::new(value)).unwrap();
        }

        let mut context = system.attach(pid).unwrap();
        let batch = context.receive_batch(2).unwrap();
        assert_eq!(batch, vec![Message::new(0), Message::new(1)]);
        assert_eq!(system.pending(pid), Some(3));
    }

    #[test]
    fn test_receive_batch_zero_returns_immediately() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        let mut context = system.attach(pid).unwrap();
        assert_eq!(context.receive_batch(0), Ok(Vec::new()));
    }

    #[test]
    fn test_receive_batch_exceeding_capacity() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);
        system.send(pid, Message::new(1)).unwrap();

        let mut context = system.attach(pid).unwrap();
        assert_eq!(
            context.receive_batch(12),
            Err(ReceiveError::RequestExceedsCapacity {
                requested: 12,
                capacity: 8
            })
        );
        assert_eq!(system.wait_state(pid), Some(WaitState::Running));
        assert_eq!(system.pending(pid), Some(1));
    }

    #[test]
    fn test_receive_timeout_expires() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        thread::scope(|scope| {
            let receiver = scope.spawn(|| {
                let mut context = system.attach(pid).unwrap();
                context.receive_timeout(10)
            });

            wait_until_blocked(&system, pid);
            assert_eq!(
                system.wait_state(pid),
                Some(WaitState::BlockedForReceiveTimed { wake_tick: 10 })
            );
            system.with_scheduler(|s| s.advance(10));

            assert_eq!(receiver.join().unwrap(), Err(ReceiveError::TimedOut));
        });
        assert_eq!(system.wait_state(pid), Some(WaitState::Running));
    }

    #[test]
    fn test_receive_timeout_satisfied_by_send() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        thread::scope(|scope| {
            let receiver = scope.spawn(|| {
                let mut context = system.attach(pid).unwrap();
                context.receive_timeout(10)
            });

            wait_until_blocked(&system, pid);
            system.send(pid, Message::new(3)).unwrap();
            assert_eq!(receiver.join().unwrap(), Ok(Message::new(3)));
        });
    }

    #[test]
    fn test_timeout_of_zero_with_empty_mailbox() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        let mut context = system.attach(pid).unwrap();
        assert_eq!(context.receive_timeout(0), Err(ReceiveError::TimedOut));
    }

    #[test]
    fn test_termination_unblocks_receiver() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        thread::scope(|scope| {
            let receiver = scope.spawn(|| {
                let mut context = system.attach(pid).unwrap();
                context.receive()
            });

            wait_until_blocked(&system, pid);
            system.with_scheduler(|s| s.terminate(pid));

            assert_eq!(
                receiver.join().unwrap(),
                Err(ReceiveError::ProcessTerminated(pid))
            );
        });
    }

    #[test]
    fn test_spurious_wake_reblocks() {
        let mut scheduler = TestScheduler::new(8);
        let pid = scheduler.spawn();
        let system = MessageSystem::new(scheduler);

        thread::scope(|scope| {
            let receiver = scope.spawn(|| {
                let mut context = system.attach(pid).unwrap();
                context.receive()
            });

            wait_until_blocked(&system, pid);
            // Ready the process with nothing queued.
            system.with_scheduler(|s| s.make_ready(pid));
            wait_until_blocked(&system, pid);
            assert!(!receiver.is_finished());

            system.send(pid, Message::new(11)).unwrap();
            assert_eq!(receiver.join().unwrap(), Ok(Message::new(11)));
        });
    }
}
