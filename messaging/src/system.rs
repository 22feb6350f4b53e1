//! The message system: process table behind the critical section.

use crate::audit::{IpcAuditEvent, IpcAuditLog, IpcEvent};
use crate::critical::CriticalSection;
use crate::receive::ProcessContext;
use crate::{AttachError, ConfigError, MessagingConfig};
use core_types::ProcessId;
use kernel_api::{ProcessScheduler, WaitState};
use std::collections::HashSet;

/// Everything the critical section protects.
pub(crate) struct KernelTables<S> {
    pub(crate) scheduler: S,
    audit: IpcAuditLog,
    record_audit: bool,
    /// Processes with a live [`ProcessContext`]
    attached: HashSet<ProcessId>,
}

impl<S: ProcessScheduler> KernelTables<S> {
    pub(crate) fn record(&mut self, event: IpcEvent) {
        if self.record_audit {
            let now = self.scheduler.current_ticks();
            self.audit.record_event(now, event);
        }
    }
}

/// Bounded, blocking mailbox messaging over a process subsystem `S`
///
/// The process subsystem owns the mailboxes and wait states; the message
/// system only reaches them through [`ProcessScheduler`], always from inside
/// its critical section. Senders call the [`MessageSender`] methods directly
/// on the system. Receivers first [`attach`](Self::attach) to their own
/// process.
///
/// [`MessageSender`]: kernel_api::MessageSender
pub struct MessageSystem<S: ProcessScheduler> {
    pub(crate) section: CriticalSection<KernelTables<S>>,
    config: MessagingConfig,
}

impl<S: ProcessScheduler> MessageSystem<S> {
    /// Creates a message system with the default configuration
    pub fn new(scheduler: S) -> Self {
        Self::build(scheduler, MessagingConfig::default())
    }

    /// Creates a message system with a custom configuration
    pub fn with_config(scheduler: S, config: MessagingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(scheduler, config))
    }

    fn build(scheduler: S, config: MessagingConfig) -> Self {
        let tables = KernelTables {
            scheduler,
            audit: IpcAuditLog::with_capacity(config.audit_capacity),
            record_audit: config.record_audit,
            attached: HashSet::new(),
        };
        Self {
            section: CriticalSection::new(tables),
            config,
        }
    }

    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    /// Binds the caller to `process` as the sole receiver of its mailbox
    ///
    /// The claim is released when the returned context is dropped.
    pub fn attach(&self, process: ProcessId) -> Result<ProcessContext<'_, S>, AttachError> {
        let mut tables = self.section.enter();
        if !tables.scheduler.is_live(process) {
            return Err(AttachError::UnknownProcess(process));
        }
        if !tables.attached.insert(process) {
            return Err(AttachError::AlreadyAttached(process));
        }
        Ok(ProcessContext::new(self, process))
    }

    pub(crate) fn detach(&self, process: ProcessId) {
        self.section.enter().attached.remove(&process);
    }

    /// Runs `f` against the process subsystem inside the critical section
    ///
    /// Use this for process creation and termination and for advancing the
    /// scheduler clock. Parked receivers are woken afterwards to re-check
    /// their state, since `f` may have readied or terminated them.
    pub fn with_scheduler<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = {
            let mut tables = self.section.enter();
            f(&mut tables.scheduler)
        };
        self.section.notify_ready();
        result
    }

    /// Runs `f` against a read-only view of the process subsystem
    pub fn inspect<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let tables = self.section.enter();
        f(&tables.scheduler)
    }

    /// Returns the number of messages queued for `process`
    pub fn pending(&self, process: ProcessId) -> Option<usize> {
        self.inspect(|scheduler| scheduler.mailbox(process).map(|mailbox| mailbox.len()))
    }

    /// Returns the receive-side wait state of `process`
    pub fn wait_state(&self, process: ProcessId) -> Option<WaitState> {
        self.inspect(|scheduler| scheduler.wait_state(process))
    }

    /// Returns a snapshot of the audit log
    pub fn audit_events(&self) -> Vec<IpcAuditEvent> {
        self.section.enter().audit.get_events()
    }

    pub fn clear_audit_log(&self) {
        self.section.enter().audit.clear();
    }

    /// Consumes the system and returns the process subsystem
    pub fn into_scheduler(self) -> S {
        self.section.into_inner().scheduler
    }
}
