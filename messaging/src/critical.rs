//! Critical section guarding all mailbox state.
//!
//! One lock covers the whole process table, so every operation that reads or
//! writes a mailbox or a wait state is serialized against every other one.
//! Parked receivers wait on a single condition variable; each one re-checks
//! its own predicate when woken.
//!
//! The section is not reentrant: entering it again from the same thread
//! while a guard is alive deadlocks.

use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Exclusive-access region around a value of type `T`.
#[derive(Debug, Default)]
pub struct CriticalSection<T> {
    state: Mutex<T>,
    wakeups: Condvar,
}

/// Proof of being inside a [`CriticalSection`]. Leaving scope exits it.
#[derive(Debug)]
pub struct CriticalGuard<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> CriticalSection<T> {
    pub fn new(state: T) -> Self {
        Self {
            state: Mutex::new(state),
            wakeups: Condvar::new(),
        }
    }

    /// Enters the section, waiting for any other holder to leave.
    ///
    /// A holder that panicked leaves the state as it was between two
    /// complete operations, so poisoning is ignored.
    pub fn enter(&self) -> CriticalGuard<'_, T> {
        CriticalGuard {
            guard: self.state.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Leaves the section and parks until [`notify_ready`](Self::notify_ready),
    /// then re-enters it.
    ///
    /// Wake-ups may be spurious; callers loop on their own predicate.
    pub fn suspend<'a>(&'a self, guard: CriticalGuard<'a, T>) -> CriticalGuard<'a, T> {
        CriticalGuard {
            guard: self
                .wakeups
                .wait(guard.guard)
                .unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Wakes every parked holder so it can re-check its predicate.
    pub fn notify_ready(&self) {
        self.wakeups.notify_all();
    }

    /// Consumes the section and returns the protected state.
    pub fn into_inner(self) -> T {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Deref for CriticalGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for CriticalGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
