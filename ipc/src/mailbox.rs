//! Bounded per-process mailbox.
//!
//! A fixed-capacity FIFO ring buffer. Occupancy is tracked by an explicit
//! count rather than inferred from `head == tail`, so a full mailbox and an
//! empty one are never confused and no slot value is ever treated as a
//! marker.

use crate::Message;
use alloc::vec;
use alloc::vec::Vec;

/// Capacity given to a mailbox when none is configured.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 8;

/// Mailbox error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxError {
    Full,
}

/// Fixed-capacity FIFO of messages owned by a single process.
///
/// Invariants: `count <= capacity`, `head` is the oldest message when
/// `count > 0`, and `tail` is the next free slot when `count < capacity`.
#[derive(Debug, Clone)]
pub struct Mailbox {
    slots: Vec<Message>,
    head: usize,
    tail: usize,
    count: usize,
}

impl Mailbox {
    /// Creates an empty mailbox with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    /// Creates an empty mailbox holding at most `capacity` messages.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Message::default(); capacity],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of queued messages.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns whether the mailbox is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns whether the mailbox is full.
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Returns remaining capacity.
    pub fn remaining_capacity(&self) -> usize {
        self.capacity() - self.count
    }

    /// Appends a message at the tail.
    ///
    /// A full mailbox is left untouched.
    pub fn enqueue(&mut self, message: Message) -> Result<(), MailboxError> {
        if self.is_full() {
            return Err(MailboxError::Full);
        }
        self.slots[self.tail] = message;
        self.tail = (self.tail + 1) % self.capacity();
        self.count += 1;
        Ok(())
    }

    /// Removes and returns the oldest message.
    pub fn dequeue(&mut self) -> Option<Message> {
        if self.is_empty() {
            return None;
        }
        let message = self.slots[self.head];
        self.head = (self.head + 1) % self.capacity();
        self.count -= 1;
        Some(message)
    }

    /// Iterates over queued messages from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = Message> + '_ {
        let capacity = self.capacity();
        (0..self.count).map(move |offset| self.slots[(self.head + offset) % capacity])
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}
