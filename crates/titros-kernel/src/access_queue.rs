//! [`AccessQueue`] – FIFO arbitration of pump access.
//!
//! An ordered, duplicate-free sequence of session identities in arrival
//! order. The front entry is the sole session authorized to command the
//! pump; it keeps that position until it disconnects. Removing any entry
//! never reorders the survivors.

use std::collections::VecDeque;

use titros_types::SessionId;

/// The arrival-ordered queue of connected sessions.
///
/// # Example
///
/// ```
/// use titros_kernel::access_queue::AccessQueue;
/// use titros_types::SessionId;
///
/// let mut queue = AccessQueue::new();
/// let a = SessionId::new();
/// let b = SessionId::new();
///
/// queue.join(a);
/// queue.join(b);
///
/// assert_eq!(queue.head(), Some(a));
/// assert_eq!(queue.position_of(b), Some(1));
/// ```
#[derive(Debug, Default, Clone)]
pub struct AccessQueue {
    entries: VecDeque<SessionId>,
}

impl AccessQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` to the back of the queue.
    ///
    /// Idempotent: a session already present keeps its position, so a
    /// duplicate transport connect event cannot create a second entry.
    pub fn join(&mut self, id: SessionId) {
        if !self.contains(id) {
            self.entries.push_back(id);
        }
    }

    /// Remove `id` from the queue, shifting every later entry one position
    /// forward. No-op when `id` is absent.
    pub fn leave(&mut self, id: SessionId) {
        if let Some(index) = self.entries.iter().position(|entry| *entry == id) {
            self.entries.remove(index);
        }
    }

    /// The session currently authorized to command the pump, if any.
    pub fn head(&self) -> Option<SessionId> {
        self.entries.front().copied()
    }

    /// Zero-based position of `id`, or `None` when not queued.
    pub fn position_of(&self, id: SessionId) -> Option<usize> {
        self.entries.iter().position(|entry| *entry == id)
    }

    /// Whether `id` is currently queued.
    pub fn contains(&self, id: SessionId) -> bool {
        self.entries.contains(&id)
    }

    /// Number of queued sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the queued sessions in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.entries.iter().copied()
    }
}
