// Bounded event buffer
//
// Holds the most recent events in arrival order, feeding both the map and
// the console log. Overflow evicts the oldest entry in the same call that
// inserts the new one.

use super::SecurityEvent;
use std::collections::VecDeque;

/// Number of events retained by the client
pub const EVENT_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct EventRingBuffer {
    events: VecDeque<SecurityEvent>,
    capacity: usize,
}

impl EventRingBuffer {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append an event, returning the evicted oldest event on overflow
    pub fn push(&mut self, event: SecurityEvent) -> Option<SecurityEvent> {
        self.events.push_back(event);
        if self.events.len() > self.capacity {
            self.events.pop_front()
        } else {
            None
        }
    }

    /// Read-only view, oldest first
    pub fn all(&self) -> impl DoubleEndedIterator<Item = &SecurityEvent> + ExactSizeIterator {
        self.events.iter()
    }

    pub fn newest(&self) -> Option<&SecurityEvent> {
        self.events.back()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
