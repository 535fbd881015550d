//! Bounded, newest-first event log
//!
//! The log is the sole observer-facing output of the simulation: actions,
//! speech, informational notices and per-agent failures all land here.

use std::collections::VecDeque;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::types::Timestamp;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[display(fmt = "speech")]
    Speech,
    #[display(fmt = "action")]
    Action,
    #[display(fmt = "info")]
    Info,
    #[display(fmt = "error")]
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: Timestamp,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

impl Event {
    pub fn new(timestamp: Timestamp, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventLog {
    capacity: usize,
    events: VecDeque<Event>,
    appended: u64,
}

impl EventLog {
    /// A capacity of zero is bumped to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity),
            appended: 0,
        }
    }

    /// Prepend an event, dropping the oldest beyond capacity
    pub fn append(&mut self, event: Event) {
        self.events.push_front(event);
        self.events.truncate(self.capacity);
        self.appended += 1;
    }

    pub fn push(&mut self, timestamp: Timestamp, kind: EventKind, message: impl Into<String>) {
        self.append(Event::new(timestamp, kind, message));
    }

    /// Retained events, newest first
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter()
    }

    pub fn latest(&self) -> Option<&Event> {
        self.events.front()
    }

    pub fn clear(&mut self) {
        self.events.clear();
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

    /// Events ever appended, including evicted and cleared ones
    pub fn total_appended(&self) -> u64 {
        self.appended
    }
}
