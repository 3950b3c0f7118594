//! Subscribed topics, their inboxes, and per-topic freshness tracking.
//!
//! The transport owns one [`Inbox`] per topic and bumps its counter on
//! every delivered message. The control loop remembers the counter value
//! it last processed; a topic is pending while its counter is ahead.

use heapless::Vec;

use crate::config::{MAX_MESSAGE_LEN, REMINDER_TOPIC, STATUS_TOPIC, TEXT_TOPIC};
use crate::error::Error;

/// The three subscribed topics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Topic {
    Status,
    Text,
    Reminder,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Status, Topic::Text, Topic::Reminder];

    pub const fn index(self) -> usize {
        match self {
            Topic::Status => 0,
            Topic::Text => 1,
            Topic::Reminder => 2,
        }
    }

    /// Full MQTT topic name.
    pub const fn path(self) -> &'static str {
        match self {
            Topic::Status => STATUS_TOPIC,
            Topic::Text => TEXT_TOPIC,
            Topic::Reminder => REMINDER_TOPIC,
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.path() == path)
    }
}

/// Latest message on one topic plus its arrival counter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inbox {
    /// Number of messages delivered so far. Never decreases.
    pub received: u32,
    pub payload: Vec<u8, MAX_MESSAGE_LEN>,
}

impl Inbox {
    pub const fn new() -> Self {
        Self {
            received: 0,
            payload: Vec::new(),
        }
    }

    /// Store a new payload and bump the counter. Oversized payloads are
    /// dropped without touching the previous message.
    pub fn deliver(&mut self, payload: &[u8]) -> Result<(), Error> {
        let payload = Vec::from_slice(payload).map_err(|_| Error::BufferOverflow)?;
        self.payload = payload;
        self.received = self.received.wrapping_add(1);
        Ok(())
    }
}

/// Last processed counter per topic, plus whether the topic has been
/// processed since the radio last came up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Freshness {
    processed: [u32; 3],
    fresh: [bool; 3],
}

impl Freshness {
    pub const fn new() -> Self {
        Self {
            processed: [0; 3],
            fresh: [false; 3],
        }
    }

    /// `true` when `received` is ahead of the last processed value.
    pub fn is_pending(&self, topic: Topic, received: u32) -> bool {
        received > self.processed[topic.index()]
    }

    pub fn mark_processed(&mut self, topic: Topic, received: u32) {
        self.processed[topic.index()] = received;
        self.fresh[topic.index()] = true;
    }

    /// Start a new radio session. Markers move to the counters seen at
    /// power-up so only messages arriving from now on count, and every
    /// topic is stale again.
    pub fn restart(&mut self, received: [u32; 3]) {
        self.processed = received;
        self.fresh = [false; 3];
    }

    pub fn is_fresh(&self, topic: Topic) -> bool {
        self.fresh[topic.index()]
    }

    pub fn all_fresh(&self) -> bool {
        self.fresh.iter().all(|&f| f)
    }
}
