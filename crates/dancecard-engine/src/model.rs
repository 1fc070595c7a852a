//! Entities exchanged with the engine.
//!
//! The three input collections (participants, session events, room
//! capacities) arrive already validated by the caller. The engine hands back
//! one [`ParticipantDanceCard`] per participant.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Someone who walks the floor with a dance card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Stable, unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A topic presented in a room at a time slot.
///
/// `time` is canonical zero-padded 24-hour `HH:MM`, so lexicographic order is
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionEvent {
    pub time: String,
    pub room: String,
    pub topic: String,
}

impl SessionEvent {
    pub fn new(time: impl Into<String>, room: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            room: room.into(),
            topic: topic.into(),
        }
    }
}

/// How many participants a room seats at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomCapacity {
    pub room: String,
    pub capacity: u32,
}

impl RoomCapacity {
    pub fn new(room: impl Into<String>, capacity: u32) -> Self {
        Self {
            room: room.into(),
            capacity,
        }
    }
}

/// What a participant does during one time slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Assignment {
    /// No room at this slot.
    Free,
    /// Seated in `room`, where `topic` is presented at `time`.
    Assigned {
        time: String,
        room: String,
        topic: String,
    },
}

impl Assignment {
    pub fn is_free(&self) -> bool {
        matches!(self, Assignment::Free)
    }

    pub fn room(&self) -> Option<&str> {
        match self {
            Assignment::Free => None,
            Assignment::Assigned { room, .. } => Some(room),
        }
    }

    pub fn topic(&self) -> Option<&str> {
        match self {
            Assignment::Free => None,
            Assignment::Assigned { topic, .. } => Some(topic),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignment::Free => write!(f, "FREE"),
            Assignment::Assigned { room, topic, .. } => write!(f, "{} - {}", room, topic),
        }
    }
}

/// The finished schedule for a single participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDanceCard {
    pub participant: Participant,
    /// One entry per time slot, keyed by time.
    pub assignments: BTreeMap<String, Assignment>,
    /// Topics the participant never got to visit.
    pub missed_topics: BTreeSet<String>,
}

impl ParticipantDanceCard {
    /// Assignment at `time`, if the card has an entry for it.
    pub fn assignment(&self, time: &str) -> Option<&Assignment> {
        self.assignments.get(time)
    }

    /// Topics carried by the card's non-free assignments, in time order.
    pub fn visited_topics(&self) -> impl Iterator<Item = &str> {
        self.assignments.values().filter_map(Assignment::topic)
    }

    /// Number of slots spent in a room.
    pub fn assigned_count(&self) -> usize {
        self.assignments.values().filter(|a| !a.is_free()).count()
    }

    /// Number of slots marked FREE.
    pub fn free_count(&self) -> usize {
        self.assignments.values().filter(|a| a.is_free()).count()
    }
}
