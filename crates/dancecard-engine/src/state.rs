//! Mutable scheduling state shared by the greedy and repair passes.
//!
//! Participants are addressed by their index in
//! [`AssignmentState::participant_states`]; room attendee sets hold those
//! indices. The whole graph is owned by one pipeline run and moved from stage
//! to stage.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use tracing::debug;

use crate::model::{Participant, RoomCapacity};
use crate::preprocess::{Preprocessed, TimeRoomTopicMap, rooms_offering};
use crate::shuffle::shuffled;

/// Index into [`AssignmentState::participant_states`].
pub type ParticipantIndex = usize;

/// What a participant holds at one time slot, before topics are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotChoice {
    Free,
    Room(String),
}

/// Per-participant progress through the topic universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantState {
    pub participant: Participant,
    /// Topics not yet seen. Starts as the full universe.
    pub unvisited_topics: BTreeSet<String>,
    /// time -> room or FREE.
    pub assignments: BTreeMap<String, SlotChoice>,
}

impl ParticipantState {
    fn new(participant: Participant, topics: &[String]) -> Self {
        Self {
            participant,
            unvisited_topics: topics.iter().cloned().collect(),
            assignments: BTreeMap::new(),
        }
    }

    pub fn missed_count(&self) -> usize {
        self.unvisited_topics.len()
    }

    pub fn is_free_at(&self, time: &str) -> bool {
        matches!(self.assignments.get(time), Some(SlotChoice::Free))
    }

    pub fn room_at(&self, time: &str) -> Option<&str> {
        match self.assignments.get(time) {
            Some(SlotChoice::Room(room)) => Some(room),
            _ => None,
        }
    }
}

/// Per-room occupancy across every known time slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomState {
    pub room: String,
    pub capacity: usize,
    /// time -> seated participants. Holds an entry for every time slot,
    /// including slots in which the room hosts nothing.
    pub attendees: BTreeMap<String, BTreeSet<ParticipantIndex>>,
}

impl RoomState {
    fn new(room: String, capacity: usize, time_slots: &[String]) -> Self {
        Self {
            room,
            capacity,
            attendees: time_slots
                .iter()
                .map(|t| (t.clone(), BTreeSet::new()))
                .collect(),
        }
    }

    pub fn occupancy(&self, time: &str) -> usize {
        self.attendees.get(time).map_or(0, BTreeSet::len)
    }

    pub fn has_capacity(&self, time: &str) -> bool {
        self.occupancy(time) < self.capacity
    }
}

/// Scheduling state passed between stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentState {
    pub participant_states: Vec<ParticipantState>,
    /// Keyed by room name. Only rooms with a declared capacity appear here.
    pub room_states: BTreeMap<String, RoomState>,
    pub time_room_topic: TimeRoomTopicMap,
    pub time_slots: Vec<String>,
}

impl AssignmentState {
    /// Build fresh state: every participant has the full topic set and no
    /// assignments, every room is empty at every time slot.
    ///
    /// A room listed twice in `room_capacities` keeps its last capacity.
    pub fn initialize(
        participants: &[Participant],
        room_capacities: &[RoomCapacity],
        preprocessed: Preprocessed,
    ) -> Self {
        let Preprocessed {
            time_slots,
            topics,
            time_room_topic,
        } = preprocessed;

        let participant_states: Vec<ParticipantState> = participants
            .iter()
            .map(|p| ParticipantState::new(p.clone(), &topics))
            .collect();

        let mut room_states = BTreeMap::new();
        for rc in room_capacities {
            room_states.insert(
                rc.room.clone(),
                RoomState::new(rc.room.clone(), rc.capacity as usize, &time_slots),
            );
        }

        debug!(
            participants = participant_states.len(),
            rooms = room_states.len(),
            time_slots = time_slots.len(),
            topics = topics.len(),
            "Initialized assignment state"
        );

        Self {
            participant_states,
            room_states,
            time_room_topic,
            time_slots,
        }
    }

    /// Topic presented in `room` at `time`.
    pub fn topic_at(&self, time: &str, room: &str) -> Option<&str> {
        self.time_room_topic
            .get(time)
            .and_then(|rooms| rooms.get(room))
            .map(String::as_str)
    }

    /// Sum of unvisited topics over all participants.
    pub fn missed_topic_total(&self) -> usize {
        self.participant_states.iter().map(ParticipantState::missed_count).sum()
    }

    /// Number of participant-slots marked FREE.
    pub fn free_slot_total(&self) -> usize {
        self.participant_states
            .iter()
            .flat_map(|p| p.assignments.values())
            .filter(|c| matches!(c, SlotChoice::Free))
            .count()
    }

    pub fn room_has_capacity(&self, room: &str, time: &str) -> bool {
        self.room_states
            .get(room)
            .is_some_and(|r| r.has_capacity(time))
    }

    /// Rooms with a declared capacity that present `topic` at `time`, in a
    /// fresh random order.
    pub(crate) fn candidate_rooms<R: Rng + ?Sized>(
        &self,
        time: &str,
        topic: &str,
        rng: &mut R,
    ) -> Vec<String> {
        let known: Vec<String> = rooms_offering(&self.time_room_topic, time, topic)
            .into_iter()
            .filter(|room| self.room_states.contains_key(*room))
            .map(str::to_string)
            .collect();
        shuffled(&known, rng)
    }

    /// Seat `participant` in `room` at `time` and mark the room's topic visited.
    ///
    /// Callers check capacity first.
    pub(crate) fn seat(&mut self, participant: ParticipantIndex, time: &str, room: &str) {
        let topic = self.topic_at(time, room).map(str::to_string);

        if let Some(room_state) = self.room_states.get_mut(room) {
            debug_assert!(room_state.has_capacity(time), "seating over capacity");
            room_state
                .attendees
                .entry(time.to_string())
                .or_default()
                .insert(participant);
        }

        let state = &mut self.participant_states[participant];
        state
            .assignments
            .insert(time.to_string(), SlotChoice::Room(room.to_string()));
        if let Some(topic) = topic {
            state.unvisited_topics.remove(&topic);
        }
    }

    /// Mark `participant` as attending nothing at `time`.
    pub(crate) fn mark_free(&mut self, participant: ParticipantIndex, time: &str) {
        self.participant_states[participant]
            .assignments
            .insert(time.to_string(), SlotChoice::Free);
    }

    /// Take `participant` out of `room` at `time`: the slot goes back to FREE
    /// and the room's topic goes back into the unvisited set.
    pub(crate) fn unseat(&mut self, participant: ParticipantIndex, time: &str, room: &str) {
        if let Some(seated) = self
            .room_states
            .get_mut(room)
            .and_then(|r| r.attendees.get_mut(time))
        {
            seated.remove(&participant);
        }

        let topic = self.topic_at(time, room).map(str::to_string);
        let state = &mut self.participant_states[participant];
        state.assignments.insert(time.to_string(), SlotChoice::Free);
        if let Some(topic) = topic {
            state.unvisited_topics.insert(topic);
        }
    }
}
