//! Local-search repair pass.
//!
//! A work queue of participants with unvisited topics, most starved first.
//! Each dequeued participant tries to turn each of their FREE slots into a
//! seat for an unvisited topic. When the room is full the participant first
//! tries a relocation (trade the session they hold at another slot so both
//! topics fit), then evicts an occupant. Evicted participants are queued
//! again. The number of dequeues is capped by [`EngineConfig::max_iterations`].

use std::cmp::Reverse;
use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::{EngineConfig, EvictionPolicy};
use crate::state::{AssignmentState, ParticipantIndex};

/// What the repair pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairStats {
    /// Queue entries processed.
    pub iterations: usize,
    /// True if the pass stopped at the iteration ceiling with work left.
    pub exhausted: bool,
    /// Occupants moved out to make room.
    pub evictions: usize,
    /// Free slots filled by trading a session held at another slot.
    pub relocations: usize,
    /// Unvisited topics summed over participants, before the pass.
    pub missed_before: usize,
    /// Same, after the pass.
    pub missed_after: usize,
}

#[derive(Debug, Clone, Copy)]
struct WorkItem {
    participant: ParticipantIndex,
    missed: usize,
}

/// Run the repair pass over the greedy result.
pub fn repair<R: Rng + ?Sized>(
    mut state: AssignmentState,
    config: &EngineConfig,
    rng: &mut R,
) -> (AssignmentState, RepairStats) {
    let mut stats = RepairStats {
        missed_before: state.missed_topic_total(),
        ..Default::default()
    };

    let mut seed: Vec<WorkItem> = state
        .participant_states
        .iter()
        .enumerate()
        .filter(|(_, p)| p.missed_count() > 0)
        .map(|(participant, p)| WorkItem {
            participant,
            missed: p.missed_count(),
        })
        .collect();
    seed.sort_by_key(|item| Reverse(item.missed));
    let mut queue: VecDeque<WorkItem> = seed.into();

    debug!(queued = queue.len(), "Repair pass starting");

    while !queue.is_empty() {
        if stats.iterations >= config.max_iterations {
            stats.exhausted = true;
            warn!(
                max_iterations = config.max_iterations,
                remaining = queue.len(),
                "Repair pass hit its iteration ceiling; keeping partial improvement"
            );
            break;
        }
        let Some(item) = queue.pop_front() else {
            break;
        };
        stats.iterations += 1;

        let participant = item.participant;
        let before = state.participant_states[participant].missed_count();

        let free_times: Vec<String> = state
            .time_slots
            .iter()
            .filter(|t| state.participant_states[participant].is_free_at(t))
            .cloned()
            .collect();

        for time in &free_times {
            match fill_free_slot(&mut state, participant, time, config, rng) {
                SlotRepair::Evicted(victim) => {
                    stats.evictions += 1;
                    queue.push_back(WorkItem {
                        participant: victim,
                        missed: state.participant_states[victim].missed_count(),
                    });
                }
                SlotRepair::Relocated => stats.relocations += 1,
                SlotRepair::Seated | SlotRepair::Unchanged => {}
            }
        }

        let after = state.participant_states[participant].missed_count();
        trace!(
            participant = %state.participant_states[participant].participant.id,
            queued_missed = item.missed,
            before,
            after,
            "Repair step"
        );
        if after < before && after > 0 {
            queue.push_back(WorkItem {
                participant,
                missed: after,
            });
        }
    }

    stats.missed_after = state.missed_topic_total();
    debug!(
        iterations = stats.iterations,
        evictions = stats.evictions,
        relocations = stats.relocations,
        missed_before = stats.missed_before,
        missed_after = stats.missed_after,
        exhausted = stats.exhausted,
        "Repair pass complete"
    );

    (state, stats)
}

enum SlotRepair {
    Seated,
    Relocated,
    Evicted(ParticipantIndex),
    Unchanged,
}

/// Walk the participant's unvisited topics and act on the first one with a
/// candidate room at `time`: take a free seat, else relocate, else evict.
fn fill_free_slot<R: Rng + ?Sized>(
    state: &mut AssignmentState,
    participant: ParticipantIndex,
    time: &str,
    config: &EngineConfig,
    rng: &mut R,
) -> SlotRepair {
    let topics: Vec<String> = state.participant_states[participant]
        .unvisited_topics
        .iter()
        .cloned()
        .collect();

    for topic in &topics {
        let Some(room) = state.candidate_rooms(time, topic, rng).into_iter().next() else {
            continue;
        };

        if state.room_has_capacity(&room, time) {
            state.seat(participant, time, &room);
            return SlotRepair::Seated;
        }

        if config.relocation && relocate(state, participant, time, topic, rng) {
            return SlotRepair::Relocated;
        }

        let Some(victim) = select_victim(state, &room, time, config.eviction) else {
            continue;
        };
        trace!(
            time = %time,
            room = %room,
            evicted = %state.participant_states[victim].participant.id,
            seated = %state.participant_states[participant].participant.id,
            "Evicting occupant"
        );
        state.unseat(victim, time, &room);
        state.seat(participant, time, &room);
        return SlotRepair::Evicted(victim);
    }

    SlotRepair::Unchanged
}

/// Look for another slot where `topic` has a free seat and whose currently
/// held topic has a free seat at `time`; swap the two sessions.
fn relocate<R: Rng + ?Sized>(
    state: &mut AssignmentState,
    participant: ParticipantIndex,
    time: &str,
    topic: &str,
    rng: &mut R,
) -> bool {
    let held: Vec<(String, String)> = state
        .time_slots
        .iter()
        .filter(|other| other.as_str() != time)
        .filter_map(|other| {
            state.participant_states[participant]
                .room_at(other)
                .map(|room| (other.clone(), room.to_string()))
        })
        .collect();

    for (other_time, held_room) in held {
        let Some(held_topic) = state.topic_at(&other_time, &held_room).map(str::to_string) else {
            continue;
        };
        let Some(topic_room) = open_room(state, &other_time, topic, rng) else {
            continue;
        };
        let Some(held_topic_room) = open_room(state, time, &held_topic, rng) else {
            continue;
        };

        trace!(
            participant = %state.participant_states[participant].participant.id,
            time = %time,
            other_time = %other_time,
            topic = %topic,
            held_topic = %held_topic,
            "Relocating session"
        );
        state.unseat(participant, &other_time, &held_room);
        state.seat(participant, &other_time, &topic_room);
        state.seat(participant, time, &held_topic_room);
        return true;
    }

    false
}

fn open_room<R: Rng + ?Sized>(
    state: &AssignmentState,
    time: &str,
    topic: &str,
    rng: &mut R,
) -> Option<String> {
    state
        .candidate_rooms(time, topic, rng)
        .into_iter()
        .find(|room| state.room_has_capacity(room, time))
}

fn select_victim(
    state: &AssignmentState,
    room: &str,
    time: &str,
    policy: EvictionPolicy,
) -> Option<ParticipantIndex> {
    let seated = state.room_states.get(room)?.attendees.get(time)?;
    match policy {
        EvictionPolicy::FirstSeated => seated.iter().next().copied(),
        EvictionPolicy::FewestUnvisited => seated
            .iter()
            .copied()
            .min_by_key(|&i| state.participant_states[i].missed_count()),
    }
}
