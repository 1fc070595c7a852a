//! First assignment pass: slot by slot, most topic-starved participants first.

use std::cmp::Reverse;

use rand::Rng;
use tracing::debug;

use crate::shuffle::shuffled;
use crate::state::{AssignmentState, ParticipantIndex};

/// Give every participant exactly one entry (a room or FREE) per time slot.
///
/// At each slot participants are ordered by unvisited-topic count, highest
/// first, ties by id. Each one takes the first room with a free seat found by
/// walking their unvisited topics and the rooms presenting them, both in
/// random order.
pub fn assign_greedy<R: Rng + ?Sized>(mut state: AssignmentState, rng: &mut R) -> AssignmentState {
    let time_slots = state.time_slots.clone();

    for time in &time_slots {
        let mut seated = 0usize;
        let mut free = 0usize;

        for participant in priority_order(&state) {
            if state.participant_states[participant]
                .assignments
                .contains_key(time)
            {
                continue;
            }

            match find_open_room(&state, participant, time, rng) {
                Some(room) => {
                    state.seat(participant, time, &room);
                    seated += 1;
                }
                None => {
                    state.mark_free(participant, time);
                    free += 1;
                }
            }
        }

        debug!(time = %time, seated, free, "Greedy pass filled time slot");
    }

    debug!(
        missed_topics = state.missed_topic_total(),
        free_slots = state.free_slot_total(),
        "Greedy pass complete"
    );

    state
}

/// Participant indices, most unvisited topics first, then by id ascending.
pub(crate) fn priority_order(state: &AssignmentState) -> Vec<ParticipantIndex> {
    let mut order: Vec<ParticipantIndex> = (0..state.participant_states.len()).collect();
    order.sort_by_key(|&i| {
        let p = &state.participant_states[i];
        (Reverse(p.missed_count()), p.participant.id.as_str())
    });
    order
}

fn find_open_room<R: Rng + ?Sized>(
    state: &AssignmentState,
    participant: ParticipantIndex,
    time: &str,
    rng: &mut R,
) -> Option<String> {
    let topics: Vec<String> = state.participant_states[participant]
        .unvisited_topics
        .iter()
        .cloned()
        .collect();

    for topic in shuffled(&topics, rng) {
        for room in state.candidate_rooms(time, &topic, rng) {
            if state.room_has_capacity(&room, time) {
                return Some(room);
            }
        }
    }

    None
}
