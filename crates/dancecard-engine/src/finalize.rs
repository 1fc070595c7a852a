//! Turn scheduling state into display-ready dance cards.

use std::collections::BTreeMap;

use crate::model::{Assignment, ParticipantDanceCard};
use crate::state::{AssignmentState, SlotChoice};

/// One card per participant, sorted by name then id.
///
/// Every card carries one entry per time slot. A stored room whose topic
/// cannot be resolved, and a slot with no stored entry, both become FREE.
pub fn finalize(state: AssignmentState) -> Vec<ParticipantDanceCard> {
    let AssignmentState {
        participant_states,
        time_room_topic,
        time_slots,
        ..
    } = state;

    let mut cards: Vec<ParticipantDanceCard> = participant_states
        .into_iter()
        .map(|p| {
            let assignments: BTreeMap<String, Assignment> = time_slots
                .iter()
                .map(|time| {
                    let assignment = match p.assignments.get(time) {
                        Some(SlotChoice::Room(room)) => time_room_topic
                            .get(time)
                            .and_then(|rooms| rooms.get(room))
                            .map(|topic| Assignment::Assigned {
                                time: time.clone(),
                                room: room.clone(),
                                topic: topic.clone(),
                            })
                            .unwrap_or(Assignment::Free),
                        Some(SlotChoice::Free) | None => Assignment::Free,
                    };
                    (time.clone(), assignment)
                })
                .collect();

            ParticipantDanceCard {
                participant: p.participant,
                assignments,
                missed_topics: p.unvisited_topics,
            }
        })
        .collect();

    cards.sort_by(|a, b| {
        a.participant
            .name
            .cmp(&b.participant.name)
            .then_with(|| a.participant.id.cmp(&b.participant.id))
    });

    cards
}
