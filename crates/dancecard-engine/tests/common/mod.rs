//! Invariant checks shared by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use dancecard_engine::{Participant, ParticipantDanceCard, RoomCapacity, SessionEvent};

/// Every room stays within its capacity at every time slot.
pub fn assert_capacity(cards: &[ParticipantDanceCard], rooms: &[RoomCapacity]) {
    let capacity: BTreeMap<&str, u32> = rooms.iter().map(|r| (r.room.as_str(), r.capacity)).collect();
    let mut occupancy: BTreeMap<(&str, &str), u32> = BTreeMap::new();

    for card in cards {
        for (time, assignment) in &card.assignments {
            if let Some(room) = assignment.room() {
                *occupancy.entry((room, time.as_str())).or_default() += 1;
            }
        }
    }

    for ((room, time), count) in occupancy {
        let cap = capacity
            .get(room)
            .unwrap_or_else(|| panic!("{} has seatings but no declared capacity", room));
        assert!(
            count <= *cap,
            "Room {} has {} participants at {}, which exceeds capacity {}",
            room,
            count,
            time,
            cap
        );
    }
}

/// No participant sees the same topic twice.
pub fn assert_no_repeated_topics(cards: &[ParticipantDanceCard]) {
    for card in cards {
        let mut seen = BTreeSet::new();
        for topic in card.visited_topics() {
            assert!(
                seen.insert(topic),
                "{} sees {} more than once",
                card.participant.id,
                topic
            );
        }
    }
}

/// Missed topics are exactly the topics no assignment carries.
pub fn assert_missed_topics_exact(cards: &[ParticipantDanceCard], events: &[SessionEvent]) {
    let universe: BTreeSet<&str> = events.iter().map(|e| e.topic.as_str()).collect();
    for card in cards {
        let visited: BTreeSet<&str> = card.visited_topics().collect();
        let expected: BTreeSet<&str> = universe.difference(&visited).copied().collect();
        let missed: BTreeSet<&str> = card.missed_topics.iter().map(String::as_str).collect();
        assert_eq!(missed, expected, "missed topics wrong for {}", card.participant.id);
    }
}

/// Each participant appears once; each card has exactly the event time slots.
pub fn assert_complete_coverage(
    cards: &[ParticipantDanceCard],
    participants: &[Participant],
    events: &[SessionEvent],
) {
    let expected_ids: BTreeSet<&str> = participants.iter().map(|p| p.id.as_str()).collect();
    let ids: Vec<&str> = cards.iter().map(|c| c.participant.id.as_str()).collect();
    assert_eq!(ids.len(), participants.len());
    assert_eq!(ids.iter().copied().collect::<BTreeSet<_>>(), expected_ids);

    let slots: BTreeSet<&str> = events.iter().map(|e| e.time.as_str()).collect();
    for card in cards {
        let card_slots: BTreeSet<&str> = card.assignments.keys().map(String::as_str).collect();
        assert_eq!(card_slots, slots);
    }
}

/// Assignments only name rooms that present that topic at that time.
pub fn assert_assignments_match_events(cards: &[ParticipantDanceCard], events: &[SessionEvent]) {
    let offered: BTreeSet<(&str, &str, &str)> = events
        .iter()
        .map(|e| (e.time.as_str(), e.room.as_str(), e.topic.as_str()))
        .collect();
    for card in cards {
        for (time, assignment) in &card.assignments {
            if let (Some(room), Some(topic)) = (assignment.room(), assignment.topic()) {
                assert!(offered.contains(&(time.as_str(), room, topic)));
            }
        }
    }
}

pub fn assert_all_invariants(
    cards: &[ParticipantDanceCard],
    participants: &[Participant],
    events: &[SessionEvent],
    rooms: &[RoomCapacity],
) {
    assert_complete_coverage(cards, participants, events);
    assert_capacity(cards, rooms);
    assert_no_repeated_topics(cards);
    assert_missed_topics_exact(cards, events);
    assert_assignments_match_events(cards, events);
}
