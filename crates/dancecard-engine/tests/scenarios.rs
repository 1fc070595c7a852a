//! End-to-end scenarios for dance card generation.

mod common;

use dancecard_engine::{
    DanceCardEngine, EngineConfig, EvictionPolicy, Participant, RoomCapacity, SessionEvent,
    generate_dance_cards,
};

use common::assert_all_invariants;

fn numbered_participants(n: usize) -> Vec<Participant> {
    (1..=n)
        .map(|i| Participant::new(format!("id-{:03}", i), format!("Name-{:03}", i)))
        .collect()
}

fn two_room_rotation() -> (Vec<Participant>, Vec<SessionEvent>, Vec<RoomCapacity>) {
    let participants = (1..=5)
        .map(|i| Participant::new(format!("P{}", i), format!("Person {}", i)))
        .collect();
    let events = vec![
        SessionEvent::new("09:00", "Room A", "Topic 1"),
        SessionEvent::new("09:00", "Room B", "Topic 2"),
        SessionEvent::new("10:00", "Room A", "Topic 2"),
        SessionEvent::new("10:00", "Room B", "Topic 1"),
    ];
    let rooms = vec![RoomCapacity::new("Room A", 2), RoomCapacity::new("Room B", 2)];
    (participants, events, rooms)
}

/// 10 rooms x 15 seats, 5 slots, 5 topics rotated so every topic runs in
/// every slot.
fn balanced_conference() -> (Vec<Participant>, Vec<SessionEvent>, Vec<RoomCapacity>) {
    let participants = numbered_participants(120);
    let rooms: Vec<RoomCapacity> = (1..=10)
        .map(|i| RoomCapacity::new(format!("Room-{:02}", i), 15))
        .collect();
    let topics: Vec<String> = (1..=5).map(|i| format!("Topic-{}", i)).collect();
    let times = ["11:00", "12:00", "13:00", "14:00", "15:00"];

    let mut events = Vec::new();
    for (time_index, time) in times.iter().enumerate() {
        for (room_index, room) in rooms.iter().enumerate() {
            let topic_index = (room_index + time_index) % topics.len();
            events.push(SessionEvent::new(*time, room.room.clone(), topics[topic_index].clone()));
        }
    }

    (participants, events, rooms)
}

#[test]
fn test_oversubscribed_two_rooms() {
    let (participants, events, rooms) = two_room_rotation();

    for seed in 0..20 {
        let engine = DanceCardEngine::new(EngineConfig::seeded(seed));
        let cards = engine.generate(&participants, &events, &rooms);

        assert_all_invariants(&cards, &participants, &events, &rooms);

        // 5 participants want 10 topic visits; only 8 seats exist.
        let missed: usize = cards.iter().map(|c| c.missed_topics.len()).sum();
        assert_eq!(missed, 2, "seed {}", seed);
        let with_missed = cards.iter().filter(|c| !c.missed_topics.is_empty()).count();
        assert_eq!(with_missed, 1, "seed {}", seed);
    }
}

#[test]
fn test_oversubscribed_run_hits_ceiling_without_failing() {
    let (participants, events, rooms) = two_room_rotation();
    let engine = DanceCardEngine::new(EngineConfig::seeded(17).with_max_iterations(500));
    let generation = engine.generate_detailed(&participants, &events, &rooms);

    assert!(generation.repair.exhausted);
    assert_eq!(generation.repair.iterations, 500);
    assert_eq!(generation.cards.len(), 5);
    assert_all_invariants(&generation.cards, &participants, &events, &rooms);
}

#[test]
fn test_balanced_conference_has_no_missed_topics() {
    let (participants, events, rooms) = balanced_conference();

    for seed in [1, 42, 2024] {
        let engine = DanceCardEngine::new(EngineConfig::seeded(seed));
        let cards = engine.generate(&participants, &events, &rooms);

        assert_eq!(cards.len(), participants.len());
        assert_all_invariants(&cards, &participants, &events, &rooms);

        let with_missed: Vec<&str> = cards
            .iter()
            .filter(|c| !c.missed_topics.is_empty())
            .map(|c| c.participant.id.as_str())
            .collect();
        assert!(with_missed.is_empty(), "seed {}: {:?} missed topics", seed, with_missed);
    }
}

#[test]
fn test_balanced_conference_with_unseeded_engine() {
    let (participants, events, rooms) = balanced_conference();
    let cards = generate_dance_cards(&participants, &events, &rooms);
    assert_all_invariants(&cards, &participants, &events, &rooms);
}

#[test]
fn test_fewest_unvisited_eviction_keeps_invariants() {
    let (participants, events, rooms) = two_room_rotation();
    let config = EngineConfig::seeded(5).with_eviction(EvictionPolicy::FewestUnvisited);
    let cards = DanceCardEngine::new(config).generate(&participants, &events, &rooms);
    assert_all_invariants(&cards, &participants, &events, &rooms);
}

#[test]
fn test_capacity_room_without_events_is_never_used() {
    let (participants, events, mut rooms) = two_room_rotation();
    rooms.push(RoomCapacity::new("Annex", 50));

    let cards = DanceCardEngine::new(EngineConfig::seeded(3)).generate(&participants, &events, &rooms);
    assert_all_invariants(&cards, &participants, &events, &rooms);
    assert!(
        cards
            .iter()
            .flat_map(|c| c.assignments.values())
            .all(|a| a.room() != Some("Annex"))
    );
}

#[test]
fn test_event_room_without_capacity_is_never_used() {
    let (participants, mut events, rooms) = two_room_rotation();
    events.push(SessionEvent::new("09:00", "Ghost Room", "Topic 3"));

    let cards = DanceCardEngine::new(EngineConfig::seeded(3)).generate(&participants, &events, &rooms);
    assert_all_invariants(&cards, &participants, &events, &rooms);
    for card in &cards {
        assert!(card.assignments.values().all(|a| a.room() != Some("Ghost Room")));
        assert!(card.missed_topics.contains("Topic 3"));
    }
}

#[test]
fn test_output_sorted_by_name_then_id() {
    let participants = vec![
        Participant::new("3", "Carmen"),
        Participant::new("2", "Ada"),
        Participant::new("1", "Carmen"),
    ];
    let events = vec![SessionEvent::new("09:00", "Room A", "Topic 1")];
    let rooms = vec![RoomCapacity::new("Room A", 3)];

    let cards = generate_dance_cards(&participants, &events, &rooms);
    let ids: Vec<&str> = cards.iter().map(|c| c.participant.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1", "3"]);
}

#[test]
fn test_repeated_runs_share_structure() {
    let (participants, events, rooms) = two_room_rotation();
    let a = generate_dance_cards(&participants, &events, &rooms);
    let b = generate_dance_cards(&participants, &events, &rooms);

    let ids = |cards: &[dancecard_engine::ParticipantDanceCard]| {
        cards
            .iter()
            .map(|c| (c.participant.id.clone(), c.assignments.keys().cloned().collect::<Vec<_>>()))
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&a), ids(&b));
}

#[test]
fn test_engine_shared_across_threads() {
    let (participants, events, rooms) = balanced_conference();
    let engine = DanceCardEngine::new(EngineConfig::seeded(77));

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.generate(&participants, &events, &rooms)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("generation thread panicked"))
            .collect()
    });

    for cards in &results[1..] {
        assert_eq!(cards, &results[0]);
    }
}
