//! Derive time slots, the topic universe and the time -> room -> topic lookup
//! from the event collection.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::SessionEvent;

/// time -> room -> topic.
pub type TimeRoomTopicMap = BTreeMap<String, BTreeMap<String, String>>;

/// Everything the later stages need to know about the events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preprocessed {
    /// Distinct times, sorted (chronological for canonical `HH:MM`).
    pub time_slots: Vec<String>,
    /// Distinct topics in first-seen order.
    pub topics: Vec<String>,
    pub time_room_topic: TimeRoomTopicMap,
}

/// Pure pass over the events. Participants and capacities play no part here.
pub fn preprocess(events: &[SessionEvent]) -> Preprocessed {
    let time_slots: Vec<String> = events
        .iter()
        .map(|e| e.time.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut seen = BTreeSet::new();
    let topics: Vec<String> = events
        .iter()
        .filter(|e| seen.insert(e.topic.as_str()))
        .map(|e| e.topic.clone())
        .collect();

    let mut time_room_topic = TimeRoomTopicMap::new();
    for event in events {
        time_room_topic
            .entry(event.time.clone())
            .or_default()
            .insert(event.room.clone(), event.topic.clone());
    }

    Preprocessed {
        time_slots,
        topics,
        time_room_topic,
    }
}

/// Rooms presenting `topic` at `time`, in room order.
pub fn rooms_offering<'a>(map: &'a TimeRoomTopicMap, time: &str, topic: &str) -> Vec<&'a str> {
    map.get(time)
        .map(|rooms| {
            rooms
                .iter()
                .filter(|(_, t)| t.as_str() == topic)
                .map(|(room, _)| room.as_str())
                .collect()
        })
        .unwrap_or_default()
}
