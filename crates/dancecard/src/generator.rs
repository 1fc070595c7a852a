//! Synthetic problem generator.
//!
//! Builds conference layouts where each time slot runs every topic in some
//! room, so the only limit on coverage is seating.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use dancecard_engine::{Participant, RoomCapacity, SessionEvent};

use crate::problem::Problem;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bea", "Cyrus", "Dana", "Eli", "Fay", "Gus", "Hana", "Ivo", "Jun", "Kit", "Lena",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Baker", "Castro", "Doyle", "Evans", "Fischer", "Grant", "Huang", "Ito", "Jensen",
];

/// Configuration for generating problems.
#[derive(Debug, Clone)]
pub struct ProblemGeneratorConfig {
    /// Number of participants.
    pub participants: usize,
    /// Number of rooms.
    pub rooms: usize,
    /// Seats per room, the same for every room.
    pub room_capacity: u32,
    /// Number of hourly time slots.
    pub time_slots: usize,
    /// Number of distinct topics.
    pub topics: usize,
    /// Hour of the first slot (24-hour clock).
    pub first_hour: u32,
    /// Shuffle which room runs which topic in each slot.
    pub shuffle_rotation: bool,
}

impl Default for ProblemGeneratorConfig {
    fn default() -> Self {
        Self::balanced()
    }
}

impl ProblemGeneratorConfig {
    /// Five participants, two rooms of two: two topic visits always go missing.
    pub fn small() -> Self {
        Self {
            participants: 5,
            rooms: 2,
            room_capacity: 2,
            time_slots: 2,
            topics: 2,
            first_hour: 9,
            shuffle_rotation: false,
        }
    }

    /// 120 participants, 150 seats per slot, every topic offered every slot.
    pub fn balanced() -> Self {
        Self {
            participants: 120,
            rooms: 10,
            room_capacity: 15,
            time_slots: 5,
            topics: 5,
            first_hour: 11,
            shuffle_rotation: false,
        }
    }

    /// More participants than seats.
    pub fn scarce() -> Self {
        Self {
            participants: 40,
            rooms: 4,
            room_capacity: 8,
            time_slots: 4,
            topics: 4,
            first_hour: 9,
            shuffle_rotation: true,
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "small" => Some(Self::small()),
            "balanced" => Some(Self::balanced()),
            "scarce" => Some(Self::scarce()),
            _ => None,
        }
    }
}

/// Generator for dance card problems.
pub struct ProblemGenerator {
    config: ProblemGeneratorConfig,
    rng: ChaCha8Rng,
}

impl ProblemGenerator {
    /// Create a new generator with the given config and seed.
    pub fn new(config: ProblemGeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate a problem.
    pub fn generate(&mut self) -> Problem {
        let participants = self.generate_participants();
        let room_capacities = self.generate_rooms();
        let events = self.generate_events(&room_capacities);
        Problem::new(participants, events, room_capacities)
    }

    fn generate_participants(&mut self) -> Vec<Participant> {
        (1..=self.config.participants)
            .map(|i| {
                let first = FIRST_NAMES.choose(&mut self.rng).copied().unwrap_or("Guest");
                let last = LAST_NAMES.choose(&mut self.rng).copied().unwrap_or("Guest");
                Participant::new(format!("id-{:03}", i), format!("{} {}", first, last))
            })
            .collect()
    }

    fn generate_rooms(&self) -> Vec<RoomCapacity> {
        (1..=self.config.rooms)
            .map(|i| RoomCapacity::new(format!("Room-{:02}", i), self.config.room_capacity))
            .collect()
    }

    /// One event per room per slot. Topic index is `(room + slot) % topics`,
    /// optionally shuffled across rooms within each slot.
    fn generate_events(&mut self, rooms: &[RoomCapacity]) -> Vec<SessionEvent> {
        if self.config.topics == 0 {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(rooms.len() * self.config.time_slots);
        for slot in 0..self.config.time_slots {
            let time = format!("{:02}:00", (self.config.first_hour as usize + slot) % 24);

            let mut rotation: Vec<usize> = (0..rooms.len())
                .map(|room| (room + slot) % self.config.topics)
                .collect();
            if self.config.shuffle_rotation {
                rotation.shuffle(&mut self.rng);
            }

            for (room, topic) in rooms.iter().zip(rotation) {
                events.push(SessionEvent::new(
                    time.clone(),
                    room.room.clone(),
                    format!("Topic-{}", topic + 1),
                ));
            }
        }
        events
    }
}
