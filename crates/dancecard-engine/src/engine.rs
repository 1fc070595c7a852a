//! The pipeline driver: preprocess, initialize, greedy, repair, finalize.
//!
//! ## Usage
//!
//! ```
//! use dancecard_engine::{DanceCardEngine, EngineConfig, Participant, RoomCapacity, SessionEvent};
//!
//! let participants = vec![Participant::new("p1", "Ada"), Participant::new("p2", "Bea")];
//! let events = vec![
//!     SessionEvent::new("09:00", "Room A", "Knots"),
//!     SessionEvent::new("10:00", "Room A", "Sails"),
//! ];
//! let rooms = vec![RoomCapacity::new("Room A", 2)];
//!
//! let engine = DanceCardEngine::new(EngineConfig::seeded(42));
//! let cards = engine.generate(&participants, &events, &rooms);
//!
//! assert_eq!(cards.len(), 2);
//! assert!(cards.iter().all(|c| c.missed_topics.is_empty()));
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EngineConfig, rng_from_seed};
use crate::finalize::finalize;
use crate::greedy::assign_greedy;
use crate::model::{Participant, ParticipantDanceCard, RoomCapacity, SessionEvent};
use crate::preprocess::preprocess;
use crate::repair::{RepairStats, repair};
use crate::state::AssignmentState;

/// Cards plus what it took to produce them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub cards: Vec<ParticipantDanceCard>,
    /// Time slots covered by every card, chronological.
    pub time_slots: Vec<String>,
    /// Seed actually used, so the run can be replayed.
    pub seed: u64,
    pub repair: RepairStats,
}

/// Stateless between calls: every generation builds and drops its own state.
#[derive(Debug, Clone, Default)]
pub struct DanceCardEngine {
    config: EngineConfig,
}

impl DanceCardEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// One dance card per participant, sorted by name then id.
    pub fn generate(
        &self,
        participants: &[Participant],
        events: &[SessionEvent],
        room_capacities: &[RoomCapacity],
    ) -> Vec<ParticipantDanceCard> {
        self.generate_detailed(participants, events, room_capacities)
            .cards
    }

    /// Like [`generate`](Self::generate), also reporting the seed and repair statistics.
    pub fn generate_detailed(
        &self,
        participants: &[Participant],
        events: &[SessionEvent],
        room_capacities: &[RoomCapacity],
    ) -> Generation {
        let seed = self.config.resolve_seed();
        let mut rng = rng_from_seed(seed);

        debug!(
            seed,
            participants = participants.len(),
            events = events.len(),
            rooms = room_capacities.len(),
            "Generating dance cards"
        );

        let preprocessed = preprocess(events);
        let time_slots = preprocessed.time_slots.clone();

        let state = AssignmentState::initialize(participants, room_capacities, preprocessed);
        let state = assign_greedy(state, &mut rng);
        let (state, repair) = repair(state, &self.config, &mut rng);
        let cards = finalize(state);

        Generation {
            cards,
            time_slots,
            seed,
            repair,
        }
    }
}

/// Generate dance cards with the default configuration and a fresh seed.
pub fn generate_dance_cards(
    participants: &[Participant],
    events: &[SessionEvent],
    room_capacities: &[RoomCapacity],
) -> Vec<ParticipantDanceCard> {
    DanceCardEngine::default().generate(participants, events, room_capacities)
}
