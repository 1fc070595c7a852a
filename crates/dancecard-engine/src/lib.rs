//! Dance card engine: assign participants to room/topic sessions.
//!
//! Given participants, session events `(time, room, topic)` and room
//! capacities, the engine produces one dance card per participant that maps
//! every time slot to a room or FREE, under two constraints:
//!
//! 1. **No repeated topics**: a participant sees each topic at most once.
//! 2. **Capacity**: a room never seats more than its capacity at one time.
//!
//! ## Pipeline
//!
//! - [`preprocess`]: time slots, topic universe, time -> room -> topic lookup
//! - [`state`]: fresh per-participant and per-room state
//! - [`greedy`]: one pass over slots, most topic-starved participants first
//! - [`repair`]: queue-driven local search that fills FREE slots, trading
//!   sessions between slots or evicting occupants when rooms are full,
//!   bounded by an iteration budget
//! - [`finalize`]: sorted, display-ready cards
//!
//! Each stage takes the state by value and hands it on. The engine does no
//! I/O and never fails; a run that cannot place everyone returns cards with
//! non-empty `missed_topics`.

pub mod config;
pub mod engine;
pub mod finalize;
pub mod greedy;
pub mod model;
pub mod preprocess;
pub mod repair;
pub mod shuffle;
pub mod state;

pub use config::{DEFAULT_MAX_ITERATIONS, EngineConfig, EvictionPolicy};
pub use engine::{DanceCardEngine, Generation, generate_dance_cards};
pub use model::{Assignment, Participant, ParticipantDanceCard, RoomCapacity, SessionEvent};
pub use repair::RepairStats;
pub use state::AssignmentState;
