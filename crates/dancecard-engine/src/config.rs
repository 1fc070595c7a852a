//! Configuration types for the engine.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Default ceiling on repair-pass dequeues.
pub const DEFAULT_MAX_ITERATIONS: usize = 20_000;

/// Which occupant gives up a seat when the repair pass needs it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// The first occupant in seating-set order. No ranking is applied.
    #[default]
    FirstSeated,
    /// The occupant with the fewest unvisited topics left, ties to the first seated.
    FewestUnvisited,
}

impl EvictionPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            EvictionPolicy::FirstSeated => "first_seated",
            EvictionPolicy::FewestUnvisited => "fewest_unvisited",
        }
    }
}

/// Engine configuration.
///
/// Loaded from JSON alongside a problem, or built in code. Every field has a
/// default, so a partial table deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum queue dequeues in the repair pass before it stops with a warning.
    pub max_iterations: usize,

    /// Seed for every randomized choice. `None` draws a fresh seed per run.
    pub seed: Option<u64>,

    /// Victim selection in the repair pass.
    pub eviction: EvictionPolicy,

    /// Before evicting, try moving the participant's session at another slot
    /// so both topics fit without displacing anyone.
    pub relocation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
            eviction: EvictionPolicy::default(),
            relocation: true,
        }
    }
}

impl EngineConfig {
    /// Default configuration with a fixed seed, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn with_relocation(mut self, relocation: bool) -> Self {
        self.relocation = relocation;
        self
    }

    /// Seed for one run: the configured one, or a fresh random one.
    pub(crate) fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

/// The RNG every stage draws from.
pub(crate) fn rng_from_seed(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
