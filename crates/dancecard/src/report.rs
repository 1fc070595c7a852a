//! Coverage metrics and run records.
//!
//! Captures:
//! - Topic coverage per participant
//! - Seat utilization per room and slot
//! - Capacity and repeated-topic violations (both should be zero)

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dancecard_engine::{EngineConfig, ParticipantDanceCard, RepairStats, RoomCapacity};

/// Occupancy of one room at one time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomUsage {
    pub room: String,
    pub time: String,
    pub occupancy: usize,
    /// `None` when the room has no declared capacity.
    pub capacity: Option<u32>,
    /// occupancy / capacity, 0 when there is no capacity.
    pub utilization: f64,
}

/// Quality of a set of dance cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub participants: usize,
    pub time_slots: usize,
    /// Participant-slots spent in a room.
    pub assigned_slots: usize,
    /// Participant-slots marked FREE.
    pub free_slots: usize,
    pub participants_with_missed_topics: usize,
    pub missed_topics_total: usize,
    /// Fraction of topic visits achieved out of those wanted.
    pub coverage_rate: f64,
    /// Seats used, by room then time. Only rooms with at least one seating or
    /// a declared capacity appear.
    pub room_usage: Vec<RoomUsage>,
    /// Room-slots seating more than their capacity.
    pub capacity_violations: usize,
    /// Participants who see a topic more than once.
    pub double_topic_violations: usize,
}

impl CoverageReport {
    /// Measure `cards` against the declared room capacities.
    pub fn measure(cards: &[ParticipantDanceCard], room_capacities: &[RoomCapacity]) -> Self {
        let time_slots: BTreeSet<&str> = cards
            .iter()
            .flat_map(|c| c.assignments.keys().map(String::as_str))
            .collect();

        let assigned_slots = cards.iter().map(ParticipantDanceCard::assigned_count).sum();
        let free_slots = cards.iter().map(ParticipantDanceCard::free_count).sum();
        let missed_topics_total: usize = cards.iter().map(|c| c.missed_topics.len()).sum();
        let participants_with_missed_topics =
            cards.iter().filter(|c| !c.missed_topics.is_empty()).count();

        let visited_total: usize = cards.iter().map(|c| c.visited_topics().count()).sum();
        let wanted = visited_total + missed_topics_total;
        let coverage_rate = if wanted == 0 {
            1.0
        } else {
            visited_total as f64 / wanted as f64
        };

        let double_topic_violations = cards
            .iter()
            .filter(|c| {
                let mut seen = BTreeSet::new();
                c.visited_topics().any(|t| !seen.insert(t))
            })
            .count();

        let capacity: BTreeMap<&str, u32> = room_capacities
            .iter()
            .map(|rc| (rc.room.as_str(), rc.capacity))
            .collect();

        let mut occupancy: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        for room in capacity.keys() {
            for time in &time_slots {
                occupancy.insert((*room, *time), 0);
            }
        }
        for card in cards {
            for (time, assignment) in &card.assignments {
                if let Some(room) = assignment.room() {
                    *occupancy.entry((room, time.as_str())).or_default() += 1;
                }
            }
        }

        let mut capacity_violations = 0;
        let room_usage = occupancy
            .into_iter()
            .map(|((room, time), occupancy)| {
                let cap = capacity.get(room).copied();
                if cap.is_none_or(|c| occupancy > c as usize) && occupancy > 0 {
                    capacity_violations += 1;
                }
                RoomUsage {
                    room: room.to_string(),
                    time: time.to_string(),
                    occupancy,
                    capacity: cap,
                    utilization: match cap {
                        Some(c) if c > 0 => occupancy as f64 / c as f64,
                        _ => 0.0,
                    },
                }
            })
            .collect();

        Self {
            participants: cards.len(),
            time_slots: time_slots.len(),
            assigned_slots,
            free_slots,
            participants_with_missed_topics,
            missed_topics_total,
            coverage_rate,
            room_usage,
            capacity_violations,
            double_topic_violations,
        }
    }

    /// Mean utilization over room-slots with a declared capacity.
    pub fn mean_utilization(&self) -> f64 {
        let with_capacity: Vec<f64> = self
            .room_usage
            .iter()
            .filter(|u| u.capacity.is_some())
            .map(|u| u.utilization)
            .collect();
        if with_capacity.is_empty() {
            0.0
        } else {
            with_capacity.iter().sum::<f64>() / with_capacity.len() as f64
        }
    }
}

/// Everything about one engine run, for `--output`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Problem file the run used, if any.
    pub problem: Option<String>,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub ended_at: DateTime<Utc>,
    /// Seed actually used
    pub seed: u64,
    pub config: EngineConfig,
    pub report: CoverageReport,
    pub repair: RepairStats,
}

impl RunRecord {
    /// Wall-clock duration of the run in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }

    /// Save the record to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run record {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let record = serde_json::from_str(&json)?;
        Ok(record)
    }
}

/// Format a duration in milliseconds for display.
pub fn format_duration(ms: i64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{:.1}m", ms as f64 / 60_000.0)
    }
}
