//! Problem files: the three engine inputs plus optional engine settings.
//!
//! The engine trusts its inputs. Everything it assumes (unique participant
//! ids, canonical times, one topic per room and slot, sane capacities) is
//! checked here before a run.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dancecard_engine::{EngineConfig, Participant, RoomCapacity, SessionEvent};

/// Capacities must be strictly below this.
pub const MAX_ROOM_CAPACITY: u32 = 1000;

static CANONICAL_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time pattern"));

static TWELVE_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*(am|pm|a\.m\.|p\.m\.)$").expect("valid 12-hour pattern")
});

static TWENTY_FOUR_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid 24-hour pattern"));

/// A complete dance card problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub participants: Vec<Participant>,
    pub events: Vec<SessionEvent>,
    pub room_capacities: Vec<RoomCapacity>,
    /// Engine settings stored with the problem. CLI flags override them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineConfig>,
}

impl Problem {
    pub fn new(
        participants: Vec<Participant>,
        events: Vec<SessionEvent>,
        room_capacities: Vec<RoomCapacity>,
    ) -> Self {
        Self {
            participants,
            events,
            room_capacities,
            engine: None,
        }
    }

    /// Read, normalize and validate a problem file. Warnings are logged.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read problem file {}", path.display()))?;
        let mut problem: Problem = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse problem file {}", path.display()))?;

        problem.normalize_times()?;
        problem.validate()?;
        for warning in problem.warnings() {
            warn!("{}", warning);
        }

        debug!(
            path = %path.display(),
            participants = problem.participants.len(),
            events = problem.events.len(),
            rooms = problem.room_capacities.len(),
            "Loaded problem"
        );
        Ok(problem)
    }

    /// Write the problem as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write problem file {}", path.display()))?;
        Ok(())
    }

    /// Engine settings from the file, or defaults.
    pub fn engine_config(&self) -> EngineConfig {
        self.engine.clone().unwrap_or_default()
    }

    /// Rewrite every event time into canonical `HH:MM`.
    pub fn normalize_times(&mut self) -> Result<()> {
        for (i, event) in self.events.iter_mut().enumerate() {
            event.time = normalize_time(&event.time)
                .with_context(|| format!("events[{}]", i + 1))?;
        }
        Ok(())
    }

    /// Check the input contract and return the first violation.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for (i, participant) in self.participants.iter().enumerate() {
            if participant.id.trim().is_empty() {
                bail!("participants[{}]: participant id is empty", i + 1);
            }
            if !ids.insert(participant.id.as_str()) {
                bail!(
                    "participants[{}]: participant id \"{}\" is already used",
                    i + 1,
                    participant.id
                );
            }
        }

        let mut scheduled = HashSet::new();
        for (i, event) in self.events.iter().enumerate() {
            if !CANONICAL_TIME.is_match(&event.time) {
                bail!(
                    "events[{}]: time \"{}\" is not canonical HH:MM",
                    i + 1,
                    event.time
                );
            }
            if event.room.trim().is_empty() {
                bail!("events[{}]: room is empty", i + 1);
            }
            if event.topic.trim().is_empty() {
                bail!("events[{}]: topic is empty", i + 1);
            }
            if !scheduled.insert((event.room.as_str(), event.time.as_str())) {
                bail!(
                    "events[{}]: room \"{}\" is already scheduled for time {}",
                    i + 1,
                    event.room,
                    event.time
                );
            }
        }

        let mut rooms = HashSet::new();
        for (i, rc) in self.room_capacities.iter().enumerate() {
            if rc.room.trim().is_empty() {
                bail!("room_capacities[{}]: room is empty", i + 1);
            }
            if rc.capacity == 0 || rc.capacity >= MAX_ROOM_CAPACITY {
                bail!(
                    "room_capacities[{}]: capacity {} for room \"{}\" must be greater than 0 and less than {}",
                    i + 1,
                    rc.capacity,
                    rc.room,
                    MAX_ROOM_CAPACITY
                );
            }
            if !rooms.insert(rc.room.as_str()) {
                bail!(
                    "room_capacities[{}]: room \"{}\" already has a capacity",
                    i + 1,
                    rc.room
                );
            }
        }

        Ok(())
    }

    /// Inconsistencies the engine tolerates but a user probably did not intend.
    pub fn warnings(&self) -> Vec<String> {
        let with_capacity: BTreeSet<&str> =
            self.room_capacities.iter().map(|rc| rc.room.as_str()).collect();
        let with_events: BTreeSet<&str> = self.events.iter().map(|e| e.room.as_str()).collect();

        let mut warnings = Vec::new();
        for room in with_events.difference(&with_capacity) {
            warnings.push(format!(
                "Room \"{}\" has events but no capacity; nobody will be seated there",
                room
            ));
        }
        for room in with_capacity.difference(&with_events) {
            warnings.push(format!("Room \"{}\" has a capacity but no events", room));
        }
        warnings
    }
}

/// Normalize a 24-hour (`9:05`, `14:30`) or 12-hour (`9:05 am`, `2:30PM`,
/// `12:00 a.m.`) time into zero-padded 24-hour `HH:MM`.
pub fn normalize_time(input: &str) -> Result<String> {
    let time = input.trim();

    if let Some(caps) = TWELVE_HOUR.captures(time) {
        let hours: u32 = caps[1].parse()?;
        let minutes: u32 = caps[2].parse()?;
        if !(1..=12).contains(&hours) || minutes > 59 {
            bail!(
                "Invalid time \"{}\": hours must be 1-12 and minutes 0-59 in 12-hour format",
                time
            );
        }
        let pm = caps[3].to_ascii_lowercase().starts_with('p');
        let hours = match (pm, hours) {
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, 12) => 0,
            (false, h) => h,
        };
        return Ok(format!("{:02}:{:02}", hours, minutes));
    }

    if let Some(caps) = TWENTY_FOUR_HOUR.captures(time) {
        let hours: u32 = caps[1].parse()?;
        let minutes: u32 = caps[2].parse()?;
        if hours > 23 || minutes > 59 {
            bail!(
                "Invalid time \"{}\": hours must be 0-23 and minutes 0-59",
                time
            );
        }
        return Ok(format!("{:02}:{:02}", hours, minutes));
    }

    bail!(
        "Invalid time \"{}\": expected \"HH:MM\" (24-hour) or \"HH:MM AM/PM\" (12-hour)",
        time
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> Problem {
        Problem::new(
            vec![Participant::new("p1", "Ada"), Participant::new("p2", "Bea")],
            vec![
                SessionEvent::new("09:00", "Room A", "Knots"),
                SessionEvent::new("10:00", "Room A", "Sails"),
            ],
            vec![RoomCapacity::new("Room A", 2)],
        )
    }

    #[test]
    fn test_normalize_24_hour() {
        assert_eq!(normalize_time("9:05").unwrap(), "09:05");
        assert_eq!(normalize_time(" 14:30 ").unwrap(), "14:30");
        assert_eq!(normalize_time("00:00").unwrap(), "00:00");
    }

    #[test]
    fn test_normalize_12_hour() {
        assert_eq!(normalize_time("9:30 AM").unwrap(), "09:30");
        assert_eq!(normalize_time("2:15pm").unwrap(), "14:15");
        assert_eq!(normalize_time("12:00 p.m.").unwrap(), "12:00");
        assert_eq!(normalize_time("12:45 A.M.").unwrap(), "00:45");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_time("24:00").is_err());
        assert!(normalize_time("13:00 pm").is_err());
        assert!(normalize_time("0:30 am").is_err());
        assert!(normalize_time("9:60").is_err());
        assert!(normalize_time("noon").is_err());
        assert!(normalize_time("9.30").is_err());
    }

    #[test]
    fn test_valid_problem() {
        problem().validate().unwrap();
    }

    #[test]
    fn test_duplicate_participant_id() {
        let mut p = problem();
        p.participants.push(Participant::new("p1", "Cy"));
        let err = p.validate().unwrap_err().to_string();
        assert_eq!(err, "participants[3]: participant id \"p1\" is already used");
    }

    #[test]
    fn test_duplicate_room_time() {
        let mut p = problem();
        p.events.push(SessionEvent::new("09:00", "Room A", "Ropes"));
        let err = p.validate().unwrap_err().to_string();
        assert_eq!(err, "events[3]: room \"Room A\" is already scheduled for time 09:00");
    }

    #[test]
    fn test_non_canonical_time_rejected_until_normalized() {
        let mut p = problem();
        p.events[0].time = "9:00 am".to_string();
        assert!(p.validate().is_err());

        p.normalize_times().unwrap();
        assert_eq!(p.events[0].time, "09:00");
        p.validate().unwrap();
    }

    #[test]
    fn test_capacity_bounds() {
        let mut p = problem();
        p.room_capacities[0].capacity = 0;
        assert!(p.validate().is_err());
        p.room_capacities[0].capacity = 1000;
        assert!(p.validate().is_err());
        p.room_capacities[0].capacity = 999;
        p.validate().unwrap();
    }

    #[test]
    fn test_duplicate_capacity_room() {
        let mut p = problem();
        p.room_capacities.push(RoomCapacity::new("Room A", 4));
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_warnings_for_unmatched_rooms() {
        let mut p = problem();
        p.events.push(SessionEvent::new("09:00", "Ghost", "Ropes"));
        p.room_capacities.push(RoomCapacity::new("Annex", 10));

        let warnings = p.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Ghost"));
        assert!(warnings[1].contains("Annex"));
        p.validate().unwrap();
    }

    #[test]
    fn test_engine_config_defaults_when_absent() {
        let p = problem();
        assert_eq!(p.engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_partial_engine_table() {
        let json = r#"{
            "participants": [],
            "events": [],
            "room_capacities": [],
            "engine": { "seed": 7 }
        }"#;
        let p: Problem = serde_json::from_str(json).unwrap();
        assert_eq!(p.engine_config(), EngineConfig::seeded(7));
    }
}
