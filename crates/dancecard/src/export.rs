//! CSV export of finished dance cards.
//!
//! One row per participant and one column per time slot. Names and ids are
//! always quoted so spreadsheet tools keep leading zeros.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use dancecard_engine::{Assignment, ParticipantDanceCard};

/// Export options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Append a "Missed Topics" section after the schedule.
    pub include_missed_topics: bool,
}

/// Every time slot that appears on any card, chronological.
pub fn time_slots_of(cards: &[ParticipantDanceCard]) -> Vec<String> {
    cards
        .iter()
        .flat_map(|card| card.assignments.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Render cards as CSV text.
///
/// Slots a card has no entry for are written as `ERROR`.
pub fn export_csv(
    cards: &[ParticipantDanceCard],
    time_slots: &[String],
    options: ExportOptions,
) -> String {
    let mut csv = String::from("Participant Name,Participant ID");
    for time in time_slots {
        csv.push(',');
        csv.push_str(time);
    }
    csv.push('\n');

    for card in cards {
        csv.push_str(&quoted(&card.participant.name));
        csv.push(',');
        csv.push_str(&quoted(&card.participant.id));

        for time in time_slots {
            csv.push(',');
            match card.assignment(time) {
                Some(Assignment::Free) => csv.push_str("FREE"),
                Some(assigned @ Assignment::Assigned { .. }) => {
                    csv.push_str(&quoted(&assigned.to_string()))
                }
                None => csv.push_str("ERROR"),
            }
        }
        csv.push('\n');
    }

    if options.include_missed_topics {
        let missing: Vec<&ParticipantDanceCard> = cards
            .iter()
            .filter(|card| !card.missed_topics.is_empty())
            .collect();

        if !missing.is_empty() {
            csv.push_str("\nMissed Topics\n");
            csv.push_str("Participant Name,Participant ID,Missed Topics\n");
            for card in missing {
                let topics: Vec<&str> = card.missed_topics.iter().map(String::as_str).collect();
                csv.push_str(&format!(
                    "{},{},{}\n",
                    quoted(&card.participant.name),
                    quoted(&card.participant.id),
                    quoted(&topics.join(", "))
                ));
            }
        }
    }

    csv
}

/// Write CSV to `path`.
pub fn write_csv(
    path: impl AsRef<Path>,
    cards: &[ParticipantDanceCard],
    time_slots: &[String],
    options: ExportOptions,
) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, export_csv(cards, time_slots, options))
        .with_context(|| format!("Failed to write CSV {}", path.display()))
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
