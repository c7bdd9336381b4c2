use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveTime;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use startlist_entities::prelude::{ClassAssignment, Entry, StoredStartTime, Uuid};
use thiserror::Error;

use crate::generation::split::ClassSplitResult;

/// Highest start number sequence within one lane; the number format carries
/// three digits after the lane prefix.
const LANE_CAPACITY: u32 = 999;

#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// First sequence number handed out per lane.
    pub start_number_offset: u32,
    /// Event default per-player interval, for classes without their own.
    pub default_interval_seconds: i64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            start_number_offset: 1,
            default_interval_seconds: 60,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Lane {lane} exceeds {LANE_CAPACITY} start numbers")]
    LaneCapacityExceeded { lane: u32 },
    #[error("Start time refers to unknown competitor {id}")]
    UnknownCompetitor { id: Uuid },
    #[error("Could not write export: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("Could not encode export: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct StartlistExportRow {
    pub class_name: String,
    pub start_number: String,
    pub name: String,
    pub club: String,
    pub start_time: String,
    pub card_number: String,
}

/// The startlist as handed to external timing systems.
#[derive(Debug, Clone)]
pub struct StartlistExportView {
    pub rows: Vec<StartlistExportRow>,
}

impl StartlistExportView {
    /// Builds the export rows from a stored snapshot's start times.
    ///
    /// Rows are ordered lane-ascending, then by start time; stored times that
    /// no longer parse (hand-edited) sort last within their lane, keeping
    /// their stored order. Start numbers run sequentially per lane with the
    /// lane number as prefix; a lane overflowing three digits aborts the
    /// export.
    pub fn load(
        times: &[StoredStartTime],
        entries: &[Entry],
        classes: &[ClassAssignment],
        split: Option<&ClassSplitResult>,
        config: &ExportConfig,
    ) -> Result<StartlistExportView, ExportError> {
        let entries_by_id: HashMap<Uuid, &Entry> =
            entries.iter().map(|entry| (entry.id, entry)).collect();

        let mut player_classes: HashMap<Uuid, &ClassAssignment> = HashMap::new();
        for class in classes {
            for player_id in &class.player_order {
                player_classes.insert(*player_id, class);
            }
        }

        let ordered = times
            .iter()
            .enumerate()
            .map(|(idx, time)| (idx, time, time.parsed_time()))
            .sorted_by(|a, b| {
                a.1.lane_number
                    .cmp(&b.1.lane_number)
                    .then_with(|| match (a.2, b.2) {
                        (Some(first), Some(second)) => first.cmp(&second),
                        (Some(_), None) => Ordering::Less,
                        (None, Some(_)) => Ordering::Greater,
                        (None, None) => Ordering::Equal,
                    })
                    .then_with(|| a.0.cmp(&b.0))
            })
            .collect_vec();

        let mut lane_sequences: HashMap<u32, u32> = HashMap::new();
        let mut rows = Vec::with_capacity(ordered.len());

        for (_, time, parsed) in ordered {
            let entry = entries_by_id
                .get(&time.player_id)
                .ok_or(ExportError::UnknownCompetitor {
                    id: time.player_id,
                })?;

            let sequence = lane_sequences
                .entry(time.lane_number)
                .or_insert(config.start_number_offset);
            if *sequence > LANE_CAPACITY {
                return Err(ExportError::LaneCapacityExceeded {
                    lane: time.lane_number,
                });
            }
            let start_number = format!("{}{:03}", time.lane_number, sequence);
            *sequence += 1;

            let class = player_classes.get(&time.player_id);
            let class_id = class
                .map(|class| class.class_id.as_str())
                .unwrap_or(entry.class_id.as_str());
            let class_name = split
                .and_then(|split| split.display_name_of(class_id))
                .unwrap_or(class_id)
                .to_string();

            let interval = class
                .map(|class| class.interval_seconds)
                .filter(|interval| *interval > 0)
                .unwrap_or(config.default_interval_seconds);

            rows.push(StartlistExportRow {
                class_name,
                start_number,
                name: entry.name.clone(),
                club: entry.club.clone(),
                start_time: format_start_time(&time.start_time, parsed, interval),
                card_number: if entry.has_card() {
                    entry.card_number.clone()
                } else {
                    String::new()
                },
            });
        }

        Ok(StartlistExportView { rows })
    }

    pub fn view_string(&self) -> Result<String, anyhow::Error> {
        Ok(serde_json::to_string(&self.rows)?)
    }

    /// UTF-8 with BOM, comma separated, CRLF line endings. Field quoting is
    /// the csv crate's default: quotes around fields containing the
    /// delimiter, quotes or line breaks, inner quotes doubled.
    pub fn write_csv<W>(&self, mut writer: W) -> Result<(), ExportError>
    where
        W: std::io::Write,
    {
        writer.write_all("\u{feff}".as_bytes())?;

        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);
        csv_writer.write_record([
            "class",
            "start number",
            "name",
            "club",
            "start time",
            "card number",
        ])?;
        for row in &self.rows {
            csv_writer.write_record([
                &row.class_name,
                &row.start_number,
                &row.name,
                &row.club,
                &row.start_time,
                &row.card_number,
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Labels carry minute precision, except in classes starting on 30 second
/// intervals, where two consecutive competitors share the same minute.
fn format_start_time(raw: &str, parsed: Option<NaiveTime>, interval_seconds: i64) -> String {
    match parsed {
        Some(time) if interval_seconds == 30 => time.format("%H:%M:%S").to_string(),
        Some(time) => time.format("%H:%M").to_string(),
        None => raw.to_string(),
    }
}
