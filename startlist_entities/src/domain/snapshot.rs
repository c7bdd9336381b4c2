use chrono::{NaiveDateTime, NaiveTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::schedule::{ClassAssignment, LaneAssignment, StartTimeRecord};

pub const START_TIME_FORMAT: &str = "%H:%M:%S";

/// The persisted, operator-editable rendering of a start time. Times are
/// stored as text since operators may adjust them by hand after generation;
/// consumers must tolerate values that no longer parse.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct StoredStartTime {
    pub player_id: Uuid,
    pub lane_number: u32,
    pub start_time: String,
}

impl StoredStartTime {
    pub fn from_record(record: &StartTimeRecord) -> Self {
        StoredStartTime {
            player_id: record.player_id,
            lane_number: record.lane_number,
            start_time: record.start_time.format(START_TIME_FORMAT).to_string(),
        }
    }

    pub fn parsed_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.start_time.trim(), START_TIME_FORMAT).ok()
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub enum SnapshotStatus {
    Draft,
    Published,
}

/// Full derived state of one startlist, as handed to the persistence
/// collaborator. The engine only ever produces whole snapshots; it never
/// patches a stored one.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct StartlistSnapshot {
    pub lanes: Vec<LaneAssignment>,
    pub classes: Vec<ClassAssignment>,
    pub start_times: Vec<StoredStartTime>,
    pub seed: String,
    pub status: SnapshotStatus,
}

impl StartlistSnapshot {
    pub fn from_parts(
        lanes: Vec<LaneAssignment>,
        classes: Vec<ClassAssignment>,
        records: &[StartTimeRecord],
        seed: String,
    ) -> Self {
        StartlistSnapshot {
            lanes,
            classes,
            start_times: records.iter().map(StoredStartTime::from_record).collect_vec(),
            seed,
            status: SnapshotStatus::Draft,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, SnapshotDecodeError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, SnapshotDecodeError> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Error)]
pub enum SnapshotDecodeError {
    #[error("Invalid snapshot encoding: {source}")]
    Encoding {
        #[from]
        source: serde_json::Error,
    },
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct SnapshotVersion {
    pub version: u64,
    pub saved_at: NaiveDateTime,
}

/// Persistence/versioning boundary. Implemented outside this workspace;
/// the engine only supplies the snapshot.
pub trait SnapshotStore {
    fn save(&mut self, snapshot: &StartlistSnapshot) -> Result<SnapshotVersion, anyhow::Error>;
}
