use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical start channel with the classes it starts, in starting order.
/// `interval_seconds` is the gap inserted between consecutive classes;
/// zero or negative means the event default applies.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct LaneAssignment {
    pub lane_number: u32,
    pub class_order: Vec<String>,
    pub interval_seconds: i64,
}

/// The realized start order of one class. `player_order` is always a
/// permutation of the class's current members. `interval_seconds` is the
/// per-player start interval; zero or negative means the event default.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct ClassAssignment {
    pub class_id: String,
    pub player_order: Vec<Uuid>,
    pub interval_seconds: i64,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct StartTimeRecord {
    pub player_id: Uuid,
    pub lane_number: u32,
    pub start_time: NaiveDateTime,
}

/// Two competitors sharing a club token starting back to back.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct AdjacentClubPair {
    pub first_id: Uuid,
    pub second_id: Uuid,
    pub shared_clubs: Vec<String>,
}

/// Diagnostic record of all adjacent same-club starts within one class.
/// Reported to the operator, never acted on by the engine itself.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct ClassOrderWarning {
    pub class_id: String,
    pub conflicts: Vec<AdjacentClubPair>,
}
