use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDateTime};
use startlist_entities::prelude::{ClassAssignment, LaneAssignment, StartTimeRecord, Uuid};

#[derive(Debug, Clone)]
pub struct ScheduleSettings {
    pub base_time: Option<NaiveDateTime>,
    /// Per-player interval for classes without one of their own.
    pub default_interval_seconds: i64,
    /// Gap between classes for lanes without one of their own.
    pub default_class_gap_seconds: i64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        ScheduleSettings {
            base_time: None,
            default_interval_seconds: 60,
            default_class_gap_seconds: 0,
        }
    }
}

/// Walks lane → class → player and assigns every competitor a start time.
///
/// Each lane keeps a running offset from the common base time; lanes are
/// independent of each other (parallel start channels on the ground). The
/// offset and the already-scheduled guard are threaded state, so iteration
/// within one invocation is strictly sequential.
///
/// Without a base time or a positive default interval nothing is computable
/// and the result is empty; the caller surfaces that and blocks progression.
/// Competitors appearing in no class assignment are silently skipped.
pub fn assign_start_times(
    lanes: &[LaneAssignment],
    classes: &[ClassAssignment],
    settings: &ScheduleSettings,
) -> Vec<StartTimeRecord> {
    let Some(base_time) = settings.base_time else {
        return vec![];
    };
    if settings.default_interval_seconds <= 0 {
        return vec![];
    }

    let classes_by_id: HashMap<&str, &ClassAssignment> = classes
        .iter()
        .map(|class| (class.class_id.as_str(), class))
        .collect();

    let mut scheduled: HashSet<Uuid> = HashSet::new();
    let mut records = Vec::new();

    for lane in lanes {
        let mut offset_seconds = 0i64;
        let mut lane_has_started = false;

        for class_id in &lane.class_order {
            let Some(class) = classes_by_id.get(class_id.as_str()) else {
                continue;
            };

            if lane_has_started {
                let gap = if lane.interval_seconds > 0 {
                    lane.interval_seconds
                } else {
                    settings.default_class_gap_seconds
                };
                if gap > 0 {
                    offset_seconds += gap;
                }
            }
            lane_has_started = true;

            let interval = if class.interval_seconds > 0 {
                class.interval_seconds
            } else {
                settings.default_interval_seconds
            };
            if interval <= 0 {
                continue;
            }

            for player_id in &class.player_order {
                if !scheduled.insert(*player_id) {
                    continue;
                }
                records.push(StartTimeRecord {
                    player_id: *player_id,
                    lane_number: lane.lane_number,
                    start_time: base_time + Duration::seconds(offset_seconds),
                });
                offset_seconds += interval;
            }
        }
    }

    records
}
