use std::collections::HashMap;

use itertools::Itertools;
use startlist_entities::prelude::{
    ClassAssignment, ClassOrderWarning, ClassSplitRule, Entry, LaneAssignment, RankingKind,
    RankingMap, StartOrderRule, StartTimeRecord,
};

pub mod clashes;
pub mod class_order;
pub mod lanes;
pub mod ranking_order;
pub mod rng;
pub mod schedule;
pub mod split;

pub use clashes::ConflictSearchConfig;
pub use class_order::{find_classes_awaiting_ranking, ClassOrderPolicy};
pub use schedule::ScheduleSettings;
pub use split::ClassSplitResult;

use class_order::{order_all_classes, ClassOrderContext, ClassRoster};
use rng::{derive_seed, ranking_seed_entries};
use split::split_classes;

#[derive(Debug, Clone)]
pub struct StartlistSettings {
    pub startlist_id: Option<String>,
    pub lane_count: u32,
    /// Gap between classes within a lane.
    pub lane_interval_seconds: i64,
    pub schedule: ScheduleSettings,
    pub policy: ClassOrderPolicy,
    pub conflict_search: ConflictSearchConfig,
}

pub struct StartlistGenerationRequest<'a> {
    pub entries: &'a [Entry],
    pub split_rules: &'a [ClassSplitRule],
    pub order_rules: &'a [StartOrderRule],
    pub rankings: &'a HashMap<RankingKind, RankingMap>,
    /// Per-class player intervals; absent classes use the event default.
    pub class_intervals: &'a HashMap<String, i64>,
    /// Passing the previous seed back in regenerates the identical orders.
    pub explicit_seed: Option<&'a str>,
    pub settings: &'a StartlistSettings,
}

#[derive(Debug, Clone)]
pub struct StartlistGenerationResult {
    pub seed: String,
    pub split: ClassSplitResult,
    pub lanes: Vec<LaneAssignment>,
    pub classes: Vec<ClassAssignment>,
    pub start_times: Vec<StartTimeRecord>,
    pub warnings: Vec<ClassOrderWarning>,
}

/// The full derived-state computation: (entries, rules, settings) to
/// (lanes, class orders, start times). Pure and synchronous; every call
/// recomputes all derived collections from scratch rather than patching
/// previously generated ones.
pub fn generate_startlist(request: &StartlistGenerationRequest) -> StartlistGenerationResult {
    let split = split_classes(request.entries, request.split_rules);

    let rosters = request
        .entries
        .iter()
        .map(|entry| (split.effective_class_id(entry).to_string(), entry.clone()))
        .into_group_map()
        .into_iter()
        .map(|(class_id, members)| {
            let base_class_id = members
                .first()
                .map(|member| member.class_id.clone())
                .unwrap_or_else(|| class_id.clone());
            ClassRoster {
                class_id,
                base_class_id,
                members,
            }
        })
        .collect_vec();

    let class_sizes = rosters
        .iter()
        .map(|roster| (roster.class_id.clone(), roster.members.len()))
        .collect_vec();
    let lanes = lanes::balance_classes_into_lanes(
        &class_sizes,
        request.settings.lane_count,
        request.settings.lane_interval_seconds,
    );

    let ranking_entries = ranking_seed_entries(
        request
            .rankings
            .iter()
            .sorted_by_key(|(kind, _)| kind.tag())
            .map(|(kind, map)| (kind.tag(), map)),
    );
    let ranking_targets = request
        .order_rules
        .iter()
        .filter(|rule| rule.method.ranking_kind().is_some())
        .map(|rule| rule.class_id.clone())
        .collect_vec();

    let seed = derive_seed(
        request.settings.startlist_id.as_deref(),
        request.entries,
        &lanes,
        request.explicit_seed,
        &ranking_entries,
        &ranking_targets,
    );
    tracing::debug!(seed = %seed, "derived startlist seed");

    let context = ClassOrderContext {
        rules: request.order_rules,
        rankings: request.rankings,
    };
    let (classes, warnings) = order_all_classes(
        request.settings.policy,
        &rosters,
        request.class_intervals,
        &context,
        &seed,
        &request.settings.conflict_search,
    );

    let start_times = schedule::assign_start_times(&lanes, &classes, &request.settings.schedule);

    StartlistGenerationResult {
        seed,
        split,
        lanes,
        classes,
        start_times,
        warnings,
    }
}
