use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use startlist_entities::prelude::{
    ClassAssignment, ClassOrderWarning, Entry, RankingKind, RankingMap, StartOrderRule, Uuid,
};

use super::clashes::{
    build_order_with_minimal_conflicts, calculate_warnings, find_conflict_free_order, ClubClashMap,
    ConflictSearchConfig,
};
use super::ranking_order::order_by_ranking;
use super::rng::SeededRng;

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub enum ClassOrderPolicy {
    /// Avoid adjacent same-club starts where possible.
    ClubSafe,
    /// Plain shuffle.
    Unconstrained,
}

pub struct ClassOrderContext<'a> {
    pub rules: &'a [StartOrderRule],
    pub rankings: &'a HashMap<RankingKind, RankingMap>,
}

impl<'a> ClassOrderContext<'a> {
    fn ranking_for_class(&self, class_id: &str, base_class_id: &str) -> Option<&'a RankingMap> {
        // Split parts inherit the ordering rule of their base class.
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.class_id == class_id || rule.class_id == base_class_id)?;
        self.rankings.get(&rule.method.ranking_kind()?)
    }
}

impl ClassOrderPolicy {
    /// Orders one class. Ranking order applies first whenever the class opts
    /// into it and any member is actually ranked; otherwise the policy's own
    /// strategy runs. The returned warning is a post-hoc scan of whatever
    /// order was realized.
    ///
    /// This does not check "ranking configured but data not loaded"; that is
    /// a hard block the caller enforces before generation.
    pub fn order_class(
        &self,
        class_id: &str,
        base_class_id: &str,
        members: &[Entry],
        context: &ClassOrderContext,
        rng: &mut SeededRng,
        search_config: &ConflictSearchConfig,
    ) -> (Vec<Uuid>, Option<ClassOrderWarning>) {
        if members.is_empty() {
            return (vec![], None);
        }

        let clash_map = ClubClashMap::new(members);

        if let Some(ranking) = context.ranking_for_class(class_id, base_class_id) {
            if let Some(order) = order_by_ranking(members, ranking, rng) {
                let warning = calculate_warnings(class_id, &order, &clash_map);
                return (order, warning);
            }
        }

        let member_ids = members.iter().map(|member| member.id).collect_vec();
        let order = match self {
            ClassOrderPolicy::Unconstrained => {
                let mut order = member_ids;
                rng.shuffle(&mut order);
                order
            }
            ClassOrderPolicy::ClubSafe => {
                match find_conflict_free_order(&member_ids, &clash_map, rng, search_config) {
                    Some(order) => order,
                    None => {
                        tracing::warn!(
                            class_id,
                            members = members.len(),
                            "no conflict-free order found, using greedy fallback"
                        );
                        build_order_with_minimal_conflicts(&member_ids, &clash_map, rng)
                    }
                }
            }
        };

        let warning = calculate_warnings(class_id, &order, &clash_map);
        (order, warning)
    }
}

/// One class to order: its effective id, the base class it descends from
/// (identical for unsplit classes) and its current members.
pub struct ClassRoster {
    pub class_id: String,
    pub base_class_id: String,
    pub members: Vec<Entry>,
}

/// Orders every class with one shared generator, walking classes in sorted
/// class-id order so the draw sequence is reproducible.
pub fn order_all_classes(
    policy: ClassOrderPolicy,
    rosters: &[ClassRoster],
    class_intervals: &HashMap<String, i64>,
    context: &ClassOrderContext,
    seed: &str,
    search_config: &ConflictSearchConfig,
) -> (Vec<ClassAssignment>, Vec<ClassOrderWarning>) {
    let mut rng = SeededRng::from_seed_str(seed);
    let mut assignments = Vec::new();
    let mut warnings = Vec::new();

    for roster in rosters
        .iter()
        .sorted_by(|a, b| a.class_id.cmp(&b.class_id))
    {
        let (player_order, warning) = policy.order_class(
            &roster.class_id,
            &roster.base_class_id,
            &roster.members,
            context,
            &mut rng,
            search_config,
        );

        assignments.push(ClassAssignment {
            class_id: roster.class_id.clone(),
            player_order,
            interval_seconds: class_intervals.get(&roster.class_id).copied().unwrap_or(0),
        });
        if let Some(warning) = warning {
            warnings.push(warning);
        }
    }

    (assignments, warnings)
}

/// Classes configured for a ranking order whose data is not ready: either the
/// rule names no data source, or no ranking of the required kind is loaded.
/// Callers must refuse to generate while this is non-empty; the ordering
/// policy itself would silently fall back.
pub fn find_classes_awaiting_ranking(
    rules: &[StartOrderRule],
    rankings: &HashMap<RankingKind, RankingMap>,
) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| {
            let Some(kind) = rule.method.ranking_kind() else {
                return false;
            };
            !rule.has_data_source()
                || rankings.get(&kind).map(|map| map.is_empty()).unwrap_or(true)
        })
        .map(|rule| rule.class_id.clone())
        .sorted()
        .collect_vec()
}
