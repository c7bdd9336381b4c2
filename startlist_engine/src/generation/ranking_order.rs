use itertools::Itertools;
use ordered_float::OrderedFloat;
use startlist_entities::prelude::{Entry, RankingMap, Uuid};

use super::rng::SeededRng;

/// Start order from an external strength ranking: unranked members first in
/// shuffled order, then ranked members from weakest to strongest, so the
/// strongest known competitor starts last.
///
/// Returns None when no member matches the ranking at all; the caller then
/// falls back to the class's normal ordering policy.
pub fn order_by_ranking(
    members: &[Entry],
    ranking: &RankingMap,
    rng: &mut SeededRng,
) -> Option<Vec<Uuid>> {
    let mut ranked = Vec::new();
    let mut unranked = Vec::new();
    for member in members {
        match member
            .ranking_id
            .as_deref()
            .and_then(|identifier| ranking.position(identifier))
        {
            Some(position) => ranked.push((member.id, position)),
            None => unranked.push(member.id),
        }
    }

    if ranked.is_empty() {
        return None;
    }

    rng.shuffle(&mut unranked);

    let ranked = ranked
        .into_iter()
        .map(|(id, position)| (id, position, OrderedFloat(rng.next_f64())))
        .sorted_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.2.cmp(&b.2))
                .then_with(|| a.0.cmp(&b.0))
        })
        .map(|(id, _, _)| id);

    Some(unranked.into_iter().chain(ranked).collect_vec())
}
