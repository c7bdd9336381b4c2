use std::collections::HashMap;

use itertools::Itertools;
use lazy_static::lazy_static;
use ordered_float::OrderedFloat;
use regex::Regex;
use startlist_entities::prelude::{AdjacentClubPair, ClassOrderWarning, Entry, Uuid};

use super::rng::SeededRng;

lazy_static! {
    static ref INNER_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Club tokens of one entry. A competitor running for several clubs lists
/// them separated by `/`; whitespace inside a name is collapsed so
/// "OK  Linné" and "OK Linné" count as the same club.
pub fn club_tokens(club: &str) -> Vec<String> {
    club.split('/')
        .map(|part| INNER_WHITESPACE.replace_all(part.trim(), " ").to_string())
        .filter(|part| !part.is_empty())
        .unique()
        .collect_vec()
}

/// Pairwise club overlap lookup for one class roster.
#[derive(Debug, Clone)]
pub struct ClubClashMap {
    tokens: HashMap<Uuid, Vec<String>>,
}

impl ClubClashMap {
    pub fn new(members: &[Entry]) -> Self {
        ClubClashMap {
            tokens: members
                .iter()
                .map(|member| (member.id, club_tokens(&member.club)))
                .collect(),
        }
    }

    pub fn tokens_of(&self, id: Uuid) -> &[String] {
        self.tokens.get(&id).map(|tokens| tokens.as_slice()).unwrap_or(&[])
    }

    pub fn shared_clubs(&self, first: Uuid, second: Uuid) -> Vec<String> {
        let second_tokens = self.tokens_of(second);
        self.tokens_of(first)
            .iter()
            .filter(|token| second_tokens.contains(token))
            .cloned()
            .collect_vec()
    }

    pub fn shares_club(&self, first: Uuid, second: Uuid) -> bool {
        let second_tokens = self.tokens_of(second);
        self.tokens_of(first)
            .iter()
            .any(|token| second_tokens.contains(token))
    }
}

#[derive(Debug, Clone)]
pub struct ConflictSearchConfig {
    /// Shuffled restarts before giving up.
    pub max_attempts: usize,
    /// Total backtracking step budget shared across all attempts. The search
    /// has no useful worst-case bound, so it is capped and treated as
    /// best-effort; callers fall back to the greedy ordering on exhaustion.
    pub max_steps: usize,
}

impl Default for ConflictSearchConfig {
    fn default() -> Self {
        ConflictSearchConfig {
            max_attempts: 10,
            max_steps: 20_000,
        }
    }
}

/// Backtracking search for an order with no two adjacent members sharing a
/// club. Returns the first complete ordering found, or None once the attempt
/// and step budgets are exhausted.
pub fn find_conflict_free_order(
    members: &[Uuid],
    clash_map: &ClubClashMap,
    rng: &mut SeededRng,
    config: &ConflictSearchConfig,
) -> Option<Vec<Uuid>> {
    if members.len() <= 1 {
        return Some(members.to_vec());
    }

    let mut steps = 0;
    for _ in 0..config.max_attempts {
        let mut remaining = members.to_vec();
        rng.shuffle(&mut remaining);

        let mut placed = Vec::with_capacity(members.len());
        if extend_order(
            &mut placed,
            &mut remaining,
            clash_map,
            rng,
            &mut steps,
            config.max_steps,
        ) {
            return Some(placed);
        }
        if steps >= config.max_steps {
            break;
        }
    }
    None
}

fn extend_order(
    placed: &mut Vec<Uuid>,
    remaining: &mut Vec<Uuid>,
    clash_map: &ClubClashMap,
    rng: &mut SeededRng,
    steps: &mut usize,
    max_steps: usize,
) -> bool {
    if remaining.is_empty() {
        return true;
    }
    *steps += 1;
    if *steps > max_steps {
        return false;
    }

    let mut candidates = remaining
        .iter()
        .copied()
        .filter(|candidate| {
            placed
                .last()
                .map(|last| !clash_map.shares_club(*last, *candidate))
                .unwrap_or(true)
        })
        .collect_vec();
    rng.shuffle(&mut candidates);

    for candidate in candidates {
        let idx = remaining
            .iter()
            .position(|id| *id == candidate)
            .expect("candidate drawn from remaining");
        remaining.swap_remove(idx);
        placed.push(candidate);

        if extend_order(placed, remaining, clash_map, rng, steps, max_steps) {
            return true;
        }

        placed.pop();
        remaining.push(candidate);
        if *steps > max_steps {
            return false;
        }
    }
    false
}

/// Greedy fallback when no conflict-free order was found: always extend with
/// a non-clashing member if one remains (random among those), otherwise with
/// the least entangled remaining member.
pub fn build_order_with_minimal_conflicts(
    members: &[Uuid],
    clash_map: &ClubClashMap,
    rng: &mut SeededRng,
) -> Vec<Uuid> {
    let mut remaining = members.to_vec();
    let mut order = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let next = match order.last() {
            None => remaining[rng.next_index(remaining.len())],
            Some(last) => {
                let clean = remaining
                    .iter()
                    .copied()
                    .filter(|candidate| !clash_map.shares_club(*last, *candidate))
                    .collect_vec();
                if !clean.is_empty() {
                    clean[rng.next_index(clean.len())]
                } else {
                    remaining
                        .iter()
                        .copied()
                        .map(|candidate| {
                            (
                                clash_map.shared_clubs(*last, candidate).len(),
                                clash_map.tokens_of(candidate).len(),
                                OrderedFloat(rng.next_f64()),
                                candidate,
                            )
                        })
                        .min()
                        .map(|(_, _, _, candidate)| candidate)
                        .expect("remaining is non-empty")
                }
            }
        };

        let idx = remaining
            .iter()
            .position(|id| *id == next)
            .expect("next drawn from remaining");
        remaining.remove(idx);
        order.push(next);
    }
    order
}

/// Post-hoc scan of a realized order for adjacent same-club starts. Purely
/// diagnostic; the ordering algorithms never consult it.
pub fn calculate_warnings(
    class_id: &str,
    order: &[Uuid],
    clash_map: &ClubClashMap,
) -> Option<ClassOrderWarning> {
    let conflicts = order
        .windows(2)
        .filter_map(|pair| {
            let shared = clash_map.shared_clubs(pair[0], pair[1]);
            if shared.is_empty() {
                None
            } else {
                Some(AdjacentClubPair {
                    first_id: pair[0],
                    second_id: pair[1],
                    shared_clubs: shared,
                })
            }
        })
        .collect_vec();

    if conflicts.is_empty() {
        None
    } else {
        Some(ClassOrderWarning {
            class_id: class_id.to_string(),
            conflicts,
        })
    }
}
