use itertools::Itertools;
use startlist_entities::prelude::{Entry, LaneAssignment, RankingMap};

/// Seed placeholder for startlists that have not been persisted yet.
const UNSAVED_STARTLIST_ID: &str = "startlist";

const FNV_OFFSET_BASIS: u32 = 0x811c9dc5;
const FNV_PRIME: u32 = 0x01000193;

/// Deterministic generator behind every "random" choice in a schedule
/// generation. Mulberry32 with an explicit 32-bit state and no external
/// entropy: re-running with the same seed must reproduce the identical
/// startlist.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        SeededRng { state: seed }
    }

    pub fn from_seed_str(seed: &str) -> Self {
        SeededRng::new(string_to_seed(seed))
    }

    /// Next value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        ((t ^ (t >> 14)) as f64) / 4_294_967_296.0
    }

    /// Uniform index below `bound`. `bound` must be non-zero.
    pub fn next_index(&mut self, bound: usize) -> usize {
        (self.next_f64() * bound as f64) as usize
    }

    /// Fisher–Yates, driven by `next_f64` so the swap sequence is part of
    /// the reproducible output contract.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_f64() * (i + 1) as f64) as usize;
            items.swap(i, j);
        }
    }
}

pub fn fnv1a(input: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in input.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Turns a user-visible seed string into generator state. Seeds are shown and
/// entered as hex, but any text is accepted: after stripping non-hex
/// characters the rest is parsed as hex, and if nothing parseable remains the
/// raw string is hashed instead. Never returns 0.
pub fn string_to_seed(seed: &str) -> u32 {
    let hex: String = seed.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    let parsed = u32::from_str_radix(&hex, 16).ok().filter(|v| *v != 0);
    match parsed {
        Some(value) => value,
        None => {
            let hashed = fnv1a(seed);
            if hashed != 0 {
                hashed
            } else {
                FNV_OFFSET_BASIS
            }
        }
    }
}

/// Derives the seed for one generation run.
///
/// With `explicit_seed` the value passes through unchanged, which is what
/// makes "regenerate, keeping the current order" possible. Otherwise the seed
/// is a hash over a composite signature of everything order-relevant:
/// startlist identity, lane layout, roster and ranking inputs. All collections
/// are sorted before rendering, so the seed is invariant to input order but
/// shifts whenever a card number, lane sequence or ranking changes.
pub fn derive_seed(
    startlist_id: Option<&str>,
    entries: &[Entry],
    lanes: &[LaneAssignment],
    explicit_seed: Option<&str>,
    ranking_entries: &[(String, u32)],
    ranking_target_classes: &[String],
) -> String {
    if let Some(seed) = explicit_seed {
        return seed.to_string();
    }

    let lane_signature = lanes
        .iter()
        .sorted_by_key(|lane| lane.lane_number)
        .map(|lane| {
            format!(
                "{}:{}:{}",
                lane.lane_number,
                lane.interval_seconds,
                lane.class_order.iter().join("|")
            )
        })
        .join(";");

    let entry_signature = entries
        .iter()
        .sorted_by_key(|entry| entry.id)
        .map(|entry| format!("{}:{}", entry.id, entry.card_number))
        .join(";");

    let ranking_signature = format!(
        "{}@{}",
        ranking_entries
            .iter()
            .sorted()
            .map(|(identifier, position)| format!("{}:{}", identifier, position))
            .join(";"),
        ranking_target_classes.iter().sorted().join("|")
    );

    let signature = format!(
        "{}#{}#{}#{}",
        startlist_id.unwrap_or(UNSAVED_STARTLIST_ID),
        lane_signature,
        entry_signature,
        ranking_signature
    );

    format!("{:08x}", fnv1a(&signature))
}

/// Flattens per-source ranking maps into seed input rows, tagged by source so
/// loading the same positions under a different source still shifts the seed.
pub fn ranking_seed_entries<'a, I>(rankings: I) -> Vec<(String, u32)>
where
    I: IntoIterator<Item = (&'a str, &'a RankingMap)>,
{
    rankings
        .into_iter()
        .flat_map(|(tag, ranking)| {
            ranking
                .sorted_entries()
                .into_iter()
                .map(move |(identifier, position)| (format!("{}:{}", tag, identifier), position))
        })
        .collect_vec()
}

#[cfg(test)]
mod test {
    use startlist_entities::prelude::Uuid;

    use super::*;

    fn mock_entry(id: u128, card: &str) -> Entry {
        Entry::new(
            Uuid::from_u128(id),
            format!("Runner {}", id),
            "Club".into(),
            "M21",
            card.into(),
            None,
        )
    }

    #[test]
    fn test_same_seed_gives_same_sequence() {
        let mut a = SeededRng::new(0x1a2b3c4d);
        let mut b = SeededRng::new(0x1a2b3c4d);
        for _ in 0..100 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRng::new(1);
        let mut b = SeededRng::new(2);
        let a_values = (0..10).map(|_| a.next_f64()).collect::<Vec<_>>();
        let b_values = (0..10).map(|_| b.next_f64()).collect::<Vec<_>>();
        assert_ne!(a_values, b_values);
    }

    #[test]
    fn test_output_stays_in_unit_interval() {
        let mut rng = SeededRng::new(u32::MAX);
        for _ in 0..1000 {
            let value = rng.next_f64();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = SeededRng::new(7);
        let mut items = (0..50).collect::<Vec<_>>();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let mut a = SeededRng::new(99);
        let mut b = SeededRng::new(99);
        let mut items_a = (0..20).collect::<Vec<_>>();
        let mut items_b = (0..20).collect::<Vec<_>>();
        a.shuffle(&mut items_a);
        b.shuffle(&mut items_b);
        assert_eq!(items_a, items_b);
    }

    #[test]
    fn test_string_to_seed_parses_hex() {
        assert_eq!(string_to_seed("1a2b3c4d"), 0x1a2b3c4d);
        // Non-hex characters are stripped before parsing.
        assert_eq!(string_to_seed("1a-2b 3c4d"), 0x1a2b3c4d);
    }

    #[test]
    fn test_string_to_seed_never_yields_zero() {
        assert_ne!(string_to_seed("0"), 0);
        assert_ne!(string_to_seed(""), 0);
        assert_ne!(string_to_seed("00000000"), 0);
    }

    #[test]
    fn test_string_to_seed_hashes_non_hex_input() {
        assert_eq!(string_to_seed("!!"), fnv1a("!!"));
    }

    #[test]
    fn test_derive_seed_ignores_collection_order() {
        let entries_a = vec![mock_entry(1, "100"), mock_entry(2, "200")];
        let entries_b = vec![mock_entry(2, "200"), mock_entry(1, "100")];
        let lanes = vec![LaneAssignment {
            lane_number: 1,
            class_order: vec!["M21".into()],
            interval_seconds: 0,
        }];

        let seed_a = derive_seed(Some("sl-1"), &entries_a, &lanes, None, &[], &[]);
        let seed_b = derive_seed(Some("sl-1"), &entries_b, &lanes, None, &[], &[]);
        assert_eq!(seed_a, seed_b);
    }

    #[test]
    fn test_derive_seed_changes_with_card_number() {
        let lanes: Vec<LaneAssignment> = vec![];
        let seed_a = derive_seed(
            Some("sl-1"),
            &[mock_entry(1, "100")],
            &lanes,
            None,
            &[],
            &[],
        );
        let seed_b = derive_seed(
            Some("sl-1"),
            &[mock_entry(1, "101")],
            &lanes,
            None,
            &[],
            &[],
        );
        assert_ne!(seed_a, seed_b);
    }

    #[test]
    fn test_derive_seed_changes_with_lane_class_sequence() {
        let entries = vec![mock_entry(1, "100")];
        let lanes_a = vec![LaneAssignment {
            lane_number: 1,
            class_order: vec!["M21".into(), "W21".into()],
            interval_seconds: 0,
        }];
        let lanes_b = vec![LaneAssignment {
            lane_number: 1,
            class_order: vec!["W21".into(), "M21".into()],
            interval_seconds: 0,
        }];

        let seed_a = derive_seed(Some("sl-1"), &entries, &lanes_a, None, &[], &[]);
        let seed_b = derive_seed(Some("sl-1"), &entries, &lanes_b, None, &[], &[]);
        assert_ne!(seed_a, seed_b);
    }

    #[test]
    fn test_explicit_seed_passes_through() {
        let seed = derive_seed(
            Some("sl-1"),
            &[mock_entry(1, "100")],
            &[],
            Some("cafebabe"),
            &[],
            &[],
        );
        assert_eq!(seed, "cafebabe");
    }

    #[test]
    fn test_derived_seed_is_eight_hex_digits() {
        let seed = derive_seed(None, &[], &[], None, &[], &[]);
        assert_eq!(seed.len(), 8);
        assert!(seed.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
