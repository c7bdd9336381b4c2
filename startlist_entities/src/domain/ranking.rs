use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// External strength ranking: identifier to position, lower = stronger.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Default)]
pub struct RankingMap {
    positions: HashMap<String, u32>,
}

impl RankingMap {
    pub fn new() -> Self {
        RankingMap {
            positions: HashMap::new(),
        }
    }

    pub fn insert(&mut self, identifier: String, position: u32) {
        self.positions.insert(identifier, position);
    }

    pub fn position(&self, identifier: &str) -> Option<u32> {
        self.positions.get(identifier).copied()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.positions.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Entries sorted by identifier, for signature construction.
    pub fn sorted_entries(&self) -> Vec<(String, u32)> {
        self.positions
            .iter()
            .map(|(identifier, position)| (identifier.clone(), *position))
            .sorted()
            .collect()
    }
}

impl FromIterator<(String, u32)> for RankingMap {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        RankingMap {
            positions: iter.into_iter().collect(),
        }
    }
}
