use faker_rand::en_us::{company::CompanyName, names::FullName};
use itertools::Itertools;
use uuid::Uuid;

use crate::domain::entry::Entry;

#[derive(Debug)]
pub struct MockOption {
    pub deterministic_ids: bool,
    pub num_classes: u32,
    pub entries_per_class: u32,
    pub num_clubs: u32,
    pub use_random_names: bool,
}

impl Default for MockOption {
    fn default() -> Self {
        Self {
            deterministic_ids: true,
            num_classes: 4,
            entries_per_class: 9,
            num_clubs: 6,
            use_random_names: false,
        }
    }
}

pub fn make_mock_entries() -> Vec<Entry> {
    make_mock_entries_with_options(Default::default())
}

/// Entry fixtures for tests and demos.
///
/// With deterministic ids, entries are numbered class-major from 1000 and
/// clubs rotate through the roster, so club-conflict behavior is easy to
/// predict in tests.
pub fn make_mock_entries_with_options(options: MockOption) -> Vec<Entry> {
    assert!(options.num_clubs > 0);

    let club_names = (0..options.num_clubs)
        .map(|club_idx| {
            if options.use_random_names {
                rand::random::<CompanyName>().to_string()
            } else {
                format!("Club {}", club_idx + 1)
            }
        })
        .collect_vec();

    let mut entries = Vec::new();
    for class_idx in 0..options.num_classes {
        let class_id = format!("Class {}", class_idx + 1);
        for entry_idx in 0..options.entries_per_class {
            let running_idx = class_idx * options.entries_per_class + entry_idx;
            let id = if options.deterministic_ids {
                Uuid::from_u128(1000 + running_idx as u128)
            } else {
                Uuid::new_v4()
            };
            let name = if options.use_random_names {
                rand::random::<FullName>().to_string()
            } else {
                format!("Runner {}", running_idx + 1)
            };
            entries.push(Entry::new(
                id,
                name,
                club_names[(running_idx % options.num_clubs) as usize].clone(),
                &class_id,
                format!("{}", 500000 + running_idx),
                None,
            ));
        }
    }
    entries
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mock_entries_have_expected_shape() {
        let entries = make_mock_entries_with_options(MockOption {
            deterministic_ids: true,
            num_classes: 3,
            entries_per_class: 5,
            num_clubs: 4,
            use_random_names: false,
        });

        assert_eq!(entries.len(), 15);
        assert_eq!(
            entries.iter().map(|e| e.class_id.clone()).unique().count(),
            3
        );
        assert_eq!(entries.iter().map(|e| e.id).unique().count(), 15);
    }
}
