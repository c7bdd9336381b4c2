use itertools::Itertools;
use startlist_entities::prelude::LaneAssignment;

/// Longest-processing-time-first bin packing of classes into lanes: classes
/// in descending size order, each placed on the currently least-loaded lane.
/// No randomness; the operator may drag classes between lanes afterwards and
/// the balancer is never re-run incrementally over such edits.
///
/// Zero lanes or a non-positive lane interval means the layout is not
/// computable yet and yields an empty result. Lanes left without classes are
/// omitted; `with_placeholder_lanes` re-synthesizes them for display.
pub fn balance_classes_into_lanes(
    class_sizes: &[(String, usize)],
    lane_count: u32,
    lane_interval_seconds: i64,
) -> Vec<LaneAssignment> {
    if lane_count == 0 || lane_interval_seconds <= 0 {
        return vec![];
    }

    let ordered = class_sizes
        .iter()
        .sorted_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
                .then_with(|| a.0.cmp(&b.0))
        })
        .collect_vec();

    let mut lane_loads = vec![0usize; lane_count as usize];
    let mut lane_classes: Vec<Vec<String>> = vec![Vec::new(); lane_count as usize];

    for (class_id, size) in ordered {
        let lightest = lane_loads
            .iter()
            .enumerate()
            .min_by_key(|(lane_idx, load)| (**load, *lane_idx))
            .map(|(lane_idx, _)| lane_idx)
            .expect("lane_count is non-zero");

        lane_classes[lightest].push(class_id.clone());
        lane_loads[lightest] += size;
    }

    lane_classes
        .into_iter()
        .enumerate()
        .filter(|(_, classes)| !classes.is_empty())
        .map(|(lane_idx, classes)| LaneAssignment {
            lane_number: lane_idx as u32 + 1,
            class_order: classes,
            interval_seconds: lane_interval_seconds,
        })
        .collect_vec()
}

/// Fills the gaps in a persisted lane list with empty placeholder lanes so
/// the display always shows the full channel layout.
pub fn with_placeholder_lanes(
    lanes: &[LaneAssignment],
    lane_count: u32,
    lane_interval_seconds: i64,
) -> Vec<LaneAssignment> {
    (1..=lane_count)
        .map(|lane_number| {
            lanes
                .iter()
                .find(|lane| lane.lane_number == lane_number)
                .cloned()
                .unwrap_or(LaneAssignment {
                    lane_number,
                    class_order: vec![],
                    interval_seconds: lane_interval_seconds,
                })
        })
        .collect_vec()
}

#[cfg(test)]
mod test {
    use super::*;

    fn sizes(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
        pairs
            .iter()
            .map(|(class_id, size)| (class_id.to_string(), *size))
            .collect_vec()
    }

    #[test]
    fn test_largest_classes_spread_across_lanes() {
        let lanes = balance_classes_into_lanes(
            &sizes(&[("M21", 40), ("W21", 35), ("M35", 10), ("W35", 5)]),
            2,
            120,
        );

        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].class_order, vec!["M21".to_string(), "W35".to_string()]);
        assert_eq!(lanes[1].class_order, vec!["W21".to_string(), "M35".to_string()]);
    }

    #[test]
    fn test_load_difference_bounded_by_largest_class() {
        let class_sizes = sizes(&[
            ("A", 31),
            ("B", 17),
            ("C", 17),
            ("D", 12),
            ("E", 9),
            ("F", 9),
            ("G", 4),
            ("H", 1),
        ]);
        let lanes = balance_classes_into_lanes(&class_sizes, 3, 60);

        let loads = lanes
            .iter()
            .map(|lane| {
                lane.class_order
                    .iter()
                    .map(|class_id| {
                        class_sizes
                            .iter()
                            .find(|(id, _)| id == class_id)
                            .map(|(_, size)| *size)
                            .unwrap()
                    })
                    .sum::<usize>()
            })
            .collect_vec();

        let largest = 31;
        assert!(loads.iter().max().unwrap() - loads.iter().min().unwrap() <= largest);
    }

    #[test]
    fn test_equal_sizes_tie_break_on_class_id() {
        let lanes = balance_classes_into_lanes(&sizes(&[("b", 5), ("A", 5), ("c", 5)]), 1, 60);
        assert_eq!(
            lanes[0].class_order,
            vec!["A".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_unusable_configuration_gives_empty_result() {
        assert!(balance_classes_into_lanes(&sizes(&[("M21", 10)]), 0, 60).is_empty());
        assert!(balance_classes_into_lanes(&sizes(&[("M21", 10)]), 2, 0).is_empty());
        assert!(balance_classes_into_lanes(&sizes(&[("M21", 10)]), 2, -30).is_empty());
    }

    #[test]
    fn test_empty_lanes_are_omitted_and_resynthesized() {
        let lanes = balance_classes_into_lanes(&sizes(&[("M21", 10)]), 3, 60);
        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes[0].lane_number, 1);

        let display = with_placeholder_lanes(&lanes, 3, 60);
        assert_eq!(display.len(), 3);
        assert!(display[1].class_order.is_empty());
        assert!(display[2].class_order.is_empty());
    }
}
