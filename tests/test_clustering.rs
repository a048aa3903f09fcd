use chrono::NaiveDate;
use correlation_toolkit::analysis::cluster::{ClusterEngine, ClusterError};
use correlation_toolkit::analysis::correlation::CorrelationEngine;
use correlation_toolkit::data::table::SeriesTable;

fn table(columns: Vec<(&str, Vec<f64>)>) -> SeriesTable {
    let len = columns[0].1.len();
    let dates = (0..len)
        .map(|i| NaiveDate::from_num_days_from_ce_opt(739_000 + i as i32).unwrap())
        .collect();
    let columns = columns
        .into_iter()
        .map(|(name, values)| {
            (name.to_string(), values.into_iter().map(Some).collect())
        })
        .collect();
    SeriesTable::new(dates, columns).unwrap()
}

/// Two tight groups far apart in observation space.
fn grouped_table() -> SeriesTable {
    table(vec![
        ("A1", vec![1.00, 2.00, 3.00, 4.00, 5.00]),
        ("A2", vec![1.01, 2.02, 2.98, 4.01, 5.02]),
        ("B1", vec![101.0, 99.0, 102.0, 98.0, 100.0]),
        ("B2", vec![100.9, 99.2, 101.8, 98.1, 100.2]),
    ])
}

#[test]
fn test_partition_rejects_oversized_k() {
    let table = table(vec![
        ("A", vec![1.0, 2.0, 3.0]),
        ("B", vec![2.0, 3.0, 1.0]),
        ("C", vec![3.0, 1.0, 2.0]),
    ]);
    assert!(matches!(
        ClusterEngine::partition(&table, 6, 42),
        Err(ClusterError::InvalidClusterCount { k: 6, n: 3 })
    ));
}

#[test]
fn test_partition_rejects_singleton_k() {
    let table = grouped_table();
    assert!(matches!(
        ClusterEngine::partition(&table, 1, 42),
        Err(ClusterError::InvalidClusterCount { k: 1, n: 4 })
    ));
}

#[test]
fn test_partition_assigns_every_instrument_in_range() {
    let table = grouped_table();
    let assignment = ClusterEngine::partition(&table, 2, 42).unwrap();

    assert_eq!(assignment.clusters.len(), 4);
    for &cluster in &assignment.clusters {
        assert!(cluster < assignment.k);
    }
}

#[test]
fn test_partition_separates_distant_groups() {
    let table = grouped_table();
    let assignment = ClusterEngine::partition(&table, 2, 42).unwrap();

    let at = |name: &str| {
        let idx = assignment.labels.iter().position(|l| l == name).unwrap();
        assignment.clusters[idx]
    };
    assert_eq!(at("A1"), at("A2"));
    assert_eq!(at("B1"), at("B2"));
    assert_ne!(at("A1"), at("B1"));
}

#[test]
fn test_partition_is_deterministic_for_a_seed() {
    let table = grouped_table();
    let first = ClusterEngine::partition(&table, 2, 7).unwrap();
    let second = ClusterEngine::partition(&table, 2, 7).unwrap();
    assert_eq!(first.clusters, second.clusters);
}

#[test]
fn test_partition_requires_a_complete_row() {
    let dates = (0..3)
        .map(|i| NaiveDate::from_num_days_from_ce_opt(739_000 + i as i32).unwrap())
        .collect();
    let table = SeriesTable::new(
        dates,
        vec![
            ("A".to_string(), vec![Some(1.0), None, Some(3.0)]),
            ("B".to_string(), vec![None, Some(2.0), None]),
        ],
    )
    .unwrap();
    assert!(matches!(
        ClusterEngine::partition(&table, 2, 42),
        Err(ClusterError::NoCompleteRows)
    ));
}

#[test]
fn test_ward_linkage_merges_similar_profiles_first() {
    let base = [1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
    let table = table(vec![
        ("A1", base.to_vec()),
        ("A2", base.iter().map(|v| v * 2.0 + 0.1).collect()),
        ("B1", base.iter().map(|v| -v).collect()),
        ("B2", base.iter().map(|v| -v * 3.0 - 0.2).collect()),
    ]);
    let matrix = CorrelationEngine::new(&table).unwrap().matrix();
    let linkage = ClusterEngine::ward_linkage(&matrix).unwrap();

    assert_eq!(linkage.steps.len(), 3);
    assert_eq!(linkage.steps.last().unwrap().size, 4);

    // Ward merge heights never decrease.
    for window in linkage.steps.windows(2) {
        assert!(window[1].distance >= window[0].distance);
    }

    // The first merge joins one of the perfectly co-moving pairs:
    // leaves 0,1 (A1, A2) or leaves 2,3 (B1, B2).
    let first = &linkage.steps[0];
    assert!(
        (first.left, first.right) == (0, 1) || (first.left, first.right) == (2, 3),
        "unexpected first merge: {:?}",
        (first.left, first.right)
    );
}

#[test]
fn test_ward_linkage_rejects_undefined_entries() {
    let table = table(vec![
        ("A", vec![1.0, 2.0, 3.0, 4.0]),
        ("B", vec![4.0, 3.0, 2.0, 1.0]),
        ("FLAT", vec![5.0, 5.0, 5.0, 5.0]),
    ]);
    let matrix = CorrelationEngine::new(&table).unwrap().matrix();
    assert!(matches!(
        ClusterEngine::ward_linkage(&matrix),
        Err(ClusterError::UndefinedCorrelation)
    ));
}
