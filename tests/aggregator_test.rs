mod common;

use common::*;
use hurina::aggregator::{AggregatedBucket, Granularity, aggregate, total_volume};
use hurina::columns::ColumnAliases;
use hurina::normalizer::normalize;
use hurina::record::{Method, Record};

fn records(rows: &[(&str, &str, &str)]) -> Vec<Record> {
    let raw_rows: Vec<_> = rows
        .iter()
        .map(|(t, v, m)| measurement(t, v, m))
        .collect();
    normalize(&raw_rows, &ColumnAliases::default()).unwrap()
}

#[test]
fn daily_sums_per_method() {
    let recs = records(&[
        ("2024-03-04 08:00:00", "200", "Sonde"),
        ("2024-03-04 19:30:00", "150", "Sonde"),
        ("2024-03-04 12:00:00", "80", "Naturel"),
    ]);

    let buckets = aggregate(&recs, Granularity::Daily);

    assert_eq!(
        buckets,
        vec![
            AggregatedBucket {
                period_start: date(2024, 3, 4),
                method: Method::Sonde,
                volume_sum: 350,
            },
            AggregatedBucket {
                period_start: date(2024, 3, 4),
                method: Method::Naturel,
                volume_sum: 80,
            },
        ]
    );
    println!("✓ 200 + 150 on 2024-03-04 / Sonde = 350");
}

#[test]
fn weekly_buckets_start_on_monday() {
    let recs = records(&[
        ("2024-01-07 23:59:00", "100", "Sonde"),
        ("2024-01-01 00:00:00", "300", "Sonde"),
        ("2024-01-08 06:00:00", "50", "Sonde"),
    ]);

    let buckets = aggregate(&recs, Granularity::Weekly);

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].period_start, date(2024, 1, 1));
    assert_eq!(buckets[0].volume_sum, 400);
    assert_eq!(buckets[1].period_start, date(2024, 1, 8));
    assert_eq!(buckets[1].volume_sum, 50);
}

#[test]
fn buckets_are_oldest_first() {
    let recs = records(&[
        ("2024-05-10 08:00:00", "10", "Naturel"),
        ("2024-05-01 08:00:00", "20", "Sonde"),
        ("2024-05-20 08:00:00", "30", "Sonde"),
        ("2024-05-01 09:00:00", "40", "Naturel"),
    ]);

    for granularity in [Granularity::Daily, Granularity::Weekly] {
        let buckets = aggregate(&recs, granularity);
        for pair in buckets.windows(2) {
            assert!(
                (pair[0].period_start, &pair[0].method) < (pair[1].period_start, &pair[1].method)
            );
        }
    }
}

#[test]
fn totals_are_preserved() {
    let recs = records(&[
        ("2024-02-26 08:00:00", "210", "Sonde"),
        ("2024-02-29 08:00:00", "abc", "Naturel"),
        ("2024-03-03 21:00:00", "330", "Naturel"),
        ("2024-03-04 07:00:00", "90", "Sonde"),
        ("garbage", "1000", "Sonde"),
        ("2024-03-17 13:45:00", "460", "Sonde"),
    ]);
    let expected: u64 = recs.iter().map(|r| r.volume_ml as u64).sum();
    assert_eq!(expected, 1090);

    assert_eq!(total_volume(&aggregate(&recs, Granularity::Daily)), expected);
    assert_eq!(total_volume(&aggregate(&recs, Granularity::Weekly)), expected);
}

#[test]
fn empty_input_gives_no_buckets() {
    assert!(aggregate(&[], Granularity::Daily).is_empty());
    assert!(aggregate(&[], Granularity::Weekly).is_empty());
}

#[test]
fn granularity_from_text() {
    assert_eq!("weekly".parse::<Granularity>().unwrap(), Granularity::Weekly);
    assert_eq!("Daily".parse::<Granularity>().unwrap(), Granularity::Daily);
    assert!("monthly".parse::<Granularity>().is_err());
}
