//! Unit tests for date-range partitioning

use chrono::NaiveDate;
use repo_harvester::collector::day_buckets;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn bucket_count_matches_span_length() {
    let start = day(2013, 1, 1);
    let end = day(2013, 2, 15);
    let buckets = day_buckets(start, end);

    assert_eq!(buckets.len() as i64, (end - start).num_days() + 1);
    assert_eq!(buckets.first(), Some(&start));
    assert_eq!(buckets.last(), Some(&end));
}

#[test]
fn buckets_are_strictly_increasing_without_duplicates() {
    let buckets = day_buckets(day(2020, 2, 27), day(2020, 3, 2));
    // 2020 is a leap year: Feb 27, 28, 29, Mar 1, 2
    assert_eq!(buckets.len(), 5);
    for pair in buckets.windows(2) {
        assert!(pair[0] < pair[1]);
        assert_eq!((pair[1] - pair[0]).num_days(), 1);
    }
}

#[test]
fn inverted_span_produces_no_buckets() {
    assert!(day_buckets(day(2023, 5, 2), day(2023, 5, 1)).is_empty());
}
