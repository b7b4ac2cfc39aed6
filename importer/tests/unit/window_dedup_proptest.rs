//! 時間窓と重複排除のProperty-based tests

use chrono::{DateTime, Duration, Timelike, Utc};
use proptest::prelude::*;
use uptime_importer::dedup::{should_write, ExistingBuckets};
use uptime_importer::window::{beginning_of_minute, compute_window_at, end_of_minute};
use uptime_importer::ImportError;

fn instant(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap()
}

// 2001-09-09 .. 2033-05-18
const MILLIS_RANGE: std::ops::Range<i64> = 1_000_000_000_000..2_000_000_000_000;

proptest! {
    /// バケット数は start - end、昇順・60秒間隔・秒/ミリ秒ゼロ
    #[test]
    fn window_buckets_are_contiguous_minutes(
        now in MILLIS_RANGE,
        end in 0u32..120,
        span in 1u32..240,
    ) {
        let start = end + span;
        let window = compute_window_at(instant(now), start, end).unwrap();

        prop_assert_eq!(window.len(), span as usize);
        prop_assert_eq!(window.start(), window.buckets()[0]);
        prop_assert_eq!(window.end(), *window.buckets().last().unwrap());
        for bucket in window.buckets() {
            prop_assert_eq!(bucket.second(), 0);
            prop_assert_eq!(bucket.nanosecond(), 0);
        }
        for pair in window.buckets().windows(2) {
            prop_assert_eq!(pair[1] - pair[0], Duration::seconds(60));
        }
        prop_assert_eq!(
            window.end(),
            beginning_of_minute(instant(now)) - Duration::minutes(end as i64)
        );
    }

    /// start <= end は常に InvalidRange
    #[test]
    fn window_rejects_non_positive_span(
        now in MILLIS_RANGE,
        start in 0u32..120,
        extra in 0u32..120,
    ) {
        let end = start + extra;
        let result = compute_window_at(instant(now), start, end);
        let is_invalid_range = matches!(result, Err(ImportError::InvalidRange { .. }));
        prop_assert!(is_invalid_range);
    }

    /// end_of_minute は同じ分の最後のミリ秒
    #[test]
    fn end_of_minute_stays_in_minute(now in MILLIS_RANGE) {
        let time = instant(now);
        let end = end_of_minute(time);
        prop_assert_eq!(beginning_of_minute(end), beginning_of_minute(time));
        prop_assert_eq!(end + Duration::milliseconds(1) - beginning_of_minute(time), Duration::minutes(1));
    }

    /// 同じ入力には同じ結果、記録済みバケットは再書き込みしない
    #[test]
    fn should_write_is_pure_and_respects_existing(
        existing in prop::collection::vec(MILLIS_RANGE, 0..20),
        candidate in MILLIS_RANGE,
    ) {
        let set: ExistingBuckets = existing.iter().copied().map(instant).collect();
        let candidate = instant(candidate);

        let first = should_write(&set, candidate);
        let second = should_write(&set, candidate);
        prop_assert_eq!(first, second);

        let expected = !existing
            .iter()
            .any(|&t| beginning_of_minute(instant(t)) == beginning_of_minute(candidate));
        prop_assert_eq!(first, expected);

        for &t in &existing {
            prop_assert!(!should_write(&set, instant(t)));
        }
    }
}
