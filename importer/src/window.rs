//! 時間窓の計算
//!
//! 「N分前」のオフセットから、処理対象となる1分単位のバケット列を求める。

use crate::common::error::{ImportError, ImportResult};
use chrono::{DateTime, Duration, Timelike, Utc};

/// 処理対象の時間窓
///
/// `buckets` は分境界に揃った昇順・連続・重複なしの時刻列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    buckets: Vec<DateTime<Utc>>,
}

impl TimeWindow {
    /// バケット列
    pub fn buckets(&self) -> &[DateTime<Utc>] {
        &self.buckets
    }

    /// 最初のバケット
    pub fn start(&self) -> DateTime<Utc> {
        self.buckets[0]
    }

    /// 最後のバケット
    pub fn end(&self) -> DateTime<Utc> {
        self.buckets[self.buckets.len() - 1]
    }

    /// バケット数
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// 常に1つ以上のバケットを持つ
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// 結果取得APIに渡す範囲（epoch秒、`[start, endOfMinute(end)]`）
    pub fn result_range_secs(&self) -> (i64, i64) {
        (
            round_to_secs(self.start()),
            round_to_secs(end_of_minute(self.end())),
        )
    }
}

/// 分の先頭に切り捨てた時刻
pub fn beginning_of_minute(time: DateTime<Utc>) -> DateTime<Utc> {
    time - Duration::seconds(i64::from(time.second()))
        - Duration::nanoseconds(i64::from(time.nanosecond()))
}

/// 分の末尾（次の分の先頭 - 1ミリ秒）
pub fn end_of_minute(time: DateTime<Utc>) -> DateTime<Utc> {
    beginning_of_minute(time) + Duration::minutes(1) - Duration::milliseconds(1)
}

/// 現在時刻を基準に時間窓を計算
pub fn compute_window(start_minutes_ago: u32, end_minutes_ago: u32) -> ImportResult<TimeWindow> {
    compute_window_at(Utc::now(), start_minutes_ago, end_minutes_ago)
}

/// 指定時刻を基準に時間窓を計算
///
/// `start_minutes_ago - end_minutes_ago` 個のバケットを返す。
/// `start_minutes_ago <= end_minutes_ago` の場合は `InvalidRange`。
pub fn compute_window_at(
    now: DateTime<Utc>,
    start_minutes_ago: u32,
    end_minutes_ago: u32,
) -> ImportResult<TimeWindow> {
    if end_minutes_ago >= start_minutes_ago {
        return Err(ImportError::InvalidRange {
            start_minutes_ago,
            end_minutes_ago,
        });
    }

    let mut current = beginning_of_minute(now) - Duration::minutes(i64::from(end_minutes_ago));
    let count = start_minutes_ago - end_minutes_ago;

    // Walk backwards from the end bucket, then flip to ascending order.
    let mut buckets = Vec::with_capacity(count as usize);
    for _ in 0..count {
        buckets.push(current);
        current -= Duration::minutes(1);
    }
    buckets.reverse();

    Ok(TimeWindow { buckets })
}

fn round_to_secs(time: DateTime<Utc>) -> i64 {
    (time.timestamp_millis() as f64 / 1000.0).round() as i64
}
