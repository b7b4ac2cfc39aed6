//! 重複排除フィルタ
//!
//! メトリクスストアに既に記録済みのバケットを判定する。

use crate::window::beginning_of_minute;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashSet;

/// バケットの正規化キー（分境界のISO-8601、ミリ秒付きUTC）
pub fn bucket_key(time: DateTime<Utc>) -> String {
    beginning_of_minute(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 記録済みバケットの集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingBuckets {
    keys: HashSet<String>,
}

impl ExistingBuckets {
    /// 空の集合を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// バケットを追加
    pub fn insert(&mut self, time: DateTime<Utc>) {
        self.keys.insert(bucket_key(time));
    }

    /// バケットが記録済みか
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.keys.contains(&bucket_key(time))
    }

    /// 記録済みバケット数
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// 空か
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<DateTime<Utc>> for ExistingBuckets {
    fn from_iter<I: IntoIterator<Item = DateTime<Utc>>>(iter: I) -> Self {
        let mut buckets = Self::new();
        for time in iter {
            buckets.insert(time);
        }
        buckets
    }
}

/// 書き込みが必要か
///
/// 候補時刻を分境界に切り捨てたバケットが未記録の場合のみ `true`。
pub fn should_write(existing: &ExistingBuckets, candidate: DateTime<Utc>) -> bool {
    !existing.contains(candidate)
}
