//! データモデル
//!
//! チェック、チェック結果、メトリクスポイントの型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 1分解像度のチェックのみ取り込み対象
pub const ELIGIBLE_RESOLUTION_MINUTES: u32 = 1;

/// チェックの識別キー（`<name>-<id>`）
///
/// 重複排除・進捗追跡・系列名の基点として使用する。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// 文字列表現を取得
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 監視対象のチェック
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// チェックID
    pub id: u64,
    /// チェック名
    pub name: String,
    /// サンプリング間隔（分）
    pub resolution: u32,
}

impl Check {
    /// チェックを作成
    pub fn new(id: u64, name: impl Into<String>, resolution: u32) -> Self {
        Self {
            id,
            name: name.into(),
            resolution,
        }
    }

    /// 識別キー
    pub fn key(&self) -> EntityKey {
        EntityKey(format!("{}-{}", self.name, self.id))
    }

    /// 取り込み対象か（解像度が1分のもののみ）
    pub fn is_eligible(&self) -> bool {
        self.resolution == ELIGIBLE_RESOLUTION_MINUTES
    }
}

/// チェック結果（1サンプル）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// 計測時刻（epoch秒）
    pub time: i64,
    /// ステータス（`up` 以外はダウン扱い）
    pub status: String,
    /// 応答時間（ミリ秒）
    #[serde(default)]
    pub responsetime: f64,
}

impl CheckResult {
    /// 稼働中か
    pub fn is_up(&self) -> bool {
        self.status == "up"
    }

    /// 計測時刻
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

/// メトリクス系列の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    /// 可用性（0 または 100）
    Availability,
    /// レイテンシ（ミリ秒）
    Latency,
}

impl SeriesKind {
    /// 系列名のサフィックス
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Availability => "Availability",
            Self::Latency => "Latency",
        }
    }

    /// 系列の単位
    pub fn unit(self) -> MetricUnit {
        match self {
            Self::Availability => MetricUnit::Percent,
            Self::Latency => MetricUnit::Milliseconds,
        }
    }

    /// チェックに対応する系列キー
    pub fn series_key(self, key: &EntityKey) -> String {
        format!("{}-{}", key, self.suffix())
    }
}

/// メトリクスの単位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricUnit {
    /// パーセント
    Percent,
    /// ミリ秒
    Milliseconds,
}

impl MetricUnit {
    /// 単位名
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percent => "Percent",
            Self::Milliseconds => "Milliseconds",
        }
    }
}

/// 書き込み対象のメトリクスポイント
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    /// 系列キー
    pub series_key: String,
    /// バケット時刻
    pub timestamp: DateTime<Utc>,
    /// 値
    pub value: f64,
    /// 単位
    pub unit: MetricUnit,
}

impl MetricPoint {
    /// 可用性ポイントを作成
    pub fn availability(key: &EntityKey, timestamp: DateTime<Utc>, up: bool) -> Self {
        Self {
            series_key: SeriesKind::Availability.series_key(key),
            timestamp,
            value: if up { 100.0 } else { 0.0 },
            unit: SeriesKind::Availability.unit(),
        }
    }

    /// レイテンシポイントを作成
    pub fn latency(key: &EntityKey, timestamp: DateTime<Utc>, latency_ms: f64) -> Self {
        Self {
            series_key: SeriesKind::Latency.series_key(key),
            timestamp,
            value: latency_ms,
            unit: SeriesKind::Latency.unit(),
        }
    }
}
