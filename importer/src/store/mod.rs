//! メトリクスストア
//!
//! 記録済みデータポイントの取得とメトリクス書き込みを抽象化する trait。
//! 本番実装は CloudWatch、テストではインメモリ実装を差し込む。

pub mod cloudwatch;

pub use cloudwatch::CloudWatchStore;

use crate::common::error::ImportResult;
use crate::types::{EntityKey, MetricPoint, MetricUnit, SeriesKind};
use crate::window::{end_of_minute, TimeWindow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 既存データ照会の集計期間（秒）
pub const QUERY_PERIOD_SECS: i32 = 60;

/// 既存データ照会の統計種別
pub const QUERY_STATISTIC: &str = "SampleCount";

/// 記録済みデータポイントの照会条件
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    /// 系列キー
    pub series_key: String,
    /// 集計期間（秒）
    pub period_secs: i32,
    /// 開始時刻
    pub start_time: DateTime<Utc>,
    /// 終了時刻（CloudWatch では排他的）
    pub end_time: DateTime<Utc>,
    /// 統計種別
    pub statistic: &'static str,
    /// 単位
    pub unit: MetricUnit,
}

impl MetricQuery {
    /// 可用性系列の記録済みバケットを照会する条件
    ///
    /// `EndTime` は排他的なので、最後のバケットの末尾まで含める。
    pub fn availability(key: &EntityKey, window: &TimeWindow) -> Self {
        Self {
            series_key: SeriesKind::Availability.series_key(key),
            period_secs: QUERY_PERIOD_SECS,
            start_time: window.start(),
            end_time: end_of_minute(window.end()),
            statistic: QUERY_STATISTIC,
            unit: SeriesKind::Availability.unit(),
        }
    }
}

/// メトリクスストアの trait
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// 記録済みデータポイントの時刻を取得
    async fn existing_timestamps(
        &self,
        namespace: &str,
        query: &MetricQuery,
    ) -> ImportResult<Vec<DateTime<Utc>>>;

    /// メトリクスを書き込む（1回の呼び出しで最大 `MAX_PUT_DATAPOINTS` 件）
    async fn put_metric_data(&self, namespace: &str, points: &[MetricPoint]) -> ImportResult<()>;
}
