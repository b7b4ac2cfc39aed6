//! チェック単位のパイプライン
//!
//! 既存バケット取得 → 計測結果取得 → 重複排除 → 分割書き込み を順に実行し、
//! 結果を完了トラッカーへ報告する。
//!
//! パイプライン内のエラーはここで捕捉して `fail` 遷移に変換し、
//! 他のチェックや実行全体には伝播させない。

use crate::batch::put_metrics;
use crate::common::error::ImportResult;
use crate::dedup::{should_write, ExistingBuckets};
use crate::pingdom::CheckSource;
use crate::store::{MetricQuery, MetricStore};
use crate::tracker::{CompletionTracker, ReportGuard};
use crate::types::{Check, CheckResult, EntityKey, MetricPoint};
use crate::window::{beginning_of_minute, TimeWindow};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 全パイプラインで共有する読み取り専用コンテキスト
pub struct PipelineContext {
    /// 計測結果の取得元
    pub source: Arc<dyn CheckSource>,
    /// メトリクスストア
    pub store: Arc<dyn MetricStore>,
    /// メトリクスの名前空間
    pub namespace: String,
    /// 処理対象の時間窓
    pub window: TimeWindow,
    /// 1回の書き込みで送る最大ポイント数
    pub max_batch_size: usize,
}

/// 1チェック分の処理結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// 取得した計測結果数
    pub fetched: usize,
    /// 既に記録済みでスキップした数
    pub skipped: usize,
    /// 書き込んだポイント数
    pub written: usize,
    /// 書き込みバッチ数
    pub batches: usize,
}

/// 計測結果からメトリクスポイントを生成
///
/// 未記録のバケットごとに可用性とレイテンシの2ポイントを追加する。
/// 戻り値は (ポイント列, スキップ数)。
pub fn build_metric_points(
    key: &EntityKey,
    results: &[CheckResult],
    existing: &ExistingBuckets,
) -> (Vec<MetricPoint>, usize) {
    let mut points = Vec::with_capacity(results.len() * 2);
    let mut skipped = 0;

    for result in results {
        let Some(time) = result.timestamp().map(beginning_of_minute) else {
            warn!(check = %key, time = result.time, "Ignoring result with invalid timestamp");
            skipped += 1;
            continue;
        };

        if should_write(existing, time) {
            debug!(
                check = %key,
                bucket = %time,
                up = result.is_up(),
                latency_ms = result.responsetime,
                "Putting metrics"
            );
            points.push(MetricPoint::availability(key, time, result.is_up()));
            points.push(MetricPoint::latency(key, time, result.responsetime));
        } else {
            debug!(check = %key, bucket = %time, "Data already recorded");
            skipped += 1;
        }
    }

    (points, skipped)
}

/// チェック単位のパイプライン
pub struct CheckPipeline {
    check: Check,
    key: EntityKey,
    context: Arc<PipelineContext>,
    guard: ReportGuard,
}

impl CheckPipeline {
    /// トラッカーに登録してパイプラインを作成
    ///
    /// 処理を始める前に必ず登録が完了している。
    pub fn register(
        check: Check,
        context: Arc<PipelineContext>,
        tracker: &CompletionTracker,
    ) -> ImportResult<Self> {
        let key = check.key();
        tracker.observe(key.clone())?;
        let guard = ReportGuard::new(tracker.clone(), key.clone());
        Ok(Self {
            check,
            key,
            context,
            guard,
        })
    }

    /// チェックキー
    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    /// パイプラインを実行して結果をトラッカーへ報告
    pub async fn run(self) {
        let outcome = process_check(&self.check, &self.key, &self.context).await;

        let reported = match outcome {
            Ok(stats) => {
                info!(
                    check = %self.key,
                    fetched = stats.fetched,
                    written = stats.written,
                    skipped = stats.skipped,
                    batches = stats.batches,
                    "Successfully processed"
                );
                self.guard.complete()
            }
            Err(e) => {
                warn!(check = %self.key, error = %e, "Failed");
                self.guard.fail(e.to_string())
            }
        };

        if let Err(e) = reported {
            error!(check = %self.key, error = %e, "Failed to report pipeline outcome");
        }
    }
}

async fn process_check(
    check: &Check,
    key: &EntityKey,
    context: &PipelineContext,
) -> ImportResult<PipelineStats> {
    let window = &context.window;

    // 1. 記録済みバケット
    let query = MetricQuery::availability(key, window);
    let existing: ExistingBuckets = context
        .store
        .existing_timestamps(&context.namespace, &query)
        .await?
        .into_iter()
        .collect();

    // 2. 計測結果
    let (from, to) = window.result_range_secs();
    let results = context.source.fetch_results(check.id, from, to).await?;

    // 3. 重複排除
    let (points, skipped) = build_metric_points(key, &results, &existing);

    // 4. 書き込み
    let batches = put_metrics(
        context.store.as_ref(),
        &context.namespace,
        &points,
        context.max_batch_size,
    )
    .await?;

    Ok(PipelineStats {
        fetched: results.len(),
        skipped,
        written: points.len(),
        batches,
    })
}
