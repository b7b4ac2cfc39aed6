//! 取り込み実行
//!
//! チェック一覧を取得し、対象チェックごとにパイプラインを並列起動して、
//! 全パイプラインの終端を待ってから集計結果を返す。

use crate::common::error::{ImportError, ImportResult};
use crate::config::ImportSettings;
use crate::pingdom::CheckSource;
use crate::pipeline::{CheckPipeline, PipelineContext};
use crate::store::MetricStore;
use crate::tracker::{CompletionSummary, CompletionTracker};
use crate::types::EntityKey;
use crate::window::{compute_window, TimeWindow};
use std::sync::Arc;
use tracing::{error, info};

/// 1回の実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// 処理した時間窓
    pub window: TimeWindow,
    /// 解像度が対象外でスキップしたチェック
    pub skipped: Vec<EntityKey>,
    /// 追跡したチェックの集計
    pub summary: CompletionSummary,
}

impl RunReport {
    /// 成功したチェック数
    pub fn processed(&self) -> usize {
        self.summary.completed.len()
    }

    /// 失敗したチェックがないか
    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }

    /// 全体の成否に変換
    ///
    /// 失敗したチェックが1件でもあれば `ChecksFailed`、なければ成功数。
    pub fn into_result(self) -> ImportResult<usize> {
        if self.is_success() {
            Ok(self.processed())
        } else {
            Err(ImportError::ChecksFailed(self.summary.failed_keys()))
        }
    }
}

/// 取り込み実行器
#[derive(Clone)]
pub struct Importer {
    source: Arc<dyn CheckSource>,
    store: Arc<dyn MetricStore>,
    settings: ImportSettings,
}

impl Importer {
    /// 新しい実行器を作成
    pub fn new(
        source: Arc<dyn CheckSource>,
        store: Arc<dyn MetricStore>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            source,
            store,
            settings,
        }
    }

    /// 現在時刻を基準に1回実行
    pub async fn run(&self) -> ImportResult<RunReport> {
        let window = compute_window(
            self.settings.start_minutes_ago,
            self.settings.end_minutes_ago,
        )?;
        self.run_window(window).await
    }

    /// 指定した時間窓で1回実行
    ///
    /// チェック一覧の取得失敗とキー重複は実行全体のエラー。
    /// チェック単位の失敗は `RunReport::summary` に集計される。
    pub async fn run_window(&self, window: TimeWindow) -> ImportResult<RunReport> {
        info!(
            start = %window.start(),
            end = %window.end(),
            "Processing time range"
        );

        let checks = self.source.list_checks().await.map_err(|e| {
            error!(error = %e, "Aborting, fatal error");
            e
        })?;

        let context = Arc::new(PipelineContext {
            source: Arc::clone(&self.source),
            store: Arc::clone(&self.store),
            namespace: self.settings.namespace.clone(),
            window: window.clone(),
            max_batch_size: self.settings.max_batch_size,
        });
        let tracker = CompletionTracker::new();
        let mut skipped = Vec::new();

        for check in checks {
            if !check.is_eligible() {
                info!(
                    check = %check.key(),
                    resolution = check.resolution,
                    "Skipping check, resolution is not 1 minute"
                );
                skipped.push(check.key());
                continue;
            }

            let pipeline = CheckPipeline::register(check, Arc::clone(&context), &tracker)?;
            info!(check = %pipeline.key(), "Processing");
            tokio::spawn(pipeline.run());
        }

        tracker.mark_registration_complete()?;
        let summary = tracker.await_completion().await;

        if summary.is_success() {
            info!(
                processed = summary.completed.len(),
                skipped = skipped.len(),
                "Check(s) successfully processed"
            );
        } else {
            for (key, reason) in &summary.failed {
                error!(check = %key, reason = %reason, "Check failed");
            }
            error!(
                processed = summary.completed.len(),
                failed = summary.failed.len(),
                "Run finished with failed checks"
            );
        }

        Ok(RunReport {
            window,
            skipped,
            summary,
        })
    }
}
