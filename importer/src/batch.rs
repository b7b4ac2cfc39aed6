//! バッチ書き込み
//!
//! 任意件数のメトリクスポイントを固定サイズのバッチに分割し、
//! 全バッチを並列に送信して全件の結果を待つ。

use crate::common::error::{ImportError, ImportResult};
use crate::store::MetricStore;
use crate::types::MetricPoint;
use futures::future::join_all;
use tracing::{debug, warn};

/// 1回の書き込みAPI呼び出しで送信できる最大ポイント数
pub const MAX_PUT_DATAPOINTS: usize = 20;

/// メトリクスを分割書き込み
///
/// 空入力の場合はリモート呼び出しを行わずに成功する。
/// すべてのバッチの完了を待ってから結果を返し、いずれかが失敗した場合は
/// 最初（バッチ順）のエラーを返す。成功時は送信したバッチ数を返す。
pub async fn put_metrics(
    store: &dyn MetricStore,
    namespace: &str,
    points: &[MetricPoint],
    max_batch_size: usize,
) -> ImportResult<usize> {
    if points.is_empty() {
        return Ok(0);
    }

    let batch_size = max_batch_size.clamp(1, MAX_PUT_DATAPOINTS);
    let outcomes = join_all(
        points
            .chunks(batch_size)
            .map(|chunk| store.put_metric_data(namespace, chunk)),
    )
    .await;

    let batches = outcomes.len();
    debug!(
        points = points.len(),
        batches = batches,
        "Metric batches settled"
    );

    match first_failure(outcomes) {
        Some(e) => Err(e),
        None => Ok(batches),
    }
}

/// 最初（バッチ順）のエラーを返し、2件目以降は警告ログに残す
fn first_failure(outcomes: Vec<ImportResult<()>>) -> Option<ImportError> {
    let mut first = None;
    for (index, outcome) in outcomes.into_iter().enumerate() {
        let Err(e) = outcome else { continue };
        if first.is_none() {
            first = Some(e);
        } else {
            warn!(batch = index, error = %e, "Additional metric batch failed");
        }
    }
    first
}
