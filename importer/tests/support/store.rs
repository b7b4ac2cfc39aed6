//! インメモリのメトリクスストア

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uptime_importer::store::{MetricQuery, MetricStore};
use uptime_importer::types::MetricPoint;
use uptime_importer::{ImportError, ImportResult};

/// 書き込み呼び出しの記録
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct PutCall {
    pub namespace: String,
    pub points: Vec<MetricPoint>,
}

/// 呼び出しを記録し、失敗を注入できるストア
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeMetricStore {
    existing: HashMap<String, Vec<DateTime<Utc>>>,
    failing_reads: HashSet<String>,
    failing_put_calls: HashSet<usize>,
    failing_put_series: HashSet<String>,
    put_delay: Option<Duration>,
    queries: Mutex<Vec<MetricQuery>>,
    puts: Mutex<Vec<PutCall>>,
    put_attempts: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl FakeMetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 系列に記録済みバケットを設定
    pub fn with_existing(mut self, series_key: &str, times: Vec<DateTime<Utc>>) -> Self {
        self.existing.insert(series_key.to_string(), times);
        self
    }

    /// 系列の既存データ照会を失敗させる
    pub fn failing_read(mut self, series_key: &str) -> Self {
        self.failing_reads.insert(series_key.to_string());
        self
    }

    /// n 番目（0始まり）の書き込み呼び出しを失敗させる
    pub fn failing_put_call(mut self, index: usize) -> Self {
        self.failing_put_calls.insert(index);
        self
    }

    /// 指定系列を含む書き込みを失敗させる
    pub fn failing_put_series(mut self, series_key: &str) -> Self {
        self.failing_put_series.insert(series_key.to_string());
        self
    }

    /// 書き込みごとに遅延を入れる
    pub fn with_put_delay(mut self, delay: Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    /// 成功・失敗を問わず試行された書き込み呼び出し数
    pub fn put_attempts(&self) -> usize {
        self.put_attempts.load(Ordering::SeqCst)
    }

    /// 成功した書き込み
    pub fn puts(&self) -> Vec<PutCall> {
        self.puts.lock().unwrap().clone()
    }

    /// 成功した書き込みの全ポイント
    pub fn written_points(&self) -> Vec<MetricPoint> {
        self.puts()
            .into_iter()
            .flat_map(|call| call.points)
            .collect()
    }

    /// 既存データ照会の記録
    pub fn queries(&self) -> Vec<MetricQuery> {
        self.queries.lock().unwrap().clone()
    }

    /// 同時に処理中だった書き込みの最大数
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricStore for FakeMetricStore {
    async fn existing_timestamps(
        &self,
        _namespace: &str,
        query: &MetricQuery,
    ) -> ImportResult<Vec<DateTime<Utc>>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.failing_reads.contains(&query.series_key) {
            return Err(ImportError::RemoteCall(format!(
                "Unable to fetch existing availability data from Cloudwatch: {} throttled",
                query.series_key
            )));
        }
        Ok(self
            .existing
            .get(&query.series_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn put_metric_data(&self, namespace: &str, points: &[MetricPoint]) -> ImportResult<()> {
        let index = self.put_attempts.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let series_failure = points
            .iter()
            .any(|p| self.failing_put_series.contains(&p.series_key));
        if self.failing_put_calls.contains(&index) || series_failure {
            return Err(ImportError::RemoteCall(format!(
                "Unable to put data into CloudWatch: batch {} rejected",
                index
            )));
        }

        self.puts.lock().unwrap().push(PutCall {
            namespace: namespace.to_string(),
            points: points.to_vec(),
        });
        Ok(())
    }
}
