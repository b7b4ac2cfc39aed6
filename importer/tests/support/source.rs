//! インメモリのチェック取得元

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uptime_importer::pingdom::CheckSource;
use uptime_importer::types::{Check, CheckResult};
use uptime_importer::{ImportError, ImportResult};

/// 呼び出しを記録し、失敗を注入できる取得元
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeCheckSource {
    checks: Vec<Check>,
    results: HashMap<u64, Vec<CheckResult>>,
    failing_results: HashSet<u64>,
    delays: HashMap<u64, Duration>,
    fail_listing: bool,
    list_calls: AtomicUsize,
    fetch_calls: Mutex<Vec<(u64, i64, i64)>>,
}

#[allow(dead_code)]
impl FakeCheckSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// チェックを追加
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// チェックの計測結果を設定
    pub fn with_results(mut self, check_id: u64, results: Vec<CheckResult>) -> Self {
        self.results.insert(check_id, results);
        self
    }

    /// チェックの結果取得を失敗させる
    pub fn failing_results(mut self, check_id: u64) -> Self {
        self.failing_results.insert(check_id);
        self
    }

    /// チェックの結果取得に遅延を入れる
    pub fn with_delay(mut self, check_id: u64, delay: Duration) -> Self {
        self.delays.insert(check_id, delay);
        self
    }

    /// チェック一覧取得を失敗させる
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// 結果取得の呼び出し記録 (check_id, from, to)
    pub fn fetch_calls(&self) -> Vec<(u64, i64, i64)> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn fetched_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.fetch_calls().into_iter().map(|(id, _, _)| id).collect();
        ids.sort_unstable();
        ids
    }
}

/// 計測結果を作成
#[allow(dead_code)]
pub fn result(time: i64, status: &str, responsetime: f64) -> CheckResult {
    CheckResult {
        time,
        status: status.to_string(),
        responsetime,
    }
}

#[async_trait]
impl CheckSource for FakeCheckSource {
    async fn list_checks(&self) -> ImportResult<Vec<Check>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(ImportError::RemoteCall(
                "Bad response upon invoking Pingdom API 'checks': unauthorized".to_string(),
            ));
        }
        Ok(self.checks.clone())
    }

    async fn fetch_results(
        &self,
        check_id: u64,
        from: i64,
        to: i64,
    ) -> ImportResult<Vec<CheckResult>> {
        self.fetch_calls.lock().unwrap().push((check_id, from, to));
        if let Some(delay) = self.delays.get(&check_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_results.contains(&check_id) {
            return Err(ImportError::RemoteCall(format!(
                "Bad response upon invoking Pingdom API 'results/{}': internal error",
                check_id
            )));
        }
        Ok(self.results.get(&check_id).cloned().unwrap_or_default())
    }
}
