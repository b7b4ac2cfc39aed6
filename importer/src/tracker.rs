//! 完了トラッカー
//!
//! 並列に起動したチェック単位のパイプラインの終端状態を記録し、
//! 登録完了かつ全チェックが終端状態に達した時点で待機を解除する。
//!
//! - 状態遷移は `InProgress -> Completed | Failed` の前進のみ。
//! - 全体フェーズは `NotStarted -> Registering -> AwaitingCompletion -> Done`。
//! - 変更操作と完了判定は同一のロックで直列化される。

use crate::common::error::{ImportError, ImportResult};
use crate::types::EntityKey;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::{debug, error};

/// チェックの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityState {
    /// 処理中
    InProgress,
    /// 成功
    Completed,
    /// 失敗（理由付き）
    Failed(String),
}

impl EntityState {
    /// 終端状態か
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// トラッカー全体のフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// まだ何も登録されていない
    NotStarted,
    /// 登録受付中
    Registering,
    /// 登録完了、終端待ち
    AwaitingCompletion,
    /// 待機が解除された
    Done,
}

/// 待機解除時の集計結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSummary {
    /// 成功したチェック（キー順）
    pub completed: Vec<EntityKey>,
    /// 失敗したチェックと理由（キー順）
    pub failed: Vec<(EntityKey, String)>,
}

impl CompletionSummary {
    /// 失敗したチェックのキー
    pub fn failed_keys(&self) -> Vec<EntityKey> {
        self.failed.iter().map(|(key, _)| key.clone()).collect()
    }

    /// 失敗がないか
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// 追跡したチェック数
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len()
    }
}

#[derive(Debug)]
struct Registry {
    phase: TrackerPhase,
    entities: BTreeMap<EntityKey, EntityState>,
    in_progress: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            phase: TrackerPhase::NotStarted,
            entities: BTreeMap::new(),
            in_progress: 0,
        }
    }
}

impl Registry {
    fn is_settled(&self) -> bool {
        matches!(
            self.phase,
            TrackerPhase::AwaitingCompletion | TrackerPhase::Done
        ) && self.in_progress == 0
    }

    fn summary(&self) -> CompletionSummary {
        let mut summary = CompletionSummary::default();
        for (key, state) in &self.entities {
            match state {
                EntityState::Completed => summary.completed.push(key.clone()),
                EntityState::Failed(reason) => summary.failed.push((key.clone(), reason.clone())),
                EntityState::InProgress => {}
            }
        }
        summary
    }

    fn finish(&mut self, key: &EntityKey, next: EntityState) -> ImportResult<()> {
        let state = self
            .entities
            .get_mut(key)
            .ok_or_else(|| ImportError::UnknownEntity(key.clone()))?;
        if state.is_terminal() {
            return Err(ImportError::InvalidTransition {
                key: key.clone(),
                from: state.clone(),
            });
        }
        *state = next;
        self.in_progress -= 1;
        Ok(())
    }
}

/// 完了トラッカー
///
/// クローンは同じレジストリを共有する。
#[derive(Clone, Debug, Default)]
pub struct CompletionTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Debug, Default)]
struct TrackerInner {
    registry: Mutex<Registry>,
    settled: Notify,
}

impl CompletionTracker {
    /// 空のトラッカーを作成
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // Every critical section leaves the registry consistent, so poisoning is ignored.
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// 現在のフェーズ
    pub fn phase(&self) -> TrackerPhase {
        self.lock().phase
    }

    /// チェックの状態
    pub fn state(&self, key: &EntityKey) -> Option<EntityState> {
        self.lock().entities.get(key).cloned()
    }

    /// 処理中のチェック数
    pub fn in_progress(&self) -> usize {
        self.lock().in_progress
    }

    /// チェックを `InProgress` として登録
    ///
    /// 同じキーの二重登録は `DuplicateEntity`、登録完了後の登録は
    /// `RegistrationClosed` になる。
    pub fn observe(&self, key: EntityKey) -> ImportResult<()> {
        let mut registry = self.lock();
        match registry.phase {
            TrackerPhase::NotStarted | TrackerPhase::Registering => {}
            TrackerPhase::AwaitingCompletion | TrackerPhase::Done => {
                error!(check = %key, "Observe called after registration completed");
                return Err(ImportError::RegistrationClosed);
            }
        }
        if registry.entities.contains_key(&key) {
            error!(check = %key, "Check observed twice");
            return Err(ImportError::DuplicateEntity(key));
        }

        debug!(check = %key, "Observing");
        registry.phase = TrackerPhase::Registering;
        registry.entities.insert(key, EntityState::InProgress);
        registry.in_progress += 1;
        Ok(())
    }

    /// 登録完了を通知（1回のみ）
    pub fn mark_registration_complete(&self) -> ImportResult<()> {
        let mut registry = self.lock();
        match registry.phase {
            TrackerPhase::NotStarted | TrackerPhase::Registering => {}
            TrackerPhase::AwaitingCompletion | TrackerPhase::Done => {
                return Err(ImportError::RegistrationClosed);
            }
        }
        registry.phase = TrackerPhase::AwaitingCompletion;
        debug!(
            observed = registry.entities.len(),
            in_progress = registry.in_progress,
            "Registration complete"
        );
        if registry.is_settled() {
            self.inner.settled.notify_waiters();
        }
        Ok(())
    }

    /// チェックを成功として終了
    pub fn complete(&self, key: &EntityKey) -> ImportResult<()> {
        self.transition(key, EntityState::Completed)
    }

    /// チェックを失敗として終了
    pub fn fail(&self, key: &EntityKey, reason: impl Into<String>) -> ImportResult<()> {
        self.transition(key, EntityState::Failed(reason.into()))
    }

    fn transition(&self, key: &EntityKey, next: EntityState) -> ImportResult<()> {
        let mut registry = self.lock();
        if let Err(e) = registry.finish(key, next) {
            error!(check = %key, error = %e, "Invalid tracker transition");
            return Err(e);
        }
        if registry.is_settled() {
            self.inner.settled.notify_waiters();
        }
        Ok(())
    }

    fn try_settle(&self) -> Option<CompletionSummary> {
        let mut registry = self.lock();
        if !registry.is_settled() {
            return None;
        }
        registry.phase = TrackerPhase::Done;
        Some(registry.summary())
    }

    /// 全チェックの終端を待機
    ///
    /// 登録完了前、または `InProgress` のチェックが残っている間は戻らない。
    pub async fn await_completion(&self) -> CompletionSummary {
        loop {
            // Register interest before evaluating the predicate so a transition
            // between the check and the await still wakes us.
            let notified = self.inner.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(summary) = self.try_settle() {
                return summary;
            }
            notified.await;
        }
    }
}

/// パイプラインの報告ガード
///
/// 報告前にドロップされた（パニックで巻き戻された等）場合、
/// チェックを失敗として終了させる。
#[derive(Debug)]
pub struct ReportGuard {
    tracker: CompletionTracker,
    key: EntityKey,
    reported: bool,
}

impl ReportGuard {
    /// ガードを作成
    pub fn new(tracker: CompletionTracker, key: EntityKey) -> Self {
        Self {
            tracker,
            key,
            reported: false,
        }
    }

    /// 成功を報告
    pub fn complete(mut self) -> ImportResult<()> {
        self.reported = true;
        self.tracker.complete(&self.key)
    }

    /// 失敗を報告
    pub fn fail(mut self, reason: impl Into<String>) -> ImportResult<()> {
        self.reported = true;
        self.tracker.fail(&self.key, reason)
    }
}

impl Drop for ReportGuard {
    fn drop(&mut self) {
        if !self.reported {
            let _ = self.tracker.fail(&self.key, "pipeline aborted");
        }
    }
}
