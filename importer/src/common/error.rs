//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! # エラーのスコープ
//!
//! - `InvalidRange` と、チェック一覧取得時の `RemoteCall` は実行全体を中断する。
//! - チェック単位の `RemoteCall` はパイプライン境界で捕捉され、
//!   トラッカーの `fail` 遷移に変換される。
//! - `UnknownEntity` / `DuplicateEntity` / `InvalidTransition` / `RegistrationClosed`
//!   は呼び出し側の契約違反であり、握りつぶさずに呼び出し元へ返す。

use crate::tracker::EntityState;
use crate::types::EntityKey;
use thiserror::Error;

/// importer error type
#[derive(Debug, Error)]
pub enum ImportError {
    /// Invalid time window parameters
    #[error(
        "endMinutesAgo ({end_minutes_ago}) must be smaller than startMinutesAgo ({start_minutes_ago})"
    )]
    InvalidRange {
        /// Window start, in minutes before now
        start_minutes_ago: u32,
        /// Window end, in minutes before now
        end_minutes_ago: u32,
    },

    /// Remote API call failed or returned a non-success status
    #[error("{0}")]
    RemoteCall(String),

    /// Check reported without having been observed
    #[error("Cannot report observation for: {0}. It was never observed")]
    UnknownEntity(EntityKey),

    /// Check observed twice in the same run
    #[error("Check already observed: {0}")]
    DuplicateEntity(EntityKey),

    /// Check already reached a terminal state
    #[error("Check {key} cannot leave terminal state {from:?}")]
    InvalidTransition {
        /// Check key
        key: EntityKey,
        /// State the check is already in
        from: EntityState,
    },

    /// Registration already finished for this run
    #[error("Registration is already complete")]
    RegistrationClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more checks failed during the run
    #[error("The following checks failed: {}", format_keys(.0))]
    ChecksFailed(Vec<EntityKey>),
}

fn format_keys(keys: &[EntityKey]) -> String {
    let names: Vec<&str> = keys.iter().map(EntityKey::as_str).collect();
    format!("[{}]", names.join(", "))
}

/// importer result type
pub type ImportResult<T> = Result<T, ImportError>;
