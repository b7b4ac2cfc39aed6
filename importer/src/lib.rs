//! Uptime importer
//!
//! 外部監視サービスのチェック結果（可用性・レイテンシ）を定期的に取得し、
//! 記録済みの時間バケットを除いてメトリクスストアへ書き込む。

#![warn(missing_docs)]

/// 共通定義（エラー型）
pub mod common;

/// バッチ書き込み
pub mod batch;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// 重複排除フィルタ
pub mod dedup;

/// 取り込み実行
pub mod importer;

/// ロギング初期化ユーティリティ
pub mod logging;

/// Pingdom APIクライアント
pub mod pingdom;

/// チェック単位のパイプライン
pub mod pipeline;

/// 協調シャットダウン
pub mod shutdown;

/// メトリクスストア
pub mod store;

/// 完了トラッカー
pub mod tracker;

/// データモデル
pub mod types;

/// 時間窓の計算
pub mod window;

pub use common::error::{ImportError, ImportResult};
pub use importer::{Importer, RunReport};
pub use tracker::{CompletionSummary, CompletionTracker, EntityState, TrackerPhase};
