//! ロギング初期化
//!
//! `UPTIME_IMPORTER_LOG_LEVEL`（未設定時は `RUST_LOG`、それも無ければ `info`）で
//! フィルタを決定する。

use tracing_subscriber::EnvFilter;

/// デフォルトのログフィルタ
pub const DEFAULT_LOG_FILTER: &str = "info,hyper=warn,aws_config=warn,aws_smithy_runtime=warn";

/// ログフィルタを決定
pub fn build_filter() -> EnvFilter {
    std::env::var("UPTIME_IMPORTER_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// グローバルサブスクライバを初期化
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_target(false)
        .try_init()
}
