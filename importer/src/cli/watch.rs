//! watch サブコマンド
//!
//! 一定間隔で取り込みを繰り返す。各回は独立した実行で、
//! 失敗してもループは継続する。

use crate::importer::Importer;
use crate::shutdown::ShutdownController;
use clap::Args;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// watch サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Seconds between runs
    #[arg(
        long,
        default_value = "60",
        env = "UPTIME_IMPORTER_WATCH_INTERVAL_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,
}

/// 監視ループを実行
pub async fn execute(
    importer: &Importer,
    args: &WatchArgs,
    shutdown: ShutdownController,
) -> Result<(), anyhow::Error> {
    let mut timer = interval(Duration::from_secs(args.interval_secs));
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_secs = args.interval_secs, "Watch loop started");

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = timer.tick() => {}
        }

        match importer.run().await.and_then(|report| report.into_result()) {
            Ok(processed) => info!(processed = processed, "Scheduled run succeeded"),
            Err(e) => error!(error = %e, "Scheduled run failed"),
        }

        if shutdown.is_shutdown_requested() {
            break;
        }
    }

    info!("Watch loop stopped");
    Ok(())
}
