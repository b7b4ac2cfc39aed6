//! CLI module for uptime-importer
//!
//! Provides the command-line interface for one-shot and scheduled imports.

pub mod checks;
pub mod run;
pub mod watch;
pub mod window;

use crate::config::{ImportConfig, ImportSettings};
use crate::importer::Importer;
use crate::pingdom::PingdomClient;
use crate::store::CloudWatchStore;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;

/// Uptime importer - copies uptime/latency check results into CloudWatch metrics
#[derive(Parser, Debug)]
#[command(name = "uptime-importer")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    UPTIME_IMPORTER_PINGDOM_USERNAME   Pingdom username
    UPTIME_IMPORTER_PINGDOM_PASSWORD   Pingdom password
    UPTIME_IMPORTER_PINGDOM_APP_KEY    Pingdom App-Key header
    UPTIME_IMPORTER_PINGDOM_URL        Pingdom API base URL
    UPTIME_IMPORTER_HTTP_TIMEOUT_SECS  Pingdom request timeout (default: 30)
    UPTIME_IMPORTER_NAMESPACE          CloudWatch namespace (default: PingdomToCloudWatchImporter)
    UPTIME_IMPORTER_START_MINUTES_AGO  Window start (default: 15)
    UPTIME_IMPORTER_END_MINUTES_AGO    Window end (default: 1)
    UPTIME_IMPORTER_MAX_BATCH_SIZE     Datapoints per write call (default: 20)
    UPTIME_IMPORTER_LOG_LEVEL          Log filter (default: info)
"#)]
pub struct Cli {
    /// Settings overrides shared by every subcommand
    #[command(flatten)]
    pub overrides: SettingsArgs,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import the configured window once
    Run,
    /// Import repeatedly on a fixed interval until Ctrl-C
    Watch(watch::WatchArgs),
    /// List checks and whether they are eligible for import
    Checks,
    /// Print the minute buckets the next run would process
    Window,
}

/// Command-line overrides for the environment configuration
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Window start, in minutes before now
    #[arg(long, global = true)]
    pub start_minutes_ago: Option<u32>,

    /// Window end, in minutes before now
    #[arg(long, global = true)]
    pub end_minutes_ago: Option<u32>,

    /// CloudWatch namespace
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    /// Datapoints per write call (1-20)
    #[arg(long, global = true)]
    pub max_batch_size: Option<usize>,
}

impl SettingsArgs {
    /// Apply the overrides on top of `settings`.
    pub fn apply(&self, mut settings: ImportSettings) -> ImportSettings {
        if let Some(start) = self.start_minutes_ago {
            settings.start_minutes_ago = start;
        }
        if let Some(end) = self.end_minutes_ago {
            settings.end_minutes_ago = end;
        }
        if let Some(namespace) = &self.namespace {
            settings.namespace = namespace.clone();
        }
        if let Some(size) = self.max_batch_size {
            settings.max_batch_size = size.clamp(1, crate::batch::MAX_PUT_DATAPOINTS);
        }
        settings
    }
}

/// Load configuration from the environment and apply CLI overrides.
pub fn load_config(overrides: &SettingsArgs) -> ImportConfig {
    let mut config = ImportConfig::from_env();
    config.settings = overrides.apply(config.settings);
    config
}

/// Build an importer wired to Pingdom and CloudWatch.
pub async fn build_importer(config: ImportConfig) -> Result<Importer, anyhow::Error> {
    let source = PingdomClient::new(config.pingdom)?;
    let store = CloudWatchStore::from_env().await;
    Ok(Importer::new(
        Arc::new(source),
        Arc::new(store),
        config.settings,
    ))
}
