//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to legacy variable names with warning logs, and the importer configuration
//! built on top of them.

use crate::batch::MAX_PUT_DATAPOINTS;
use std::fmt;
use std::time::Duration;

/// Default Pingdom API base URL
pub const DEFAULT_PINGDOM_URL: &str = "https://api.pingdom.com/api/2.0";

/// App key identifying this importer to Pingdom (not confidential)
pub const DEFAULT_PINGDOM_APP_KEY: &str = "pqi5hajhsks159ijde71gktqdq3x16sh";

/// Default CloudWatch namespace
pub const DEFAULT_NAMESPACE: &str = "PingdomToCloudWatchImporter";

/// Default window start (minutes ago)
pub const DEFAULT_START_MINUTES_AGO: u32 = 15;

/// Default window end (minutes ago)
pub const DEFAULT_END_MINUTES_AGO: u32 = 1;

/// Default HTTP timeout for Pingdom calls (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Get an environment variable with fallback to a legacy name
///
/// If the new variable name is set, returns its value.
/// If only the old (legacy) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use uptime_importer::config::get_env_with_fallback;
///
/// let username = get_env_with_fallback("UPTIME_IMPORTER_PINGDOM_USERNAME", "PINGDOM_USERNAME");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable or a default value
pub fn get_env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed to a specific type
///
/// Returns `default` if the variable is unset or parsing fails.
pub fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Pingdom API credentials and connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct PingdomConfig {
    /// API base URL
    pub base_url: String,
    /// Basic auth username
    pub username: String,
    /// Basic auth password
    pub password: String,
    /// `App-Key` header value
    pub app_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl PingdomConfig {
    /// Load Pingdom configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: get_env_or("UPTIME_IMPORTER_PINGDOM_URL", DEFAULT_PINGDOM_URL),
            username: get_env_with_fallback_or(
                "UPTIME_IMPORTER_PINGDOM_USERNAME",
                "PINGDOM_USERNAME",
                "",
            ),
            password: get_env_with_fallback_or(
                "UPTIME_IMPORTER_PINGDOM_PASSWORD",
                "PINGDOM_PASSWORD",
                "",
            ),
            app_key: get_env_or("UPTIME_IMPORTER_PINGDOM_APP_KEY", DEFAULT_PINGDOM_APP_KEY),
            timeout: Duration::from_secs(get_env_parse(
                "UPTIME_IMPORTER_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
        }
    }
}

impl fmt::Debug for PingdomConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PingdomConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("app_key", &self.app_key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Per-run import settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    /// CloudWatch namespace
    pub namespace: String,
    /// Window start (minutes ago)
    pub start_minutes_ago: u32,
    /// Window end (minutes ago)
    pub end_minutes_ago: u32,
    /// Maximum datapoints per write call (1..=20)
    pub max_batch_size: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            start_minutes_ago: DEFAULT_START_MINUTES_AGO,
            end_minutes_ago: DEFAULT_END_MINUTES_AGO,
            max_batch_size: MAX_PUT_DATAPOINTS,
        }
    }
}

impl ImportSettings {
    /// Load import settings from environment variables.
    pub fn from_env() -> Self {
        let max_batch_size = get_env_parse("UPTIME_IMPORTER_MAX_BATCH_SIZE", MAX_PUT_DATAPOINTS);

        Self {
            namespace: get_env_or("UPTIME_IMPORTER_NAMESPACE", DEFAULT_NAMESPACE),
            start_minutes_ago: get_env_parse(
                "UPTIME_IMPORTER_START_MINUTES_AGO",
                DEFAULT_START_MINUTES_AGO,
            ),
            end_minutes_ago: get_env_parse("UPTIME_IMPORTER_END_MINUTES_AGO", DEFAULT_END_MINUTES_AGO),
            max_batch_size: max_batch_size.clamp(1, MAX_PUT_DATAPOINTS),
        }
    }
}

/// Full importer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Pingdom connection settings
    pub pingdom: PingdomConfig,
    /// Run settings
    pub settings: ImportSettings,
}

impl ImportConfig {
    /// Load the full configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            pingdom: PingdomConfig::from_env(),
            settings: ImportSettings::from_env(),
        }
    }
}
