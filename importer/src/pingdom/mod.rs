//! Pingdom API クライアント
//!
//! チェック一覧と、チェックごとの計測結果を取得する。
//!
//! - 認証: Basic 認証 + `App-Key` ヘッダ
//! - 200 以外のレスポンスはボディ付きの `RemoteCall` エラーに変換する

use crate::common::error::{ImportError, ImportResult};
use crate::config::PingdomConfig;
use crate::types::{Check, CheckResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// チェックと計測結果の取得元
#[async_trait]
pub trait CheckSource: Send + Sync {
    /// チェック一覧を取得
    async fn list_checks(&self) -> ImportResult<Vec<Check>>;

    /// チェックの計測結果を取得（`from`/`to` は epoch 秒、両端を含む）
    async fn fetch_results(&self, check_id: u64, from: i64, to: i64)
        -> ImportResult<Vec<CheckResult>>;
}

#[derive(Debug, Deserialize)]
struct ChecksResponse {
    #[serde(default)]
    checks: Vec<Check>,
}

#[derive(Debug, Deserialize)]
struct ResultsResponse {
    #[serde(default)]
    results: Vec<CheckResult>,
}

/// Pingdom REST API クライアント
#[derive(Clone, Debug)]
pub struct PingdomClient {
    client: Client,
    config: PingdomConfig,
}

impl PingdomClient {
    /// 設定からクライアントを作成
    pub fn new(config: PingdomConfig) -> ImportResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ImportError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, config))
    }

    /// 既存の HTTP クライアントで作成
    pub fn with_client(client: Client, config: PingdomConfig) -> Self {
        Self { client, config }
    }

    async fn invoke<T: DeserializeOwned>(
        &self,
        api_name: &str,
        parameters: &[(&str, String)],
    ) -> ImportResult<T> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            api_name
        );

        let mut request = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("App-Key", &self.config.app_key);
        if !parameters.is_empty() {
            request = request.query(parameters);
        }

        let response = request.send().await.map_err(|e| {
            ImportError::RemoteCall(format!(
                "Unable to invoke Pingdom API '{}': {}",
                api_name, e
            ))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ImportError::RemoteCall(format!(
                "Unable to read Pingdom API '{}' response: {}",
                api_name, e
            ))
        })?;

        if status != StatusCode::OK {
            return Err(ImportError::RemoteCall(format!(
                "Bad response upon invoking Pingdom API '{}': {}",
                api_name, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            ImportError::RemoteCall(format!(
                "Unable to parse Pingdom API '{}' response: {}",
                api_name, e
            ))
        })
    }
}

#[async_trait]
impl CheckSource for PingdomClient {
    async fn list_checks(&self) -> ImportResult<Vec<Check>> {
        let response: ChecksResponse = self.invoke("checks", &[]).await?;
        debug!(count = response.checks.len(), "Listed checks");
        Ok(response.checks)
    }

    async fn fetch_results(
        &self,
        check_id: u64,
        from: i64,
        to: i64,
    ) -> ImportResult<Vec<CheckResult>> {
        let api_name = format!("results/{}", check_id);
        let response: ResultsResponse = self
            .invoke(
                &api_name,
                &[("from", from.to_string()), ("to", to.to_string())],
            )
            .await?;
        Ok(response.results)
    }
}
