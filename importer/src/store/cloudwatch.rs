//! CloudWatch メトリクスストア

use super::{MetricQuery, MetricStore};
use crate::common::error::{ImportError, ImportResult};
use crate::types::{MetricPoint, MetricUnit};
use async_trait::async_trait;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{MetricDatum, StandardUnit, Statistic};
use aws_sdk_cloudwatch::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

/// CloudWatch クライアントをラップしたストア
#[derive(Clone, Debug)]
pub struct CloudWatchStore {
    client: Client,
}

impl CloudWatchStore {
    /// 既存のクライアントから作成
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 環境（認証情報チェーン・リージョン）から作成
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

fn to_aws_time(time: DateTime<Utc>) -> AwsDateTime {
    AwsDateTime::from_millis(time.timestamp_millis())
}

fn from_aws_time(time: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(time.to_millis().ok()?)
}

fn to_standard_unit(unit: MetricUnit) -> StandardUnit {
    match unit {
        MetricUnit::Percent => StandardUnit::Percent,
        MetricUnit::Milliseconds => StandardUnit::Milliseconds,
    }
}

fn to_datum(point: &MetricPoint) -> MetricDatum {
    MetricDatum::builder()
        .metric_name(&point.series_key)
        .timestamp(to_aws_time(point.timestamp))
        .value(point.value)
        .unit(to_standard_unit(point.unit))
        .build()
}

#[async_trait]
impl MetricStore for CloudWatchStore {
    async fn existing_timestamps(
        &self,
        namespace: &str,
        query: &MetricQuery,
    ) -> ImportResult<Vec<DateTime<Utc>>> {
        let output = self
            .client
            .get_metric_statistics()
            .namespace(namespace)
            .metric_name(&query.series_key)
            .period(query.period_secs)
            .start_time(to_aws_time(query.start_time))
            .end_time(to_aws_time(query.end_time))
            .statistics(Statistic::from(query.statistic))
            .unit(to_standard_unit(query.unit))
            .send()
            .await
            .map_err(|e| {
                ImportError::RemoteCall(format!(
                    "Unable to fetch existing availability data from Cloudwatch: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let timestamps: Vec<DateTime<Utc>> = output
            .datapoints()
            .iter()
            .filter_map(|datapoint| datapoint.timestamp().and_then(from_aws_time))
            .collect();

        debug!(
            series = %query.series_key,
            count = timestamps.len(),
            "Fetched existing datapoints"
        );

        Ok(timestamps)
    }

    async fn put_metric_data(&self, namespace: &str, points: &[MetricPoint]) -> ImportResult<()> {
        let data: Vec<MetricDatum> = points.iter().map(to_datum).collect();

        self.client
            .put_metric_data()
            .namespace(namespace)
            .set_metric_data(Some(data))
            .send()
            .await
            .map_err(|e| {
                ImportError::RemoteCall(format!(
                    "Unable to put data into CloudWatch: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }
}
