use async_trait::async_trait;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{Dimension, Statistic};
use aws_sdk_cloudwatch::Client;
use chrono::{DateTime, TimeZone, Utc};
use tracing_futures::Instrument;

use super::{Datapoint, MetricQuery, MetricsApi, TelemetryError};
use crate::metrics;

const INSTANCE_ID_DIMENSION: &str = "InstanceId";

#[derive(Debug, Clone)]
pub struct CloudWatchContext {
    client: Client,
}

impl CloudWatchContext {
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }

    async fn do_average_datapoints(&self, query: &MetricQuery) -> Result<Vec<Datapoint>, TelemetryError> {
        let _timer = metrics::start_api_call_timer(metrics::GET_METRIC_STATISTICS);

        let period = i32::try_from(query.period.as_secs())
            .map_err(|_| TelemetryError::InvalidQuery(format!("period out of range: {:?}", query.period)))?;

        let instance = Dimension::builder()
            .name(INSTANCE_ID_DIMENSION)
            .value(query.instance_id.as_str())
            .build()
            .map_err(|err| TelemetryError::InvalidQuery(err.to_string()))?;

        let response = self
            .client
            .get_metric_statistics()
            .namespace(query.spec.namespace.as_str())
            .metric_name(query.spec.metric_name.as_str())
            .dimensions(instance)
            .start_time(to_aws(&query.start))
            .end_time(to_aws(&query.end))
            .period(period)
            .statistics(Statistic::Average)
            .send()
            .await
            .map_err(aws_sdk_cloudwatch::Error::from)?;

        let datapoints: Vec<Datapoint> = response
            .datapoints()
            .iter()
            .filter_map(|dp| {
                dp.average().map(|average| Datapoint {
                    timestamp: dp.timestamp().and_then(to_utc),
                    average,
                })
            })
            .collect();

        tracing::debug!(?datapoints, "CloudWatch metric statistics received.");
        Ok(datapoints)
    }
}

#[async_trait]
impl MetricsApi for CloudWatchContext {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn average_datapoints(&self, query: &MetricQuery) -> Result<Vec<Datapoint>, TelemetryError> {
        let span = tracing::debug_span!(
            "cloudwatch::get_metric_statistics",
            metric=%query.spec.metric_name, instance_id=%query.instance_id
        );
        let result = self.do_average_datapoints(query).instrument(span).await;
        metrics::track_result(
            metrics::GET_METRIC_STATISTICS,
            result,
            "failed to query CloudWatch metric statistics",
        )
    }
}

fn to_aws(timestamp: &DateTime<Utc>) -> AwsDateTime {
    AwsDateTime::from_millis(timestamp.timestamp_millis())
}

fn to_utc(timestamp: &AwsDateTime) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp.secs(), timestamp.subsec_nanos()).single()
}
