use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::settings::{MetricSpec, TelemetrySettings};

mod context;
mod error;

pub use context::CloudWatchContext;
pub use error::TelemetryError;

/// Request for the `Average` statistic of one metric for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub spec: MetricSpec,
    pub instance_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datapoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub average: f64,
}

/// Time-series metrics source.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsApi: Send + Sync {
    async fn average_datapoints(&self, query: &MetricQuery) -> Result<Vec<Datapoint>, TelemetryError>;
}

/// Looks up trailing utilization averages per instance.
#[derive(Debug, Clone)]
pub struct MetricFetcher<M> {
    api: M,
    settings: TelemetrySettings,
}

impl<M: MetricsApi> MetricFetcher<M> {
    pub const fn new(api: M, settings: TelemetrySettings) -> Self {
        Self { api, settings }
    }

    pub fn query_for(&self, instance_id: &str, spec: &MetricSpec, now: DateTime<Utc>) -> MetricQuery {
        let window = chrono::Duration::from_std(self.settings.window).unwrap_or_else(|_| chrono::Duration::minutes(5));
        MetricQuery {
            spec: spec.clone(),
            instance_id: instance_id.to_string(),
            start: now - window,
            end: now,
            period: self.settings.period,
        }
    }

    /// Average of the most recent datapoint in the trailing window, rounded to two decimals.
    /// An instance with no datapoints in the window reports 0.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn utilization(
        &self, instance_id: &str, spec: &MetricSpec, now: DateTime<Utc>,
    ) -> Result<f64, TelemetryError> {
        let query = self.query_for(instance_id, spec, now);
        let datapoints = self.api.average_datapoints(&query).await?;
        Ok(latest_average(&datapoints))
    }

    pub async fn cpu(&self, instance_id: &str, now: DateTime<Utc>) -> Result<f64, TelemetryError> {
        self.utilization(instance_id, &self.settings.cpu, now).await
    }

    pub async fn ram(&self, instance_id: &str, now: DateTime<Utc>) -> Result<f64, TelemetryError> {
        self.utilization(instance_id, &self.settings.ram, now).await
    }
}

pub fn latest_average(datapoints: &[Datapoint]) -> f64 {
    datapoints
        .iter()
        .max_by_key(|dp| dp.timestamp)
        .map(|dp| round_to_hundredths(dp.average))
        .unwrap_or_default()
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
