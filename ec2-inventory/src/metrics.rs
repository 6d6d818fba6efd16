use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramOpts, HistogramTimer, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::MetricLabel;
use crate::Result;

pub const DESCRIBE_INSTANCES: &str = "describe_instances";
pub const DESCRIBE_VOLUMES: &str = "describe_volumes";
pub const GET_METRIC_STATISTICS: &str = "get_metric_statistics";
pub const PUT_OBJECT: &str = "put_object";

pub const LISTED: &str = "listed";
pub const SKIPPED: &str = "skipped";
pub const REPORTED: &str = "reported";

#[tracing::instrument(level = "trace")]
pub fn register_metrics(registry: &Registry) -> Result<()> {
    registry.register(Box::new(INVENTORY_INSTANCES.clone()))?;
    registry.register(Box::new(AWS_API_CALL_TIME.clone()))?;
    registry.register(Box::new(AWS_API_ERRORS.clone()))?;
    Ok(())
}

/// Renders the registry in the prometheus text exposition format.
pub fn render(registry: &Registry) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub static INVENTORY_INSTANCES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("inventory_instances", "Number of instances seen by the inventory, by disposition"),
        &["disposition"],
    )
    .expect("failed creating inventory_instances metric")
});

#[inline]
pub fn count_instances(disposition: &str, count: usize) {
    INVENTORY_INSTANCES
        .with_label_values(&[disposition])
        .inc_by(count as u64)
}

pub static AWS_API_CALL_TIME: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("aws_api_call_time", "Time spent calling AWS APIs in seconds")
            .buckets(vec![0.05, 0.1, 0.15, 0.2, 0.3, 0.4, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["action"],
    )
    .expect("failed creating aws_api_call_time metric")
});

#[inline]
pub fn start_api_call_timer(action: &str) -> HistogramTimer {
    AWS_API_CALL_TIME.with_label_values(&[action]).start_timer()
}

pub static AWS_API_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("aws_api_errors", "Number of errors calling AWS APIs"),
        &["action", "error_type"],
    )
    .expect("failed creating aws_api_errors metric")
});

#[inline]
pub fn track_api_errors<E: MetricLabel>(action: &str, error: &E) {
    AWS_API_ERRORS
        .with_label_values(&[action, error.label().as_ref()])
        .inc()
}

#[inline]
pub fn track_result<T, E>(
    action: &str, result: std::result::Result<T, E>, error_message: &str,
) -> std::result::Result<T, E>
where
    E: MetricLabel + std::fmt::Debug,
{
    if let Err(ref err) = result {
        tracing::error!(error=?err, %action, "{}", error_message);
        track_api_errors(action, err);
    }

    result
}
