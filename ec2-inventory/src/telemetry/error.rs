use thiserror::Error;

use crate::error::{MetricLabel, SharedString};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("CloudWatch API call failed: {0}")]
    Api(#[from] aws_sdk_cloudwatch::Error),

    #[error("invalid metric query: {0}")]
    InvalidQuery(String),
}

impl MetricLabel for TelemetryError {
    fn slug(&self) -> SharedString {
        "cloudwatch".into()
    }

    fn kind(&self) -> SharedString {
        match self {
            Self::Api(_) => "api".into(),
            Self::InvalidQuery(_) => "query".into(),
        }
    }
}
