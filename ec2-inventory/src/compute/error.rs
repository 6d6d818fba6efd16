use thiserror::Error;

use crate::error::{MetricLabel, SharedString};

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("EC2 API call failed: {0}")]
    Api(#[from] aws_sdk_ec2::Error),

    #[error("EC2 described an instance without {field}")]
    MissingField { field: &'static str },
}

impl MetricLabel for ComputeError {
    fn slug(&self) -> SharedString {
        "ec2".into()
    }

    fn kind(&self) -> SharedString {
        match self {
            Self::Api(_) => "api".into(),
            Self::MissingField { .. } => "missing_field".into(),
        }
    }
}
