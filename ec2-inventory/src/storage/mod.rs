use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{MetricLabel, SharedString};

mod context;

pub use context::S3Context;

pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("S3 API call failed: {0}")]
    Api(#[from] aws_sdk_s3::Error),

    #[error("failed to read report body from {path}: {source}")]
    Body {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl MetricLabel for StorageError {
    fn slug(&self) -> SharedString {
        "s3".into()
    }

    fn kind(&self) -> SharedString {
        match self {
            Self::Api(_) => "api".into(),
            Self::Body { .. } => "body".into(),
        }
    }
}

/// Durable sink for report files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, path: &Path, bucket: &str, key: &str) -> Result<(), StorageError>;
}
