use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing_futures::Instrument;

use super::{ObjectStore, StorageError, CSV_CONTENT_TYPE};
use crate::metrics;

#[derive(Debug, Clone)]
pub struct S3Context {
    client: Client,
}

impl S3Context {
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }

    async fn do_upload(&self, path: &Path, bucket: &str, key: &str) -> Result<(), StorageError> {
        let _timer = metrics::start_api_call_timer(metrics::PUT_OBJECT);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|err| StorageError::Body {
                path: path.display().to_string(),
                source: err.into(),
            })?;

        let response = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(CSV_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        tracing::info!(e_tag=?response.e_tag(), %bucket, %key, "report uploaded.");
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3Context {
    #[tracing::instrument(level = "info", skip(self))]
    async fn upload(&self, path: &Path, bucket: &str, key: &str) -> Result<(), StorageError> {
        let result = self
            .do_upload(path, bucket, key)
            .instrument(tracing::info_span!("s3::put_object"))
            .await;
        metrics::track_result(metrics::PUT_OBJECT, result, "failed to upload inventory report")
    }
}
