use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use chrono::{DateTime, Utc};

use crate::compute::{ComputeApi, Ec2Context};
use crate::inventory::InventoryBuilder;
use crate::report::ReportWriter;
use crate::settings::{AwsSettings, Settings, StorageSettings};
use crate::storage::{ObjectStore, S3Context};
use crate::telemetry::{CloudWatchContext, MetricFetcher, MetricsApi};
use crate::Result;

/// Result of a successful inventory run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryOutcome {
    pub path: PathBuf,
    pub file_name: String,
    pub bucket: String,
    pub key: String,
    pub nr_records: usize,
    pub nr_skipped: usize,
}

impl fmt::Display for InventoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EC2 Inventory file \"{}\" successfully generated and uploaded to S3 bucket \"{}\"",
            self.file_name, self.bucket
        )
    }
}

/// The extract, transform and load steps of one inventory run.
#[derive(Debug)]
pub struct InventoryJob<C, M, S> {
    inventory: InventoryBuilder<C, M>,
    writer: ReportWriter,
    store: S,
    storage: StorageSettings,
}

pub type AwsInventoryJob = InventoryJob<Ec2Context, CloudWatchContext, S3Context>;

impl AwsInventoryJob {
    #[tracing::instrument(level = "info", name = "make aws inventory job", skip(settings))]
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let sdk_config = load_aws_config(&settings.aws).await;
        tracing::info!(region=?sdk_config.region(), "AWS configuration loaded.");

        let inventory = InventoryBuilder::new(
            Ec2Context::from_conf(&sdk_config),
            MetricFetcher::new(CloudWatchContext::from_conf(&sdk_config), settings.telemetry.clone()),
            settings.inventory.clone(),
        );
        let writer = ReportWriter::from_settings(&settings.report)?;

        Ok(Self::new(
            inventory,
            writer,
            S3Context::from_conf(&sdk_config),
            settings.storage.clone(),
        ))
    }
}

impl<C, M, S> InventoryJob<C, M, S>
where
    C: ComputeApi,
    M: MetricsApi,
    S: ObjectStore,
{
    pub const fn new(
        inventory: InventoryBuilder<C, M>, writer: ReportWriter, store: S, storage: StorageSettings,
    ) -> Self {
        Self { inventory, writer, store, storage }
    }

    /// Collects the inventory as of `now`, writes the report and uploads it. Nothing is uploaded
    /// unless every record was collected and written.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn run(&self, now: DateTime<Utc>) -> Result<InventoryOutcome> {
        let inventory = self
            .inventory
            .collect(now)
            .await
            .context("failed to collect EC2 inventory")?;

        let report = self
            .writer
            .write(&inventory.records, now)
            .context("failed to write inventory report")?;

        let key = self.storage.object_key(report.file_name.as_str());
        self.store
            .upload(report.path.as_path(), self.storage.bucket.as_str(), key.as_str())
            .await
            .with_context(|| format!("failed to upload {} to bucket {}", report.file_name, self.storage.bucket))?;

        Ok(InventoryOutcome {
            path: report.path,
            file_name: report.file_name,
            bucket: self.storage.bucket.clone(),
            key,
            nr_records: report.nr_records,
            nr_skipped: inventory.nr_skipped,
        })
    }
}

/// Resolves SDK configuration through the default provider chain, applying any region, profile
/// or endpoint overrides.
pub async fn load_aws_config(settings: &AwsSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }

    if let Some(endpoint_url) = &settings.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}
