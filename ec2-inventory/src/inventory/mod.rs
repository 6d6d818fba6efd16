use chrono::{DateTime, Utc};
use itertools::Itertools;
use thiserror::Error;

use crate::compute::{ComputeApi, ComputeError, InstanceDescription};
use crate::error::{MetricLabel, SharedString};
use crate::metrics;
use crate::settings::InventorySettings;
use crate::telemetry::{MetricFetcher, MetricsApi, TelemetryError};

mod record;

pub use record::{
    creation_time, deletion_time, iam_role, launch_date, os_version, region_of, InstanceRecord, HEADERS,
    NOT_AVAILABLE,
};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{0}")]
    Compute(#[from] ComputeError),

    #[error("{0}")]
    Telemetry(#[from] TelemetryError),
}

impl MetricLabel for InventoryError {
    fn slug(&self) -> SharedString {
        match self {
            Self::Compute(err) => err.slug(),
            Self::Telemetry(err) => err.slug(),
        }
    }

    fn kind(&self) -> SharedString {
        match self {
            Self::Compute(err) => err.kind(),
            Self::Telemetry(err) => err.kind(),
        }
    }
}

/// Records for the reportable instances, plus how many instances were looked at.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub records: Vec<InstanceRecord>,
    pub nr_listed: usize,
    pub nr_skipped: usize,
}

/// Lists instances, drops those missing a required tag, and maps the rest to report records.
#[derive(Debug)]
pub struct InventoryBuilder<C, M> {
    compute: C,
    metrics: MetricFetcher<M>,
    settings: InventorySettings,
}

impl<C, M> InventoryBuilder<C, M>
where
    C: ComputeApi,
    M: MetricsApi,
{
    pub const fn new(compute: C, metrics: MetricFetcher<M>, settings: InventorySettings) -> Self {
        Self { compute, metrics, settings }
    }

    pub fn is_reportable(&self, instance: &InstanceDescription) -> bool {
        instance.has_tags(self.settings.required_tags.as_slice())
    }

    /// Joins the required tag values in their configured order; e.g., "atlas - prod".
    pub fn identifier_for(&self, instance: &InstanceDescription) -> String {
        self.settings
            .required_tags
            .iter()
            .map(|key| instance.tag(key).unwrap_or_default())
            .join(" - ")
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub async fn collect(&self, now: DateTime<Utc>) -> Result<Inventory, InventoryError> {
        let instances = self.compute.list_instances().await?;
        let nr_listed = instances.len();

        let (reportable, skipped): (Vec<_>, Vec<_>) =
            instances.into_iter().partition(|instance| self.is_reportable(instance));

        if !skipped.is_empty() {
            tracing::info!(
                skipped=?skipped.iter().map(|i| i.instance_id.as_str()).collect::<Vec<_>>(),
                required_tags=?self.settings.required_tags,
                "skipping instances missing required tags."
            );
        }

        let mut records = Vec::with_capacity(reportable.len());
        for instance in reportable.iter() {
            records.push(self.to_record(instance, now).await?);
        }

        metrics::count_instances(metrics::LISTED, nr_listed);
        metrics::count_instances(metrics::SKIPPED, skipped.len());
        metrics::count_instances(metrics::REPORTED, records.len());

        tracing::info!(%nr_listed, nr_skipped=%skipped.len(), nr_records=%records.len(), "inventory collected.");
        Ok(Inventory { records, nr_listed, nr_skipped: skipped.len() })
    }

    #[tracing::instrument(level = "debug", skip(self, instance), fields(instance_id=%instance.instance_id))]
    pub async fn to_record(
        &self, instance: &InstanceDescription, now: DateTime<Utc>,
    ) -> Result<InstanceRecord, InventoryError> {
        let instance_id = instance.instance_id.as_str();
        let disk_usage_gib = self.compute.attached_volume_size_gib(instance_id).await?;
        let cpu_utilization = self.metrics.cpu(instance_id, now).await?;
        let ram_utilization = self.metrics.ram(instance_id, now).await?;

        Ok(InstanceRecord {
            identifier: self.identifier_for(instance),
            service: self.settings.service_label.clone(),
            instance_id: instance.instance_id.clone(),
            region: instance
                .availability_zone
                .as_deref()
                .map(region_of)
                .unwrap_or_default(),
            instance_type: instance.instance_type.clone().unwrap_or_default(),
            launch_time: launch_date(instance.launch_time.as_ref()),
            creation_time: creation_time(instance.root_volume_attach_time.as_ref()),
            deletion_time: deletion_time(
                instance.state.as_deref(),
                instance.state_transition_reason.as_deref(),
            ),
            private_ip_address: instance.private_ip_address.clone().unwrap_or_default(),
            public_ip_address: instance.public_ip_address.clone().unwrap_or_default(),
            os_version: os_version(instance.platform.as_deref(), instance.image_id.as_deref()),
            iam_role: iam_role(instance.iam_instance_profile_arn.as_deref()),
            disk_usage_gib,
            cpu_utilization,
            ram_utilization,
            tags: instance.tags.clone(),
        })
    }
}
