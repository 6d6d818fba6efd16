use async_trait::async_trait;
use aws_sdk_ec2::types::Filter;
use aws_sdk_ec2::Client;
use tracing_futures::Instrument;

use super::{ComputeApi, ComputeError, InstanceDescription};
use crate::metrics;

const ATTACHMENT_INSTANCE_ID: &str = "attachment.instance-id";

/// EC2 access for the inventory. Instances and volumes are read with the caller's credentials in
/// the client's region.
#[derive(Debug, Clone)]
pub struct Ec2Context {
    client: Client,
}

impl Ec2Context {
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }

    async fn do_list_instances(&self) -> Result<Vec<InstanceDescription>, ComputeError> {
        let _timer = metrics::start_api_call_timer(metrics::DESCRIBE_INSTANCES);

        let mut pages = self.client.describe_instances().into_paginator().send();
        let mut instances = Vec::new();
        let mut nr_pages = 0_usize;
        while let Some(page) = pages.next().await {
            let page = page.map_err(aws_sdk_ec2::Error::from)?;
            nr_pages += 1;
            for reservation in page.reservations() {
                for instance in reservation.instances() {
                    instances.push(InstanceDescription::try_from(instance)?);
                }
            }
        }

        tracing::info!(nr_instances=%instances.len(), %nr_pages, "EC2 instances described.");
        Ok(instances)
    }

    async fn do_attached_volume_size_gib(&self, instance_id: &str) -> Result<u64, ComputeError> {
        let _timer = metrics::start_api_call_timer(metrics::DESCRIBE_VOLUMES);

        let attached_to = Filter::builder()
            .name(ATTACHMENT_INSTANCE_ID)
            .values(instance_id)
            .build();

        let mut pages = self
            .client
            .describe_volumes()
            .filters(attached_to)
            .into_paginator()
            .send();

        let mut total_gib = 0_u64;
        while let Some(page) = pages.next().await {
            let page = page.map_err(aws_sdk_ec2::Error::from)?;
            total_gib += page
                .volumes()
                .iter()
                .filter_map(|volume| volume.size())
                .map(|size| u64::try_from(size).unwrap_or_default())
                .sum::<u64>();
        }

        tracing::debug!(%instance_id, %total_gib, "attached EBS volume size summed.");
        Ok(total_gib)
    }
}

#[async_trait]
impl ComputeApi for Ec2Context {
    #[tracing::instrument(level = "info", skip(self))]
    async fn list_instances(&self) -> Result<Vec<InstanceDescription>, ComputeError> {
        let result = self
            .do_list_instances()
            .instrument(tracing::info_span!("ec2::describe_instances"))
            .await;
        metrics::track_result(metrics::DESCRIBE_INSTANCES, result, "failed to list EC2 instances")
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn attached_volume_size_gib(&self, instance_id: &str) -> Result<u64, ComputeError> {
        let result = self
            .do_attached_volume_size_gib(instance_id)
            .instrument(tracing::debug_span!("ec2::describe_volumes", %instance_id))
            .await;
        metrics::track_result(
            metrics::DESCRIBE_VOLUMES,
            result,
            "failed to sum attached EBS volume sizes",
        )
    }
}
