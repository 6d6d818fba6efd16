use std::collections::BTreeMap;

use aws_sdk_ec2::primitives::DateTime as AwsDateTime;
use aws_sdk_ec2::types::Instance;
use chrono::{DateTime, TimeZone, Utc};

use super::ComputeError;

pub type Tags = BTreeMap<String, String>;

/// The parts of an EC2 instance description the inventory reports on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceDescription {
    pub instance_id: String,
    pub availability_zone: Option<String>,
    pub instance_type: Option<String>,
    pub launch_time: Option<DateTime<Utc>>,

    /// Attach time of the root EBS volume, which is attached when the instance is created and
    /// stays attached across stop/start, unlike the launch time.
    pub root_volume_attach_time: Option<DateTime<Utc>>,

    pub state: Option<String>,
    pub state_transition_reason: Option<String>,
    pub private_ip_address: Option<String>,
    pub public_ip_address: Option<String>,
    pub platform: Option<String>,
    pub image_id: Option<String>,
    pub iam_instance_profile_arn: Option<String>,
    pub tags: Tags,
}

impl InstanceDescription {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(|v| v.as_str())
    }

    pub fn has_tags<K: AsRef<str>>(&self, keys: &[K]) -> bool {
        keys.iter().all(|k| self.tags.contains_key(k.as_ref()))
    }
}

impl TryFrom<&Instance> for InstanceDescription {
    type Error = ComputeError;

    fn try_from(instance: &Instance) -> Result<Self, Self::Error> {
        let instance_id = instance
            .instance_id()
            .ok_or(ComputeError::MissingField { field: "instance id" })?
            .to_string();

        let root_volume_attach_time = instance.root_device_name().and_then(|root| {
            instance
                .block_device_mappings()
                .iter()
                .find(|mapping| mapping.device_name() == Some(root))
                .and_then(|mapping| mapping.ebs())
                .and_then(|ebs| ebs.attach_time())
                .and_then(to_utc)
        });

        let tags = instance
            .tags()
            .iter()
            .filter_map(|tag| match (tag.key(), tag.value()) {
                (Some(key), value) => Some((key.to_string(), value.unwrap_or_default().to_string())),
                _ => None,
            })
            .collect();

        Ok(Self {
            instance_id,
            availability_zone: instance
                .placement()
                .and_then(|p| p.availability_zone())
                .map(|az| az.to_string()),
            instance_type: instance.instance_type().map(|t| t.as_str().to_string()),
            launch_time: instance.launch_time().and_then(to_utc),
            root_volume_attach_time,
            state: instance
                .state()
                .and_then(|s| s.name())
                .map(|name| name.as_str().to_string()),
            state_transition_reason: instance.state_transition_reason().map(|r| r.to_string()),
            private_ip_address: instance.private_ip_address().map(|ip| ip.to_string()),
            public_ip_address: instance.public_ip_address().map(|ip| ip.to_string()),
            platform: instance.platform().map(|p| p.as_str().to_string()),
            image_id: instance.image_id().map(|id| id.to_string()),
            iam_instance_profile_arn: instance
                .iam_instance_profile()
                .and_then(|profile| profile.arn())
                .map(|arn| arn.to_string()),
            tags,
        })
    }
}

fn to_utc(timestamp: &AwsDateTime) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp.secs(), timestamp.subsec_nanos()).single()
}
