use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::compute::Tags;

pub const NOT_AVAILABLE: &str = "NA";

/// Report columns, in the order they are written.
pub const HEADERS: [&str; 16] = [
    "Identifier",
    "Service",
    "Instance ID",
    "Region",
    "Instance Type",
    "Launch Time",
    "Creation Time",
    "Deletion Time",
    "Private IP Address",
    "Public IP Address",
    "OS Version",
    "IAM Role",
    "Disk Usage (GiB)",
    "CPU",
    "RAM (GiB)",
    "Tags",
];

const LAUNCH_TIME_FORMAT: &str = "%d-%m-%y";
const CREATION_TIME_FORMAT: &str = "%d-%m-%y %H:%M:%S";

/// One report row. Field order is the column order; serde names are the column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(rename = "Identifier")]
    pub identifier: String,

    #[serde(rename = "Service")]
    pub service: String,

    #[serde(rename = "Instance ID")]
    pub instance_id: String,

    #[serde(rename = "Region")]
    pub region: String,

    #[serde(rename = "Instance Type")]
    pub instance_type: String,

    #[serde(rename = "Launch Time")]
    pub launch_time: String,

    #[serde(rename = "Creation Time")]
    pub creation_time: String,

    #[serde(rename = "Deletion Time")]
    pub deletion_time: String,

    #[serde(rename = "Private IP Address")]
    pub private_ip_address: String,

    #[serde(rename = "Public IP Address")]
    pub public_ip_address: String,

    #[serde(rename = "OS Version")]
    pub os_version: String,

    #[serde(rename = "IAM Role")]
    pub iam_role: String,

    #[serde(rename = "Disk Usage (GiB)")]
    pub disk_usage_gib: u64,

    #[serde(rename = "CPU")]
    pub cpu_utilization: f64,

    #[serde(rename = "RAM (GiB)")]
    pub ram_utilization: f64,

    #[serde(rename = "Tags", with = "tags_json")]
    pub tags: Tags,
}

/// Tags are written as a single JSON object cell.
mod tags_json {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::compute::Tags;

    pub fn serialize<S: Serializer>(tags: &Tags, serializer: S) -> Result<S::Ok, S::Error> {
        let rep = serde_json::to_string(tags).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(rep.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tags, D::Error> {
        let rep = String::deserialize(deserializer)?;
        if rep.is_empty() {
            return Ok(Tags::default());
        }
        serde_json::from_str(rep.as_str()).map_err(de::Error::custom)
    }
}

/// The region is the availability zone without its trailing zone letter; e.g., "ap-south-1a"
/// is in "ap-south-1".
pub fn region_of(availability_zone: &str) -> String {
    let mut region = availability_zone.to_string();
    if region.ends_with(|c: char| c.is_ascii_alphabetic()) {
        region.pop();
    }
    region
}

pub fn launch_date(launch_time: Option<&DateTime<Utc>>) -> String {
    format_or_na(launch_time, LAUNCH_TIME_FORMAT)
}

pub fn creation_time(attach_time: Option<&DateTime<Utc>>) -> String {
    format_or_na(attach_time, CREATION_TIME_FORMAT)
}

fn format_or_na(timestamp: Option<&DateTime<Utc>>, format: &str) -> String {
    timestamp
        .map(|ts| ts.format(format).to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

static TRANSITION_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})").expect("failed to compile transition timestamp regex")
});

const DELETING_STATES: [&str; 2] = ["shutting-down", "terminated"];

/// For an instance being deleted, the timestamp EC2 records in the state transition reason;
/// e.g., "User initiated (2023-02-01 10:15:00 GMT)".
pub fn deletion_time(state: Option<&str>, state_transition_reason: Option<&str>) -> String {
    let reason = match state_transition_reason {
        Some(reason) => reason,
        None => return NOT_AVAILABLE.to_string(),
    };

    let is_deleting = state.map_or(false, |s| DELETING_STATES.contains(&s)) || reason.contains("deleting");
    if !is_deleting {
        return NOT_AVAILABLE.to_string();
    }

    TRANSITION_TIMESTAMP
        .captures(reason)
        .and_then(|caps| caps.get(1))
        .map(|ts| ts.as_str().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// The role name is the path segment after "instance-profile/" in the profile ARN.
pub fn iam_role(instance_profile_arn: Option<&str>) -> String {
    instance_profile_arn
        .and_then(|arn| arn.split('/').nth(1))
        .filter(|name| !name.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

pub fn os_version(platform: Option<&str>, image_id: Option<&str>) -> String {
    platform.or(image_id).unwrap_or_default().to_string()
}
