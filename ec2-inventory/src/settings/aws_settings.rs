use serde::{Deserialize, Serialize};

/// Client configuration shared by the EC2, CloudWatch and S3 clients. Credentials are always
/// resolved through the AWS default provider chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct AwsSettings {
    /// Region to query; e.g., "ap-south-1". If not set, the region is taken from the environment
    /// or the shared AWS config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Named profile in the shared AWS config to use instead of the default profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Override endpoint for all services, as used against local AWS emulators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}
