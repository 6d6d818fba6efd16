use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct StorageSettings {
    /// Destination bucket. The bucket must already exist.
    #[serde(default = "StorageSettings::default_bucket")]
    pub bucket: String,

    /// Prepended to the report file name to form the object key; e.g., "reports/ec2/".
    #[serde(default)]
    pub key_prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            bucket: Self::default_bucket(),
            key_prefix: String::default(),
        }
    }
}

impl StorageSettings {
    const DEFAULT_BUCKET: &'static str = "myinventory";

    pub fn default_bucket() -> String {
        Self::DEFAULT_BUCKET.to_string()
    }

    pub fn object_key(&self, file_name: &str) -> String {
        format!("{}{}", self.key_prefix, file_name)
    }
}
