use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct InventorySettings {
    /// Tag keys an instance must carry to be reported. The tag values, joined by " - " in this
    /// order, form the record's identifier. Defaults to `["Project", "Environment"]`.
    #[serde(default = "InventorySettings::default_required_tags")]
    pub required_tags: Vec<String>,

    /// Value reported in the service column.
    #[serde(default = "InventorySettings::default_service_label")]
    pub service_label: String,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            required_tags: Self::default_required_tags(),
            service_label: Self::default_service_label(),
        }
    }
}

impl InventorySettings {
    const DEFAULT_REQUIRED_TAGS: [&'static str; 2] = ["Project", "Environment"];
    const DEFAULT_SERVICE_LABEL: &'static str = "EC2";

    pub fn default_required_tags() -> Vec<String> {
        Self::DEFAULT_REQUIRED_TAGS.iter().map(|t| t.to_string()).collect()
    }

    pub fn default_service_label() -> String {
        Self::DEFAULT_SERVICE_LABEL.to_string()
    }
}
