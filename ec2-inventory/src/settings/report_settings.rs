use std::path::PathBuf;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct ReportSettings {
    /// Directory the report file is written to before upload. Defaults to the system temporary
    /// directory.
    #[serde(default = "ReportSettings::default_output_dir")]
    pub output_dir: PathBuf,

    /// Leading part of the report file name, followed by the report timestamp.
    #[serde(default = "ReportSettings::default_file_prefix")]
    pub file_prefix: String,

    /// Offset from UTC, in minutes, in which the file name timestamp is rendered. Defaults to
    /// +05:30.
    #[serde(default = "ReportSettings::default_utc_offset_mins")]
    pub utc_offset_mins: i32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: Self::default_output_dir(),
            file_prefix: Self::default_file_prefix(),
            utc_offset_mins: Self::default_utc_offset_mins(),
        }
    }
}

impl ReportSettings {
    const DEFAULT_FILE_PREFIX: &'static str = "EC2-Inventory";
    const DEFAULT_UTC_OFFSET_MINS: i32 = 5 * 60 + 30;

    pub fn default_output_dir() -> PathBuf {
        std::env::temp_dir()
    }

    pub fn default_file_prefix() -> String {
        Self::DEFAULT_FILE_PREFIX.to_string()
    }

    pub const fn default_utc_offset_mins() -> i32 {
        Self::DEFAULT_UTC_OFFSET_MINS
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, SettingsError> {
        FixedOffset::east_opt(self.utc_offset_mins * 60).ok_or_else(|| SettingsError::Bootstrap {
            message: format!("{} minutes is not a valid UTC offset", self.utc_offset_mins),
            setting: "report.utc_offset_mins".to_string(),
        })
    }
}
