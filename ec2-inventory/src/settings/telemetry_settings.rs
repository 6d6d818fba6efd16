use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};

/// Identifies a CloudWatch metric published per instance under the `InstanceId` dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub namespace: String,
    pub metric_name: String,
}

impl MetricSpec {
    pub fn new(namespace: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), metric_name: metric_name.into() }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct TelemetrySettings {
    /// Trailing window over which utilization is averaged. Defaults to 5 minutes.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "window_secs", default = "TelemetrySettings::default_window")]
    pub window: Duration,

    /// Aggregation period requested from CloudWatch. Defaults to the window length.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "period_secs", default = "TelemetrySettings::default_period")]
    pub period: Duration,

    #[serde(default = "TelemetrySettings::default_cpu")]
    pub cpu: MetricSpec,

    /// Memory is not an EC2 basic metric; it is only present when an agent publishes it.
    #[serde(default = "TelemetrySettings::default_ram")]
    pub ram: MetricSpec,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            window: Self::default_window(),
            period: Self::default_period(),
            cpu: Self::default_cpu(),
            ram: Self::default_ram(),
        }
    }
}

impl TelemetrySettings {
    const DEFAULT_NAMESPACE: &'static str = "AWS/EC2";
    const DEFAULT_CPU_METRIC: &'static str = "CPUUtilization";
    const DEFAULT_RAM_METRIC: &'static str = "MemoryUtilization";
    const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);

    pub const fn default_window() -> Duration {
        Self::DEFAULT_WINDOW
    }

    pub const fn default_period() -> Duration {
        Self::DEFAULT_WINDOW
    }

    pub fn default_cpu() -> MetricSpec {
        MetricSpec::new(Self::DEFAULT_NAMESPACE, Self::DEFAULT_CPU_METRIC)
    }

    pub fn default_ram() -> MetricSpec {
        MetricSpec::new(Self::DEFAULT_NAMESPACE, Self::DEFAULT_RAM_METRIC)
    }
}
