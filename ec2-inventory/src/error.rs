use std::borrow::Cow;
use std::fmt::Debug;

use thiserror::Error;

pub type SharedString = Cow<'static, str>;

/// Names an error for use as the `error_type` label of the error counters.
pub trait MetricLabel {
    /// The component the error originates from; e.g., "ec2".
    fn slug(&self) -> SharedString;

    /// The error kind within the component; e.g., "api" or "missing_field".
    fn kind(&self) -> SharedString;

    fn label(&self) -> SharedString {
        format!("{}::{}", self.slug(), self.kind()).into()
    }
}

/// Failures resolving settings before a run starts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    /// `APP_ENVIRONMENT` is set but unreadable.
    #[error("{0}")]
    Environment(#[from] std::env::VarError),

    #[error(transparent)]
    Configuration(#[from] config::ConfigError),

    /// A setting is present but cannot be used; e.g., an out of range UTC offset.
    #[error("error during system bootstrap: {message}: {setting}")]
    Bootstrap { message: String, setting: String },
}

impl MetricLabel for SettingsError {
    fn slug(&self) -> SharedString {
        "settings".into()
    }

    fn kind(&self) -> SharedString {
        match self {
            Self::Environment(_) => "environment".into(),
            Self::Configuration(_) => "configuration".into(),
            Self::Bootstrap { .. } => "bootstrap".into(),
        }
    }
}
