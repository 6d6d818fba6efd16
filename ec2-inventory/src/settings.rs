use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

mod aws_settings;
mod inventory_settings;
mod report_settings;
mod storage_settings;
mod telemetry_settings;

pub use aws_settings::*;
pub use inventory_settings::*;
pub use report_settings::*;
pub use storage_settings::*;
pub use telemetry_settings::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Settings {
    #[serde(default)]
    pub aws: AwsSettings,
    #[serde(default)]
    pub inventory: InventorySettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

const ENV_APP_ENVIRONMENT: &str = "APP_ENVIRONMENT";
const ENV_S3_BUCKET: &str = "S3_BUCKET";
const ENV_PREFIX: &str = "APP";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_RESOURCES_DIR: &str = "resources";
const APP_CONFIG: &str = "application";

impl Settings {
    /// Loads settings in layers, each overriding the one before:
    /// `application` config, environment config (per `APP_ENVIRONMENT`), secrets, `APP__`
    /// environment variables and finally command line overrides.
    #[tracing::instrument(level = "info")]
    pub fn load(options: &CliOptions) -> Result<Self, SettingsError> {
        let resources = options.resources_path();
        let config = config::Config::builder()
            .add_source(config::File::from(resources.join(APP_CONFIG)).required(true));
        let config = Self::load_configuration(config, &resources, options)?;
        let config = Self::load_secrets(config, options);
        let config = Self::load_environment(config);
        let config = options.load_overrides(config)?;

        let settings = config.build()?.try_deserialize()?;
        tracing::info!(?settings, "settings loaded.");
        Ok(settings)
    }

    #[tracing::instrument(level = "info", skip(config, options))]
    fn load_configuration(
        config: ConfigBuilder<DefaultState>, resources: &Path, options: &CliOptions,
    ) -> Result<ConfigBuilder<DefaultState>, SettingsError> {
        match &options.config {
            Some(config_path) => {
                tracing::info!("looking for {} config at: {:?}", APP_CONFIG, config_path);
                Ok(config.add_source(config::File::from(config_path.clone()).required(true)))
            },

            None => {
                let environment = match options.environment {
                    Some(env) => env,
                    None => Environment::from_env()?,
                };

                tracing::info!("looking for {} config at: {:?}", environment, resources);
                Ok(config.add_source(config::File::from(resources.join(environment.as_ref())).required(false)))
            },
        }
    }

    #[tracing::instrument(level = "info", skip(config, options))]
    fn load_secrets(config: ConfigBuilder<DefaultState>, options: &CliOptions) -> ConfigBuilder<DefaultState> {
        match &options.secrets {
            Some(secrets_path) => {
                tracing::info!("looking for secrets at: {:?}", secrets_path);
                config.add_source(config::File::from(secrets_path.clone()).required(true))
            },
            None => config,
        }
    }

    #[tracing::instrument(level = "info", skip(config))]
    fn load_environment(config: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        let config_env = config::Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR);
        tracing::info!("loading environment properties with prefix: {:?}", config_env);
        config.add_source(config_env)
    }
}

#[derive(Parser, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[clap(author, version, about)]
pub struct CliOptions {
    /// Configuration file loaded in place of the `local` or `production` file otherwise picked by
    /// `APP_ENVIRONMENT`.
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Optional file layered over configuration, for values kept out of the resources directory.
    #[clap(short, long)]
    pub secrets: Option<PathBuf>,

    /// Environment file to load, taking precedence over `APP_ENVIRONMENT`.
    #[clap(short, long)]
    pub environment: Option<Environment>,

    /// Directory holding `application.ron` and the environment files; `./resources` if not set.
    #[clap(short, long)]
    pub resources: Option<PathBuf>,

    /// Bucket the report is uploaded to, overriding configuration and the `S3_BUCKET` envvar.
    #[clap(short, long)]
    pub bucket: Option<String>,

    /// Directory the report file is written to before upload.
    #[clap(short, long)]
    pub output_dir: Option<PathBuf>,

    /// AWS region to inventory.
    #[clap(long)]
    pub region: Option<String>,
}

impl CliOptions {
    pub fn resources_path(&self) -> PathBuf {
        self.resources
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESOURCES_DIR))
    }

    fn load_overrides(
        &self, config: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, SettingsError> {
        let bucket = self.bucket.clone().or_else(|| std::env::var(ENV_S3_BUCKET).ok());
        let config = match bucket {
            None => config,
            Some(bucket) => config.set_override("storage.bucket", bucket)?,
        };

        let config = match &self.output_dir {
            None => config,
            Some(output_dir) => config.set_override("report.output_dir", output_dir.to_string_lossy().to_string())?,
        };

        let config = match &self.region {
            None => config,
            Some(region) => config.set_override("aws.region", region.clone())?,
        };

        Ok(config)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    fn from_env() -> Result<Self, SettingsError> {
        match std::env::var(ENV_APP_ENVIRONMENT) {
            Ok(rep) => rep.parse(),
            Err(std::env::VarError::NotPresent) => Ok(Self::Local),
            Err(err) => Err(err.into()),
        }
    }
}

impl AsRef<str> for Environment {
    fn as_ref(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl FromStr for Environment {
    type Err = SettingsError;

    fn from_str(rep: &str) -> Result<Self, Self::Err> {
        match rep.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(SettingsError::Bootstrap {
                message: format!("unknown environment \"{other}\""),
                setting: ENV_APP_ENVIRONMENT.to_string(),
            }),
        }
    }
}
