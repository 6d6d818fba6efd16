use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use thiserror::Error;

use crate::error::SettingsError;
use crate::inventory::{InstanceRecord, HEADERS};
use crate::settings::ReportSettings;

const FILE_NAME_TIMESTAMP_FORMAT: &str = "%d-%m-%Y-%H-%M-%S";
const FILE_EXTENSION: &str = "csv";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed writing inventory report: {0}")]
    Io(#[from] io::Error),

    #[error("failed serializing inventory report: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Settings(#[from] SettingsError),
}

/// A report file written to local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub path: PathBuf,
    pub file_name: String,
    pub nr_records: usize,
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    file_prefix: String,
    utc_offset: FixedOffset,
}

impl ReportWriter {
    pub fn from_settings(settings: &ReportSettings) -> Result<Self, ReportError> {
        Ok(Self {
            output_dir: settings.output_dir.clone(),
            file_prefix: settings.file_prefix.clone(),
            utc_offset: settings.utc_offset()?,
        })
    }

    /// Report file name stamped with `now` in the configured offset; e.g.,
    /// "EC2-Inventory-01-02-2023-15-45-00.csv".
    pub fn file_name(&self, now: DateTime<Utc>) -> String {
        let local = now.with_timezone(&self.utc_offset);
        format!(
            "{}-{}.{}",
            self.file_prefix,
            local.format(FILE_NAME_TIMESTAMP_FORMAT),
            FILE_EXTENSION
        )
    }

    /// Writes the header row and one row per record. An empty inventory produces a header-only
    /// file.
    #[tracing::instrument(level = "info", skip(self, records), fields(nr_records=%records.len()))]
    pub fn write(&self, records: &[InstanceRecord], now: DateTime<Utc>) -> Result<ReportFile, ReportError> {
        fs::create_dir_all(&self.output_dir)?;
        let file_name = self.file_name(now);
        let path = self.output_dir.join(file_name.as_str());

        let file = File::create(&path)?;
        write_records(file, records)?;

        tracing::info!(?path, "inventory report written.");
        Ok(ReportFile { path, file_name, nr_records: records.len() })
    }
}

pub fn write_records<W: io::Write>(writer: W, records: &[InstanceRecord]) -> Result<(), ReportError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(HEADERS)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<InstanceRecord>, ReportError> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader.deserialize().collect::<Result<Vec<InstanceRecord>, _>>()?;
    Ok(records)
}
