#![forbid(unsafe_code)]
#![warn(
    clippy::cargo,
    clippy::suspicious,
    // missing_docs,
    clippy::nursery,
    rust_2018_idioms
)]

pub mod compute;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod settings;
pub mod storage;
pub mod telemetry;

pub type Result<T> = anyhow::Result<T>;
