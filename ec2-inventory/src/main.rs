use std::future::Future;

use clap::Parser;
use ec2_inventory::engine::AwsInventoryJob;
use ec2_inventory::settings::{CliOptions, Settings};
use ec2_inventory::{logging, metrics, Result};
use once_cell::sync::Lazy;
use prometheus::Registry;

static METRICS_REGISTRY: Lazy<Registry> = Lazy::new(|| {
    Registry::new_custom(Some("ec2_inventory".to_string()), None).expect("failed to create prometheus registry")
});

fn main() -> Result<()> {
    let subscriber = logging::get_subscriber("ec2_inventory", "info", std::io::stdout);
    logging::init_subscriber(subscriber);

    let main_span = tracing::info_span!("main");
    let _main_span_guard = main_span.enter();

    let options = CliOptions::parse();
    let settings = Settings::load(&options)?;
    metrics::register_metrics(&METRICS_REGISTRY)?;

    start_pipeline(async move {
        let job = AwsInventoryJob::from_settings(&settings).await?;
        let outcome = job.run(chrono::Utc::now()).await;
        log_run_metrics();

        let outcome = outcome?;
        tracing::info!(
            path=?outcome.path, bucket=%outcome.bucket, key=%outcome.key,
            nr_records=%outcome.nr_records, nr_skipped=%outcome.nr_skipped,
            "{outcome}"
        );
        Ok(())
    })
}

fn log_run_metrics() {
    match metrics::render(&METRICS_REGISTRY) {
        Ok(exposition) => tracing::info!(metrics=%exposition, "inventory run metrics."),
        Err(error) => tracing::warn!(?error, "failed to render inventory run metrics."),
    }
}

#[tracing::instrument(level = "trace", skip(future))]
fn start_pipeline<F>(future: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(future)
}
