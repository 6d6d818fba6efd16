use std::time::Duration;

use claim::*;
use ec2_inventory::engine::InventoryJob;
use ec2_inventory::inventory::{InventoryBuilder, HEADERS, NOT_AVAILABLE};
use ec2_inventory::report::{read_records, ReportWriter};
use ec2_inventory::settings::{InventorySettings, ReportSettings, StorageSettings, TelemetrySettings};
use ec2_inventory::telemetry::{Datapoint, MetricFetcher};
use fake::Fake;
use pretty_assertions::assert_eq;

use super::fixtures::*;

fn make_job(
    output_dir: &std::path::Path, compute: FakeCompute, metrics: FakeMetrics, store: FakeStore,
    inventory: InventorySettings,
) -> InventoryJob<FakeCompute, FakeMetrics, FakeStore> {
    let writer = assert_ok!(ReportWriter::from_settings(&ReportSettings {
        output_dir: output_dir.to_path_buf(),
        ..ReportSettings::default()
    }));

    InventoryJob::new(
        InventoryBuilder::new(
            compute,
            MetricFetcher::new(metrics, TelemetrySettings::default()),
            inventory,
        ),
        writer,
        store,
        StorageSettings {
            bucket: "inventory-reports".to_string(),
            key_prefix: "ec2/".to_string(),
        },
    )
}

#[tokio::test]
async fn test_inventory_run_reports_tagged_instances() {
    once_cell::sync::Lazy::force(&ec2_inventory::logging::TEST_TRACING);
    let main_span = tracing::info_span!("test_inventory_run_reports_tagged_instances");
    let _ = main_span.enter();

    let web_disk_gib: u64 = (8..2_000).fake();

    let web = make_instance("i-0web", &[("Project", "atlas"), ("Environment", "prod")]);
    let scratch = make_instance("i-0scratch", &[("Project", "atlas")]);
    let mut legacy = make_instance("i-0legacy", &[("Environment", "prod"), ("Project", "hermes"), ("Name", "legacy,01")]);
    legacy.state = Some("terminated".to_string());
    legacy.state_transition_reason = Some("User initiated (2023-01-31 23:59:59 GMT)".to_string());
    legacy.platform = Some("windows".to_string());
    legacy.public_ip_address = Some("3.110.0.1".to_string());
    legacy.iam_instance_profile_arn = Some("arn:aws:iam::123456789012:instance-profile/web-edge".to_string());
    legacy.root_volume_attach_time = None;

    let compute = FakeCompute::new(vec![web, scratch, legacy])
        .with_volume_size("i-0web", web_disk_gib)
        .with_volume_size("i-0legacy", 30);
    let metrics = FakeMetrics::default()
        .with_datapoints(
            "CPUUtilization",
            "i-0web",
            vec![
                Datapoint {
                    timestamp: Some(*NOW - chrono::Duration::minutes(4)),
                    average: 91.0,
                },
                Datapoint {
                    timestamp: Some(*NOW - chrono::Duration::minutes(1)),
                    average: 37.254,
                },
            ],
        )
        .with_datapoints(
            "MemoryUtilization",
            "i-0web",
            vec![Datapoint { timestamp: Some(*NOW), average: 64.5 }],
        );
    let store = FakeStore::default();

    let dir = assert_ok!(tempfile::tempdir());
    let job = make_job(
        dir.path(),
        compute.clone(),
        metrics.clone(),
        store.clone(),
        InventorySettings::default(),
    );
    let outcome = assert_ok!(job.run(*NOW).await);

    assert_eq!(outcome.file_name, REPORT_FILE_NAME);
    assert_eq!(outcome.key, format!("ec2/{REPORT_FILE_NAME}"));
    assert_eq!(outcome.nr_records, 2);
    assert_eq!(outcome.nr_skipped, 1);

    assert_eq!(compute.looked_up(), vec!["i-0web".to_string(), "i-0legacy".to_string()]);

    let queries = metrics.queries();
    assert_eq!(queries.len(), 4);
    for query in queries.iter() {
        assert_eq!(query.start, *NOW - chrono::Duration::minutes(5));
        assert_eq!(query.end, *NOW);
        assert_eq!(query.period, Duration::from_secs(300));
        assert_eq!(query.spec.namespace, "AWS/EC2");
    }

    let uploads = store.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].bucket, "inventory-reports");
    assert_eq!(uploads[0].key, format!("ec2/{REPORT_FILE_NAME}"));
    assert_eq!(uploads[0].path, outcome.path);
    assert_eq!(assert_some!(uploads[0].body.lines().next()), HEADERS.join(","));

    let records = assert_ok!(read_records(&outcome.path));
    assert_eq!(
        records.iter().map(|r| r.instance_id.as_str()).collect::<Vec<_>>(),
        vec!["i-0web", "i-0legacy"]
    );

    let web = &records[0];
    assert_eq!(web.identifier, "atlas - prod");
    assert_eq!(web.service, "EC2");
    assert_eq!(web.region, "ap-south-1");
    assert_eq!(web.instance_type, "t3.micro");
    assert_eq!(web.launch_time, "15-01-23");
    assert_eq!(web.creation_time, "15-01-23 08:00:00");
    assert_eq!(web.deletion_time, NOT_AVAILABLE);
    assert_eq!(web.public_ip_address, "");
    assert_eq!(web.os_version, "ami-0123456789");
    assert_eq!(web.iam_role, NOT_AVAILABLE);
    assert_eq!(web.disk_usage_gib, web_disk_gib);
    assert_eq!(web.cpu_utilization, 37.25);
    assert_eq!(web.ram_utilization, 64.5);
    assert_eq!(web.tags, make_tags(&[("Project", "atlas"), ("Environment", "prod")]));

    let legacy = &records[1];
    assert_eq!(legacy.identifier, "hermes - prod");
    assert_eq!(legacy.creation_time, NOT_AVAILABLE);
    assert_eq!(legacy.deletion_time, "2023-01-31 23:59:59");
    assert_eq!(legacy.public_ip_address, "3.110.0.1");
    assert_eq!(legacy.os_version, "windows");
    assert_eq!(legacy.iam_role, "web-edge");
    assert_eq!(legacy.disk_usage_gib, 30);
    assert_eq!(legacy.cpu_utilization, 0.0);
    assert_eq!(legacy.ram_utilization, 0.0);
    assert_eq!(assert_some!(legacy.tags.get("Name")), "legacy,01");
}

#[tokio::test]
async fn test_inventory_run_with_no_reportable_instances() {
    once_cell::sync::Lazy::force(&ec2_inventory::logging::TEST_TRACING);
    let main_span = tracing::info_span!("test_inventory_run_with_no_reportable_instances");
    let _ = main_span.enter();

    let compute = FakeCompute::new(vec![
        make_instance("i-0a", &[]),
        make_instance("i-0b", &[("Environment", "dev")]),
    ]);
    let metrics = FakeMetrics::default();
    let store = FakeStore::default();

    let dir = assert_ok!(tempfile::tempdir());
    let job = make_job(
        dir.path(),
        compute.clone(),
        metrics.clone(),
        store.clone(),
        InventorySettings::default(),
    );
    let outcome = assert_ok!(job.run(*NOW).await);
    assert_eq!(outcome.nr_records, 0);
    assert_eq!(outcome.nr_skipped, 2);

    assert!(compute.looked_up().is_empty());
    assert!(metrics.queries().is_empty());

    let uploads = store.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].body.lines().collect::<Vec<_>>(), vec![HEADERS.join(",")]);
}

#[tokio::test]
async fn test_inventory_run_with_configured_tags_and_label() {
    once_cell::sync::Lazy::force(&ec2_inventory::logging::TEST_TRACING);
    let main_span = tracing::info_span!("test_inventory_run_with_configured_tags_and_label");
    let _ = main_span.enter();

    let compute = FakeCompute::new(vec![
        make_instance("i-0a", &[("Owner", "platform"), ("CostCenter", "cc-42")]),
        make_instance("i-0b", &[("Project", "atlas"), ("Environment", "prod")]),
    ]);
    let store = FakeStore::default();

    let dir = assert_ok!(tempfile::tempdir());
    let inventory = InventorySettings {
        required_tags: vec!["Owner".to_string(), "CostCenter".to_string()],
        service_label: "Amazon EC2".to_string(),
    };
    let job = make_job(dir.path(), compute, FakeMetrics::default(), store.clone(), inventory);
    let outcome = assert_ok!(job.run(*NOW).await);
    assert_eq!(outcome.nr_records, 1);

    let records = assert_ok!(read_records(&outcome.path));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].instance_id, "i-0a");
    assert_eq!(records[0].identifier, "platform - cc-42");
    assert_eq!(records[0].service, "Amazon EC2");
    assert_eq!(store.uploads().len(), 1);
}
