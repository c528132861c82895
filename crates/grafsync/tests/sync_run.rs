mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{git, init_work_tree, DataDir, FakeApi, FakeFactory};
use grafsync::config::RequestTimeouts;
use grafsync::export::StepStatus;
use grafsync::{
    ArtifactLayout, ConfigError, PublishOutcome, PublishReport, SectionStatus, SettingsOverrides,
    SyncError, SyncRunner, SyncSettings,
};
use serde_json::json;
use tempfile::TempDir;

const TWO_SECTIONS: &str = "\
[ops]
uid = ops-folder
host = grafana-ops.local
key = ops-token

[billing]
uid = billing-folder
host = grafana-billing.local
";

fn offline(data: &DataDir) -> SyncSettings {
    let mut settings = SyncSettings::new(data.path());
    settings.publish = false;
    settings
}

#[tokio::test]
async fn test_incomplete_section_does_not_block_others() {
    let data = DataDir::new(TWO_SECTIONS, Some("[requests]\nconnect = 1.5\nread = 20\n"));
    let body = json!({"dashboard": {"uid": "abc", "title": "CPU"}, "meta": {"slug": "cpu"}});
    let factory = Arc::new(
        FakeFactory::default().with_host(
            "grafana-ops.local",
            FakeApi::healthy(7).with_dashboard("abc", "CPU", body.clone()),
        ),
    );

    let report = SyncRunner::new(offline(&data), factory.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.sections.len(), 2);
    let ops = &report.sections[0];
    assert_eq!(ops.section, "ops");
    assert_eq!(ops.status, SectionStatus::Succeeded);

    let billing = &report.sections[1];
    assert_eq!(billing.status, SectionStatus::Skipped);
    assert_eq!(
        billing.skip_reason.as_ref().unwrap().kind,
        "IncompleteCredentials"
    );

    assert_eq!(data.read_json("docs/ops/dashboards/CPU.json"), body);
    assert_eq!(
        data.read_json("datasource/ops/datasource.json"),
        json!([{"id": 1, "name": "Prometheus"}])
    );
    assert_eq!(
        data.read_json("alerts/ops/alerts.json"),
        json!([{"id": 4, "name": "High CPU"}])
    );
    assert!(data.join("docs/billing/dashboards").is_dir());

    let marker = std::fs::read_to_string(data.join("time.txt")).unwrap();
    assert_eq!(marker, report.timestamp);

    // Only the complete section ever gets a client.
    let built = factory.built();
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].0, "grafana-ops.local");
    assert_eq!(
        built[0].1,
        RequestTimeouts {
            connect: Duration::from_millis(1500),
            read: Duration::from_secs(20),
        }
    );

    assert_eq!(report.publish, PublishReport::Disabled);
    assert_eq!(report.exit_code(), 2);
}

#[tokio::test]
async fn test_folder_failure_keeps_other_steps() {
    let data = DataDir::new(
        "[ops]\nuid = ops-folder\nhost = grafana-ops.local\nkey = t\n",
        None,
    );
    let api = FakeApi {
        folder_id: None,
        ..FakeApi::healthy(0)
    };
    let factory = Arc::new(FakeFactory::default().with_host("grafana-ops.local", api));

    let report = SyncRunner::new(offline(&data), factory.clone())
        .run()
        .await
        .unwrap();

    let ops = &report.sections[0];
    assert_eq!(ops.status, SectionStatus::Partial);
    let dashboards = ops.dashboards.as_ref().unwrap();
    assert_eq!(dashboards.status, StepStatus::Failed);
    assert_eq!(dashboards.failures[0].kind, "ReadTimeout");
    assert!(dashboards.failures[0].retryable);
    assert!(data.join("datasource/ops/datasource.json").exists());
    assert!(data.join("alerts/ops/alerts.json").exists());

    let requests = factory.api("grafana-ops.local").requests();
    assert!(!requests.iter().any(|r| r.starts_with("search")));
}

#[tokio::test]
async fn test_missing_base_file_uses_default_timeouts() {
    let data = DataDir::new(
        "[ops]\nuid = ops-folder\nhost = grafana-ops.local\nkey = t\n",
        None,
    );
    let factory = Arc::new(FakeFactory::default().with_host("grafana-ops.local", FakeApi::healthy(1)));

    let report = SyncRunner::new(offline(&data), factory.clone())
        .run()
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(factory.built()[0].1, RequestTimeouts::default());
}

#[tokio::test]
async fn test_missing_sections_file_is_fatal() {
    let data = DataDir::new("", None);
    std::fs::remove_file(data.join("ini/grafana.ini")).unwrap();

    let err = SyncRunner::new(offline(&data), Arc::new(FakeFactory::default()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Config(ConfigError::ConfigMissing { .. })
    ));
    assert!(!data.join("time.txt").exists());
}

#[tokio::test]
async fn test_invalid_timeout_is_fatal() {
    let data = DataDir::new(
        "[ops]\nuid = a\nhost = h\nkey = k\n",
        Some("[requests]\nconnect = soon\n"),
    );

    let err = SyncRunner::new(offline(&data), Arc::new(FakeFactory::default()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
async fn test_shared_layout_from_base_file_and_override() {
    let sections = "[ops]\nuid = a\nhost = grafana-ops.local\nkey = k\n";
    let base = "[export]\nlayout = shared\n";

    let data = DataDir::new(sections, Some(base));
    let factory = Arc::new(FakeFactory::default().with_host("grafana-ops.local", FakeApi::healthy(1)));
    SyncRunner::new(offline(&data), factory).run().await.unwrap();
    assert!(data.join("datasource/datasource.json").exists());
    assert!(data.join("alerts/alerts.json").exists());

    let data = DataDir::new(sections, Some(base));
    let factory = Arc::new(FakeFactory::default().with_host("grafana-ops.local", FakeApi::healthy(1)));
    SyncRunner::new(offline(&data), factory)
        .with_overrides(SettingsOverrides {
            layout: Some(ArtifactLayout::PerSection),
            concurrency: Some(1),
        })
        .run()
        .await
        .unwrap();
    assert!(data.join("datasource/ops/datasource.json").exists());
    assert!(!data.join("datasource/datasource.json").exists());
}

#[tokio::test]
async fn test_layout_failure_skips_only_that_section() {
    let sections = "\
[ops]
uid = a
host = grafana-ops.local
key = k

[billing]
uid = b
host = grafana-billing.local
key = k
";
    let data = DataDir::new(sections, None);
    std::fs::create_dir_all(data.join("docs")).unwrap();
    std::fs::write(data.join("docs/ops"), "not a directory").unwrap();

    let factory = Arc::new(
        FakeFactory::default()
            .with_host("grafana-ops.local", FakeApi::healthy(1))
            .with_host("grafana-billing.local", FakeApi::healthy(2)),
    );

    let report = SyncRunner::new(offline(&data), factory.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.sections[0].status, SectionStatus::Skipped);
    assert_eq!(report.sections[0].skip_reason.as_ref().unwrap().kind, "IoError");
    assert_eq!(report.sections[1].status, SectionStatus::Succeeded);
    assert!(factory.api("grafana-ops.local").requests().is_empty());
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let data = DataDir::new("[ops]\nuid = a\nhost = grafana-ops.local\nkey = k\n", None);

    for _ in 0..2 {
        let factory = Arc::new(FakeFactory::default().with_host(
            "grafana-ops.local",
            FakeApi::healthy(1).with_dashboard("abc", "CPU", json!({"v": 1})),
        ));
        let report = SyncRunner::new(offline(&data), factory).run().await.unwrap();
        assert!(report.is_success());
    }

    assert_eq!(data.read_json("docs/ops/dashboards/CPU.json"), json!({"v": 1}));
}

#[tokio::test]
async fn test_publishes_tracked_changes_to_remote() {
    let work = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();
    init_work_tree(work.path());
    git(remote.path(), &["init", "-q", "--bare"]);

    let data_dir = work.path().join("data");
    std::fs::create_dir_all(data_dir.join("ini")).unwrap();
    std::fs::write(
        data_dir.join("ini/grafana.ini"),
        "[ops]\nuid = a\nhost = grafana-ops.local\nkey = k\n",
    )
    .unwrap();
    std::fs::write(
        data_dir.join("ini/base.ini"),
        format!("[bitbucket]\nhost = {}\n", remote.path().display()),
    )
    .unwrap();
    std::fs::write(data_dir.join("time.txt"), "never").unwrap();
    git(work.path(), &["add", "--all"]);
    git(work.path(), &["commit", "-q", "-m", "init"]);

    let factory = Arc::new(FakeFactory::default().with_host("grafana-ops.local", FakeApi::healthy(1)));
    let report = SyncRunner::new(SyncSettings::new(&data_dir), factory)
        .run()
        .await
        .unwrap();

    let head = git(work.path(), &["rev-parse", "--short", "HEAD"]);
    assert_eq!(
        report.publish,
        PublishReport::Published(PublishOutcome::Pushed { commit: head })
    );
    assert_eq!(
        git(remote.path(), &["log", "-1", "--format=%s", "master"]),
        "Auto commit"
    );

    // New exports are untracked and stay out of the commit.
    let committed = git(work.path(), &["show", "--name-only", "--format=", "HEAD"]);
    assert_eq!(committed, "data/time.txt");
}

#[tokio::test]
async fn test_publish_failure_outside_work_tree() {
    let data = DataDir::new("[ops]\nuid = a\nhost = grafana-ops.local\nkey = k\n", None);
    let factory = Arc::new(FakeFactory::default().with_host("grafana-ops.local", FakeApi::healthy(1)));

    let report = SyncRunner::new(SyncSettings::new(data.path()), factory)
        .run()
        .await
        .unwrap();

    assert!(report.sections.iter().all(|s| s.is_success()));
    match &report.publish {
        PublishReport::Failed(failure) => {
            assert_eq!(failure.kind, "GitNotInitialized");
            assert!(!failure.retryable);
        }
        other => panic!("expected publish failure, got {other:?}"),
    }
    assert_eq!(report.exit_code(), 2);
}
