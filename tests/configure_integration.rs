//! End-to-end runs against scratch unit directories and a recording manager

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::{snapshot, unique_test_dir, Call, RecordingConnector};
use sysdeps::dbus::BusScope;
use sysdeps::{configure, run, Declaration, Error, Process, RunOutcome, SyncOptions};

fn demo_declaration() -> Declaration {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/dependencies.json");
    Declaration::load(&path).unwrap()
}

fn configured(outcome: RunOutcome) -> sysdeps::ConfigureReport {
    match outcome {
        RunOutcome::Configured(report) => report,
        RunOutcome::Cycle(w) => panic!("unexpected cycle {}", w),
    }
}

fn path_str(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_fresh_directory_writes_everything() {
    let dir = unique_test_dir("fresh");
    let options = SyncOptions::new(&dir).with_app_name("demo");
    let decl = Declaration::new(vec![
        Process::new("postgresql", &["docker"]),
        Process::new("app", &["postgresql"]),
    ]);
    let connector = RecordingConnector::new();

    let report = configured(run(&options, &decl, &connector).await.unwrap());

    let names: Vec<&str> = report.changed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["demo.target", "postgresql.service", "app.service"]);
    assert!(report.reloaded);
    assert!(report.pending.is_empty());

    let app = fs::read_to_string(dir.join("app.service.d/dependencies.conf")).unwrap();
    assert!(app.contains("Wants=demo.target postgresql.service\n"));
    assert!(app.contains("After=demo.target postgresql.service\n"));
    assert!(app.contains("PartOf=demo.target\n"));
    assert!(app.contains("WantedBy=demo.target\n"));

    let target = fs::read_to_string(dir.join("demo.target")).unwrap();
    assert!(target.contains("Description=Demo top level service\n"));

    // Base dependencies never get a drop-in
    assert!(!dir.join("docker.service.d").exists());

    assert_eq!(
        connector.calls(),
        vec![
            Call::Connect(BusScope::System),
            Call::Reload,
            Call::Enable {
                files: vec![
                    path_str(dir.join("demo.target")),
                    path_str(dir.join("postgresql.service")),
                    path_str(dir.join("app.service")),
                ],
                runtime: false,
                force: false,
            },
            Call::Close,
        ]
    );
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let dir = unique_test_dir("idempotent");
    let options = SyncOptions::new(&dir).with_app_name("my-test-app");
    let decl = demo_declaration();

    let first = RecordingConnector::new();
    let report = configured(run(&options, &decl, &first).await.unwrap());
    assert_eq!(report.changed.len(), decl.processes.len() + 1);

    let before = snapshot(&dir);
    let second = RecordingConnector::new();
    let report = configured(run(&options, &decl, &second).await.unwrap());

    assert!(report.changed.is_empty());
    assert!(!report.reloaded);
    assert_eq!(snapshot(&dir), before);
    // Connection is opened up front but no calls are made
    assert_eq!(second.calls(), vec![Call::Connect(BusScope::System), Call::Close]);
}

#[tokio::test]
async fn test_only_changed_units_reenabled() {
    let dir = unique_test_dir("partial");
    let options = SyncOptions::new(&dir);
    let mut decl = Declaration::new(vec![
        Process::new("a", &[]),
        Process::new("b", &["a"]),
        Process::new("c", &["b"]),
    ]);
    configure(&options, &decl, &RecordingConnector::new()).await.unwrap();

    decl.processes[2].dependencies.push(String::from("a"));
    let connector = RecordingConnector::new();
    let report = configure(&options, &decl, &connector).await.unwrap();

    assert_eq!(report.changed.len(), 1);
    assert_eq!(report.changed[0].name, "c.service");
    assert!(connector.calls().contains(&Call::Enable {
        files: vec![path_str(dir.join("c.service"))],
        runtime: false,
        force: false,
    }));
}

#[tokio::test]
async fn test_permuted_existing_fragment_unchanged() {
    let dir = unique_test_dir("permuted");
    let options = SyncOptions::new(&dir);
    let decl = Declaration::new(vec![Process::new("app", &["db", "cache"])]);

    let dropin = dir.join("app.service.d/dependencies.conf");
    fs::create_dir_all(dropin.parent().unwrap()).unwrap();
    fs::write(
        &dropin,
        "[Unit]\nWants=cache.service db.service cache.service\nAfter=cache.service db.service\n",
    )
    .unwrap();

    let connector = RecordingConnector::new();
    let report = configure(&options, &decl, &connector).await.unwrap();
    assert!(report.changed.is_empty());
    assert!(!connector.calls().contains(&Call::Reload));
}

#[tokio::test]
async fn test_dry_run_has_no_side_effects() {
    let dir = unique_test_dir("dryrun");
    let unit_dir = dir.join("system");
    let options = SyncOptions::new(&unit_dir).with_dry_run(true);
    let decl = Declaration::new(vec![Process::new("app", &["postgresql"])]);

    let before = snapshot(&dir);
    let connector = RecordingConnector::new();
    let report = configured(run(&options, &decl, &connector).await.unwrap());

    assert_eq!(report.pending.len(), 1);
    assert_eq!(report.pending[0].path, unit_dir.join("app.service.d/dependencies.conf"));
    assert_eq!(
        report.pending[0].content,
        "[Unit]\nWants=postgresql.service\nAfter=postgresql.service\n"
    );
    assert_eq!(report.changed.len(), 1);
    assert!(!report.reloaded);
    assert!(!unit_dir.exists());
    assert_eq!(snapshot(&dir), before);
    assert!(connector.calls().is_empty());
}

#[tokio::test]
async fn test_dry_run_reports_demo_output() {
    let dir = unique_test_dir("demo");
    let options = SyncOptions::new(&dir)
        .with_app_name("my-test-app")
        .with_dry_run(true);
    let connector = RecordingConnector::new();

    let report = configured(run(&options, &demo_declaration(), &connector).await.unwrap());

    assert_eq!(report.pending.len(), 9);
    assert_eq!(report.pending[0].path, dir.join("my-test-app.target"));
    assert_eq!(
        report.pending[0].content,
        "[Unit]\nDescription=My-Test-App top level service\n\n[Install]\nWantedBy=multi-user.target\n"
    );
    assert_eq!(
        report.pending[8].path,
        dir.join("process6.service.d/dependencies.conf")
    );
    assert_eq!(
        report.pending[8].content,
        "[Install]\nWantedBy=my-test-app.target\n\n[Unit]\nPartOf=my-test-app.target\n\
         Wants=my-test-app.target process5.service postgresql-example.service influxdb-example.service\n\
         After=my-test-app.target process5.service postgresql-example.service influxdb-example.service\n"
    );
    assert!(connector.calls().is_empty());
}

#[tokio::test]
async fn test_cycle_touches_nothing() {
    let dir = unique_test_dir("cycle");
    let options = SyncOptions::new(&dir).with_app_name("demo");
    let decl = Declaration::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/cycle.json"))
        .unwrap();
    let connector = RecordingConnector::new();

    let outcome = run(&options, &decl, &connector).await.unwrap();

    let RunOutcome::Cycle(witness) = outcome else {
        panic!("expected a cycle");
    };
    let pair = (witness.start.as_str(), witness.end.as_str());
    assert!(
        pair == ("process2", "process3") || pair == ("process3", "process2"),
        "unexpected witness {:?}",
        pair
    );
    assert!(snapshot(&dir).is_empty());
    assert!(connector.calls().is_empty());
}

#[tokio::test]
async fn test_self_dependency_is_cycle() {
    let dir = unique_test_dir("selfcycle");
    let options = SyncOptions::new(&dir);
    let decl = Declaration::new(vec![Process::new("A", &["A"])]);
    let connector = RecordingConnector::new();

    let outcome = run(&options, &decl, &connector).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Cycle(_)));
    assert!(connector.calls().is_empty());
}

#[tokio::test]
async fn test_write_error_aborts_and_closes_connection() {
    let dir = unique_test_dir("writeerr");
    let options = SyncOptions::new(&dir);
    // A plain file blocks the drop-in directory of the second process
    fs::write(dir.join("b.service.d"), "").unwrap();
    let decl = Declaration::new(vec![
        Process::new("a", &[]),
        Process::new("b", &["a"]),
        Process::new("c", &["b"]),
    ]);
    let connector = RecordingConnector::new();

    let err = configure(&options, &decl, &connector).await.unwrap_err();

    assert!(matches!(err, Error::Sync(_)));
    assert!(dir.join("a.service.d/dependencies.conf").exists());
    assert!(!dir.join("c.service.d").exists());
    assert_eq!(connector.calls(), vec![Call::Connect(BusScope::System), Call::Close]);
}

#[tokio::test]
async fn test_connect_failure_writes_nothing() {
    let dir = unique_test_dir("noconnect");
    let options = SyncOptions::new(&dir);
    let decl = Declaration::new(vec![Process::new("a", &["b"])]);
    let connector = RecordingConnector {
        fail_connect: true,
        ..Default::default()
    };

    let err = configure(&options, &decl, &connector).await.unwrap_err();
    assert!(matches!(err, Error::Manager(_)));
    assert!(snapshot(&dir).is_empty());
}

#[tokio::test]
async fn test_reload_failure_is_fatal() {
    let dir = unique_test_dir("reloaderr");
    let options = SyncOptions::new(&dir);
    let decl = Declaration::new(vec![Process::new("a", &["b"])]);
    let connector = RecordingConnector {
        fail_reload: true,
        ..Default::default()
    };

    let err = configure(&options, &decl, &connector).await.unwrap_err();
    assert!(matches!(err, Error::Manager(_)));
    assert_eq!(
        connector.calls(),
        vec![Call::Connect(BusScope::System), Call::Reload, Call::Close]
    );
}

#[tokio::test]
async fn test_user_scope_connection() {
    let dir = unique_test_dir("user");
    let unit_dir = dir.join(".config/systemd/user");
    let options = SyncOptions::new(&unit_dir);
    let decl = Declaration::new(vec![Process::new("a", &[])]);
    let connector = RecordingConnector::new();

    configure(&options, &decl, &connector).await.unwrap();
    assert_eq!(connector.calls()[0], Call::Connect(BusScope::User));
}

#[tokio::test]
async fn test_stale_dropins_are_kept() {
    let dir = unique_test_dir("stale");
    let options = SyncOptions::new(&dir);
    let decl = Declaration::new(vec![Process::new("a", &[]), Process::new("b", &["a"])]);
    configure(&options, &decl, &RecordingConnector::new()).await.unwrap();

    let decl = Declaration::new(vec![Process::new("a", &[])]);
    configure(&options, &decl, &RecordingConnector::new()).await.unwrap();

    assert!(dir.join("b.service.d/dependencies.conf").exists());
}
