use super::*;
use crate::ledger::LEDGER_TABLE;
use cm_db::DuckDbBackend;
use std::fs;

fn scripts(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn live(env: &str) -> RunContext {
    RunContext::new(env, false).with_user("ops")
}

fn names<'a>(migrations: impl IntoIterator<Item = &'a Migration>) -> Vec<&'a str> {
    migrations.into_iter().map(|m| m.name.as_str()).collect()
}

#[tokio::test]
async fn applies_pending_in_version_order() {
    let dir = scripts(&[
        ("202001010000_second.all.cql", "CREATE TABLE b (id INT);"),
        ("201901010000_first.all.cql", "CREATE TABLE a (id INT);"),
        ("README.md", "not a script"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = live("local");

    let report = Migrator::new(&db, &ctx).migrate(dir.path()).await.unwrap();
    assert!(report.is_success());
    assert_eq!(names(&report.applied), vec!["first", "second"]);
    assert!(db.relation_exists("a").await.unwrap());
    assert!(db.relation_exists("b").await.unwrap());
}

#[tokio::test]
async fn second_run_applies_nothing() {
    let dir = scripts(&[("201901010000_first.all.cql", "CREATE TABLE a (id INT);")]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = live("local");
    let migrator = Migrator::new(&db, &ctx);

    migrator.migrate(dir.path()).await.unwrap();
    let report = migrator.migrate(dir.path()).await.unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(report.plan.count(PlanStatus::AlreadyApplied), 1);
}

#[tokio::test]
async fn environment_scoping_skips_other_environments() {
    let dir = scripts(&[
        ("201901010000_shared.all.cql", "CREATE TABLE shared (id INT);"),
        ("201902010000_seed.dev.cql", "CREATE TABLE dev_only (id INT);"),
        ("201903010000_tune.prod.cql", "CREATE TABLE prod_only (id INT);"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = live("dev");

    let report = Migrator::new(&db, &ctx).migrate(dir.path()).await.unwrap();
    assert_eq!(names(&report.applied), vec!["shared", "seed"]);
    assert_eq!(
        names(report.plan.with_status(PlanStatus::SkippedEnvironment)),
        vec!["tune"]
    );
    assert!(!db.relation_exists("prod_only").await.unwrap());
}

#[tokio::test]
async fn dry_run_touches_nothing() {
    let dir = scripts(&[("201901010000_first.all.cql", "CREATE TABLE a (id INT);")]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = RunContext::new("local", true);

    let report = Migrator::new(&db, &ctx).migrate(dir.path()).await.unwrap();
    assert!(report.dry_run);
    assert!(report.applied.is_empty());
    assert_eq!(names(report.would_apply()), vec!["first"]);
    assert!(!db.relation_exists(LEDGER_TABLE).await.unwrap());
    assert!(!db.relation_exists("a").await.unwrap());
}

#[tokio::test]
async fn scan_errors_abort_before_applying() {
    let dir = scripts(&[
        ("201901010000_first.all.cql", "CREATE TABLE a (id INT);"),
        ("bad_name.cql", "CREATE TABLE b (id INT);"),
        ("2019_short.all.cql", "CREATE TABLE c (id INT);"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = live("local");

    let err = Migrator::new(&db, &ctx).migrate(dir.path()).await.unwrap_err();
    match err {
        EngineError::Scan(errors) => assert_eq!(errors.len(), 2),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!db.relation_exists("a").await.unwrap());
}

#[tokio::test]
async fn failed_statement_halts_batch_after_recording() {
    let dir = scripts(&[
        ("201901010000_first.all.cql", "CREATE TABLE a (id INT);"),
        ("201902010000_broken.all.cql", "INSERT INTO nowhere VALUES (1);"),
        ("201903010000_third.all.cql", "CREATE TABLE c (id INT);"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = live("local");

    let report = Migrator::new(&db, &ctx).migrate(dir.path()).await.unwrap();
    assert!(!report.is_success());
    assert_eq!(names(&report.applied), vec!["first"]);
    assert!(!db.relation_exists("c").await.unwrap());

    let applied = list_applied(&db).await.unwrap();
    assert_eq!(names(&applied), vec!["first", "broken"]);

    let err = report.into_result().unwrap_err();
    assert!(matches!(err, EngineError::Statements { ref name, .. } if name == "broken"));
}

#[tokio::test]
async fn block_comment_halts_batch_without_recording() {
    let dir = scripts(&[
        ("201901010000_commented.all.cql", "/* nope */ CREATE TABLE a (id INT);"),
        ("201902010000_after.all.cql", "CREATE TABLE b (id INT);"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = live("local");

    let report = Migrator::new(&db, &ctx).migrate(dir.path()).await.unwrap();
    assert!(matches!(report.halted, Some(EngineError::Split { .. })));
    assert!(report.applied.is_empty());
    assert!(list_applied(&db).await.unwrap().is_empty());
    assert!(!db.relation_exists("b").await.unwrap());
}

#[tokio::test]
async fn status_reports_plan_and_scan_errors_without_ledger() {
    let dir = scripts(&[
        ("201901010000_first.all.cql", "CREATE TABLE a (id INT);"),
        ("garbage.cql", ""),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = live("local");

    let status = Migrator::new(&db, &ctx).status(dir.path()).await.unwrap();
    assert_eq!(names(status.plan.pending()), vec!["first"]);
    assert_eq!(status.errors.len(), 1);
    assert!(!db.relation_exists(LEDGER_TABLE).await.unwrap());
}

#[tokio::test]
async fn missing_scripts_dir_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = live("local");

    let err = Migrator::new(&db, &ctx)
        .migrate(&dir.path().join("absent"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Core(CoreError::ScriptsDir { .. })));
}

async fn row_count(db: &DuckDbBackend, table: &str) -> usize {
    db.query_rows(&format!("SELECT * FROM {table}"))
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn shared_name_and_version_aborts_before_anything_runs() {
    let dir = scripts(&[
        ("201801010000_events.all.cql", "CREATE TABLE events (id INT);"),
        ("201901010000_seed.all.cql", "INSERT INTO events VALUES (1);"),
        ("201901010000_seed.dev.cql", "INSERT INTO events VALUES (2);"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = live("dev");
    let migrator = Migrator::new(&db, &ctx);

    for _ in 0..3 {
        let err = migrator.migrate(dir.path()).await.unwrap_err();
        match err {
            EngineError::LedgerKeyConflict {
                name,
                version,
                environment,
                ..
            } => {
                assert_eq!(name, "seed");
                assert_eq!(version, "201901010000");
                assert_eq!(environment, "dev");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    assert!(!db.relation_exists("events").await.unwrap());
    assert!(list_applied(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn pending_script_reusing_an_applied_key_is_rejected() {
    let dir = scripts(&[
        ("201801010000_events.all.cql", "CREATE TABLE events (id INT);"),
        ("201901010000_seed.all.cql", "INSERT INTO events VALUES (1);"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    let local = live("local");
    Migrator::new(&db, &local).migrate(dir.path()).await.unwrap();

    fs::write(
        dir.path().join("201901010000_seed.dev.cql"),
        "INSERT INTO events VALUES (2);",
    )
    .unwrap();
    let dev = live("dev");
    let err = Migrator::new(&db, &dev).migrate(dir.path()).await.unwrap_err();
    assert!(matches!(err, EngineError::LedgerKeyConflict { ref name, .. } if name == "seed"));
    assert!(err.to_string().contains("[G012]"));

    assert_eq!(row_count(&db, "events").await, 1);
    assert_eq!(list_applied(&db).await.unwrap().len(), 2);
}

#[tokio::test]
async fn shared_key_in_a_skipped_environment_is_not_a_conflict() {
    let dir = scripts(&[
        ("201801010000_events.all.cql", "CREATE TABLE events (id INT);"),
        ("201901010000_seed.all.cql", "INSERT INTO events VALUES (1);"),
        ("201901010000_seed.dev.cql", "INSERT INTO events VALUES (2);"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = live("local");

    let report = Migrator::new(&db, &ctx).migrate(dir.path()).await.unwrap();
    assert!(report.is_success());
    assert_eq!(names(&report.applied), vec!["events", "seed"]);
    assert_eq!(row_count(&db, "events").await, 1);
}

#[tokio::test]
async fn dry_run_reports_ledger_key_conflicts() {
    let dir = scripts(&[
        ("201901010000_seed.all.cql", "CREATE TABLE a (id INT);"),
        ("201901010000_seed.dev.cql", "CREATE TABLE b (id INT);"),
    ]);
    let db = DuckDbBackend::in_memory().unwrap();
    let ctx = RunContext::new("dev", true);

    let err = Migrator::new(&db, &ctx).migrate(dir.path()).await.unwrap_err();
    assert!(matches!(err, EngineError::LedgerKeyConflict { .. }));
    assert!(!db.relation_exists(LEDGER_TABLE).await.unwrap());
}
