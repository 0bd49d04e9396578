//! Integration tests for the orchestrator: concurrent engine execution,
//! aggregation order, and the audit events bracketing every run.

use std::path::Path;

use tempfile::TempDir;

use axcheck::config::{Config, MEMORY_AUDIT_PATH};
use axcheck::model::{ViolationState, AXIOM_MISSING_TEST, AXIOM_NON_DETERMINISTIC};
use axcheck::Orchestrator;

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn memory_config() -> Config {
    let mut config = Config::default();
    config.global_settings.audit_path = MEMORY_AUDIT_PATH.to_string();
    config
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A fixture repo with a spec document, one untested impl file, and one
/// impl file whose test sleeps.
fn fixture_repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "spec.md", "# spec\n");
    write(dir.path(), "src/foo.py", "def foo(): pass\n");
    write(dir.path(), "src/bar.py", "def bar(): pass\n");
    write(dir.path(), "tests/unit/test_bar.py", "import time\ntime.sleep(1)\n");
    dir
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_file_list_still_writes_both_audit_events() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "spec.md", "# spec\n");

    let orchestrator = Orchestrator::new(&memory_config(), dir.path())
        .await
        .unwrap();
    let report = orchestrator.run(&[]).await.unwrap();

    assert!(report.violations.is_empty());

    let entries = orchestrator.audit().get_entries(10).await.unwrap();
    assert_eq!(entries.len(), 2);
    // Most-recent-first.
    assert_eq!(entries[0].action, "RUN_COMPLETE");
    assert_eq!(entries[0].details["violations_count"], 0);
    assert_eq!(entries[1].action, "RUN_START");
    assert_eq!(entries[1].details["files_count"], 0);
}

#[tokio::test]
async fn run_aggregates_violations_in_engine_order() {
    let dir = fixture_repo();
    let orchestrator = Orchestrator::new(&memory_config(), dir.path())
        .await
        .unwrap();

    let files = vec!["src/bar.py".to_string(), "src/foo.py".to_string()];
    let mut report = orchestrator.run(&files).await.unwrap();

    // Spec engine passes (spec.md exists); test engine emits in input order:
    // bar.py has a sleeping test, foo.py has no test at all.
    assert_eq!(report.violations.len(), 2);
    assert_eq!(report.violations[0].axiom_id, AXIOM_NON_DETERMINISTIC);
    assert_eq!(report.violations[0].file_path, "tests/unit/test_bar.py");
    assert_eq!(report.violations[1].axiom_id, AXIOM_MISSING_TEST);
    assert_eq!(report.violations[1].file_path, "src/foo.py");
    assert!(report
        .violations
        .iter()
        .all(|v| v.state() == ViolationState::New));

    assert_eq!(
        report.generate_summary(),
        "Violations: 2 (New: 2, Resolved: 0)"
    );

    let entries = orchestrator.audit().get_entries(10).await.unwrap();
    assert_eq!(entries[0].details["violations_count"], 2);
    assert_eq!(entries[1].details["files_count"], 2);
}

#[tokio::test]
async fn missing_spec_violation_leads_the_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/foo.py", "def foo(): pass\n");

    let orchestrator = Orchestrator::new(&memory_config(), dir.path())
        .await
        .unwrap();
    let report = orchestrator
        .run(&["src/foo.py".to_string()])
        .await
        .unwrap();

    // Spec engine is instantiated before the test engine, so its violation
    // comes first regardless of which check finished first.
    assert_eq!(report.violations.len(), 2);
    assert_eq!(report.violations[0].file_path, ".");
    assert_eq!(report.violations[1].axiom_id, AXIOM_MISSING_TEST);
}

#[tokio::test]
async fn disabled_engines_contribute_nothing() {
    let dir = fixture_repo();
    let mut config = memory_config();
    config.engines.spec.enabled = false;
    config.engines.test.enabled = false;

    let orchestrator = Orchestrator::new(&config, dir.path()).await.unwrap();
    let report = orchestrator
        .run(&["src/foo.py".to_string()])
        .await
        .unwrap();

    assert!(report.violations.is_empty());
    // The run itself is still audited.
    let entries = orchestrator.audit().get_entries(10).await.unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn repeated_runs_extend_one_verifiable_chain() {
    let dir = fixture_repo();
    let orchestrator = Orchestrator::new(&memory_config(), dir.path())
        .await
        .unwrap();

    for _ in 0..3 {
        orchestrator.run(&["src/foo.py".to_string()]).await.unwrap();
    }

    let entries = orchestrator.audit().get_entries(100).await.unwrap();
    assert_eq!(entries.len(), 6);
    assert!(orchestrator.audit().verify_chain().await.unwrap());
}

#[tokio::test]
async fn engine_checks_run_concurrently_not_sequentially() {
    use async_trait::async_trait;
    use axcheck::audit::AuditLog;
    use axcheck::engines::Engine;
    use axcheck::model::Violation;
    use std::sync::Arc;
    use tokio::sync::Barrier;

    // Each engine parks on a shared barrier inside `check`. The run can only
    // finish if both checks are in flight at the same time; a sequential
    // drive of the engines would deadlock on the first one.
    struct RendezvousEngine {
        barrier: Arc<Barrier>,
    }

    #[async_trait]
    impl Engine for RendezvousEngine {
        fn category(&self) -> &'static str {
            "spec"
        }
        fn should_run(&self) -> bool {
            true
        }
        async fn check(&self, _files: &[String]) -> Vec<Violation> {
            self.barrier.wait().await;
            Vec::new()
        }
    }

    let barrier = Arc::new(Barrier::new(2));
    let engines: Vec<Box<dyn Engine>> = vec![
        Box::new(RendezvousEngine {
            barrier: barrier.clone(),
        }),
        Box::new(RendezvousEngine { barrier }),
    ];

    let dir = tempfile::tempdir().unwrap();
    let audit = AuditLog::open(MEMORY_AUDIT_PATH).await.unwrap();
    let orchestrator = Orchestrator::with_engines(audit, engines, dir.path());

    let report = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        orchestrator.run(&[]),
    )
    .await
    .expect("engine checks were driven sequentially")
    .unwrap();

    assert!(report.violations.is_empty());
    let entries = orchestrator.audit().get_entries(10).await.unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn file_backed_audit_store_is_created_on_demand() {
    let dir = fixture_repo();
    let store_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.global_settings.audit_path = store_dir
        .path()
        .join("nested/audit.sqlite")
        .to_string_lossy()
        .to_string();

    let orchestrator = Orchestrator::new(&config, dir.path()).await.unwrap();
    orchestrator.run(&[]).await.unwrap();

    assert!(store_dir.path().join("nested/audit.sqlite").exists());
    assert!(orchestrator.audit().verify_chain().await.unwrap());
}
