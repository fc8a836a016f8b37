//! Integration tests for the applyalter binary
//!
//! Each test writes a fleet configuration and alter scripts into a temporary
//! directory and runs the compiled binary against DuckDB database files.

use aa_db::{Database, DuckDbBackend};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Path to the compiled applyalter binary
fn applyalter_bin() -> String {
    env!("CARGO_BIN_EXE_applyalter").to_string()
}

/// Run `applyalter` and return (stdout, stderr, exit code).
fn run_applyalter(args: &[&str]) -> (String, String, Option<i32>) {
    let output = Command::new(applyalter_bin())
        .args(args)
        .env("USER", "ci")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute applyalter with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code(),
    )
}

struct Fixture {
    dir: TempDir,
    db: PathBuf,
}

impl Fixture {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("crm.duckdb");
        let backend = DuckDbBackend::from_path(&db).unwrap();
        backend
            .execute("CREATE TABLE applyalter_log (username VARCHAR, id VARCHAR, duration BIGINT)")
            .await
            .unwrap();
        backend.commit().await.unwrap();
        backend.close().await.unwrap();

        std::fs::write(
            dir.path().join("dbconfig.yml"),
            format!(
                "instances:\n  - id: crm1\n    type: crm\n    engine: duckdb\n    path: '{}'\n",
                db.display()
            ),
        )
        .unwrap();
        Self { dir, db }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn write_alter(&self, name: &str, content: &str) -> String {
        std::fs::write(self.dir.path().join(name), content).unwrap();
        self.path(name)
    }

    async fn query(&self, sql: &str) -> Option<String> {
        query(&self.db, sql).await
    }
}

async fn query(path: &Path, sql: &str) -> Option<String> {
    let db = DuckDbBackend::from_path(path).unwrap();
    let value = db.query_first(sql).await.unwrap();
    db.close().await.unwrap();
    value
}

const ORDERS_ALTER: &str = r#"
instances: [crm]
checks:
  - kind: table
    name: orders
statements:
  - CREATE TABLE orders (id INTEGER)
"#;

#[tokio::test]
async fn test_validate_reports_counts() {
    let fx = Fixture::new().await;
    let alter = fx.write_alter("001_orders.yml", ORDERS_ALTER);

    let (stdout, stderr, code) = run_applyalter(&["validate", &fx.path("dbconfig.yml"), &alter]);

    assert_eq!(code, Some(0), "stderr: {}", stderr);
    assert!(stdout.contains("1 alterscripts valid for 1 database instances"));
}

#[tokio::test]
async fn test_validate_rejects_unknown_instance_type() {
    let fx = Fixture::new().await;
    let alter = fx.write_alter("001_orders.yml", "instances: [billing]\nstatements:\n  - SELECT 1\n");

    let (_, stderr, code) = run_applyalter(&["validate", &fx.path("dbconfig.yml"), &alter]);

    assert_eq!(code, Some(1));
    assert!(stderr.contains("[A001] Unknown database type 'billing'"));
}

#[tokio::test]
async fn test_apply_print_mode_changes_nothing() {
    let fx = Fixture::new().await;
    let alter = fx.write_alter("001_orders.yml", ORDERS_ALTER);

    let (stdout, stderr, code) =
        run_applyalter(&["apply", "-r", "print", &fx.path("dbconfig.yml"), &alter]);

    assert_eq!(code, Some(0), "stderr: {}", stderr);
    assert!(stdout.contains("CREATE TABLE orders (id INTEGER)"));
    assert_eq!(
        fx.query("SELECT count(*) FROM applyalter_log").await.as_deref(),
        Some("0")
    );
}

#[tokio::test]
async fn test_apply_records_user_in_audit_log() {
    let fx = Fixture::new().await;
    let alter = fx.write_alter("001_orders.yml", ORDERS_ALTER);

    let (stdout, stderr, code) =
        run_applyalter(&["apply", "-u", "ops", &fx.path("dbconfig.yml"), &alter]);

    assert_eq!(code, Some(0), "stderr: {}", stderr);
    assert!(stdout.contains("Alter 001_orders.yml on crm1 took"));
    assert_eq!(
        fx.query("SELECT concat(username, ':', id) FROM applyalter_log")
            .await
            .as_deref(),
        Some("ops:001_orders.yml")
    );

    // A second run finds the table and skips.
    let (stdout, _, code) = run_applyalter(&["apply", &fx.path("dbconfig.yml"), &alter]);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("Alter already applied, skipping"));
    assert_eq!(
        fx.query("SELECT count(*) FROM applyalter_log").await.as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn test_apply_failure_exits_with_one() {
    let fx = Fixture::new().await;
    let alter = fx.write_alter(
        "002_broken.yml",
        "statements:\n  - INSERT INTO no_such_table VALUES (1)\n",
    );

    let (_, stderr, code) = run_applyalter(&["apply", &fx.path("dbconfig.yml"), &alter]);

    assert_eq!(code, Some(1));
    assert!(stderr.contains("[A005] Alter 002_broken.yml failed on instance crm1"));
    assert!(stderr.contains("no_such_table"));
}

#[tokio::test]
async fn test_apply_missing_config() {
    let fx = Fixture::new().await;
    let alter = fx.write_alter("001_orders.yml", ORDERS_ALTER);

    let (_, stderr, code) = run_applyalter(&["apply", &fx.path("nope.yml"), &alter]);

    assert_eq!(code, Some(1));
    assert!(stderr.contains("Failed to load instance configuration"));
}
