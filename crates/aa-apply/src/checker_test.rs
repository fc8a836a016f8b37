use super::*;
use crate::test_utils::{Event, FakeFleet, RecordingReporter};
use aa_core::{AlterId, AlterStatement, CheckKind, InstanceConfig};

fn alter() -> Alter {
    Alter::new(
        AlterId::new("add_orders.yml"),
        vec![AlterStatement::sql("CREATE TABLE orders (id INT)")],
    )
}

async fn connected(fleet: &FakeFleet) -> DbInstance {
    let mut instance = DbInstance::new(InstanceConfig::duckdb("db1", "crm", ":memory:"));
    instance.connect(fleet).unwrap();
    instance
}

#[tokio::test]
async fn test_checkok_ok_means_applied() {
    let fleet = FakeFleet::new();
    fleet.answer_checkok("db1", "ok");
    let instance = connected(&fleet).await;
    let mut alter = alter();
    alter.checkok = Some("SELECT 'OK'".to_string());
    // A failing structured check must not matter once checkok answered OK.
    alter.checks = vec![Check::new(CheckKind::Table, "orders")];

    let reporter = RecordingReporter::new();
    assert!(already_applied(&alter, &instance, &reporter).await.unwrap());
    assert!(!fleet
        .events()
        .iter()
        .any(|e| matches!(e, Event::Probe { .. })));
    assert!(reporter.contains(ReportLevel::StatementStep, "SELECT 'OK'"));
}

#[tokio::test]
async fn test_checkok_other_answer_falls_through_to_checks() {
    let fleet = FakeFleet::new();
    fleet.answer_checkok("db1", "NOT YET").with_object("db1", "orders");
    let instance = connected(&fleet).await;
    let mut alter = alter();
    alter.checkok = Some("SELECT 'NOT YET'".to_string());
    alter.checks = vec![Check::new(CheckKind::Table, "orders")];

    let reporter = RecordingReporter::new();
    assert!(already_applied(&alter, &instance, &reporter).await.unwrap());
}

#[tokio::test]
async fn test_checkok_without_rows_and_no_checks_is_not_applied() {
    let fleet = FakeFleet::new();
    let instance = connected(&fleet).await;
    let mut alter = alter();
    alter.checkok = Some("SELECT 'OK' WHERE false".to_string());

    let reporter = RecordingReporter::new();
    assert!(!already_applied(&alter, &instance, &reporter).await.unwrap());
}

#[tokio::test]
async fn test_blank_checkok_is_not_queried() {
    let fleet = FakeFleet::new();
    fleet.answer_checkok("db1", "OK");
    let instance = connected(&fleet).await;
    let mut alter = alter();
    alter.checkok = Some("   ".to_string());

    let reporter = RecordingReporter::new();
    assert!(!already_applied(&alter, &instance, &reporter).await.unwrap());
    assert!(!fleet
        .events()
        .iter()
        .any(|e| matches!(e, Event::Query { .. })));
}

#[tokio::test]
async fn test_no_checks_is_not_applied() {
    let fleet = FakeFleet::new();
    let instance = connected(&fleet).await;

    let reporter = RecordingReporter::new();
    assert!(!already_applied(&alter(), &instance, &reporter).await.unwrap());
    assert!(fleet
        .events()
        .iter()
        .all(|e| matches!(e, Event::Connect(_))));
}

#[tokio::test]
async fn test_all_checks_must_find_their_object() {
    let fleet = FakeFleet::new();
    fleet.with_object("db1", "ORDERS");
    let instance = connected(&fleet).await;
    let mut alter = alter();
    alter.checks = vec![
        Check::new(CheckKind::Table, "orders"),
        Check::new(CheckKind::Column, "customer_id").on_table("orders"),
    ];

    let reporter = RecordingReporter::new();
    assert!(!already_applied(&alter, &instance, &reporter).await.unwrap());

    fleet.with_object("db1", "customer_id");
    assert!(already_applied(&alter, &instance, &reporter).await.unwrap());
}

#[tokio::test]
async fn test_probe_is_uppercased_and_uses_instance_schema() {
    let fleet = FakeFleet::new();
    let mut instance = connected(&fleet).await;
    instance.set_schema("sales").await.unwrap();
    let mut alter = alter();
    let mut with_schema = Check::new(CheckKind::Index, "idx_orders").on_table("orders");
    with_schema.schema = Some("audit".to_string());
    alter.checks = vec![Check::new(CheckKind::View, "v_orders"), with_schema];

    let reporter = RecordingReporter::new();
    // Nothing exists, so the first probe settles it.
    assert!(!already_applied(&alter, &instance, &reporter).await.unwrap());
    let probes: Vec<CatalogProbe> = fleet
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Probe { probe, .. } => Some(probe),
            _ => None,
        })
        .collect();
    assert_eq!(
        probes,
        vec![CatalogProbe {
            kind: CheckKind::View,
            schema: "SALES".to_string(),
            table: None,
            name: "V_ORDERS".to_string(),
        }]
    );

    fleet.with_object("db1", "v_orders").with_object("db1", "idx_orders");
    assert!(already_applied(&alter, &instance, &reporter).await.unwrap());
    let last = fleet
        .events()
        .into_iter()
        .rev()
        .find_map(|e| match e {
            Event::Probe { probe, .. } => Some(probe),
            _ => None,
        })
        .unwrap();
    assert_eq!(last.schema, "AUDIT");
    assert_eq!(last.table.as_deref(), Some("ORDERS"));
}

#[tokio::test]
async fn test_probe_failure_is_a_check_error() {
    let fleet = FakeFleet::new();
    fleet.fail_probe("db1");
    let instance = connected(&fleet).await;
    let mut alter = alter();
    alter.checks = vec![Check::new(CheckKind::Sequence, "order_seq")];

    let reporter = RecordingReporter::new();
    let err = already_applied(&alter, &instance, &reporter)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Check { ref alter, ref instance, .. }
            if alter == "add_orders.yml" && instance == "db1"
    ));
}

#[tokio::test]
async fn test_unconnected_instance_is_a_check_error() {
    let instance = DbInstance::new(InstanceConfig::duckdb("db1", "crm", ":memory:"));
    let reporter = RecordingReporter::new();
    let err = already_applied(&alter(), &instance, &reporter)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Check {
            source: DbError::Closed,
            ..
        }
    ));
}
