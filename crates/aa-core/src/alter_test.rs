use super::*;
use crate::check::CheckKind;
use crate::statement::{MigrationIds, MigrationProc};

#[test]
fn test_parse_minimal_alter() {
    let alter = Alter::from_yaml("alters/001_init.yml", "statements: []").unwrap();
    assert_eq!(alter.id, "001_init.yml");
    assert!(alter.is_all_instances());
    assert!(alter.applies_to("anything"));
    assert!(alter.statements.is_empty());
    assert!(alter.checks.is_empty());
    assert_eq!(alter.checkok, None);
}

#[test]
fn test_parse_full_alter() {
    let yaml = r#"
instances: [app, reporting]
schema: sales
isolation: serializable
checkok: "SELECT 'OK'"
checks:
  - kind: table
    name: customers
  - kind: column
    table: customers
    name: email
    schema: crm
statements:
  - "CREATE TABLE customers (id INTEGER)"
  - sql: "DROP TABLE legacy_customers"
    can_fail: true
  - comment: "backfill follows"
  - migration:
      procedure: backfill
      ids: { from: 1, to: 10, step: 4 }
    can_fail: true
"#;
    let alter = Alter::from_yaml("002_customers.yml", yaml).unwrap();

    assert!(alter.applies_to("app"));
    assert!(alter.applies_to("reporting"));
    assert!(!alter.applies_to("archive"));
    assert_eq!(alter.schema.as_deref(), Some("sales"));
    assert_eq!(alter.isolation, Some(IsolationLevel::Serializable));
    assert_eq!(alter.checkok.as_deref(), Some("SELECT 'OK'"));

    assert_eq!(alter.checks.len(), 2);
    assert_eq!(alter.checks[1].kind, CheckKind::Column);
    assert_eq!(alter.checks[1].table.as_deref(), Some("customers"));
    assert_eq!(alter.checks[1].schema.as_deref(), Some("crm"));

    assert_eq!(alter.statements.len(), 4);
    assert_eq!(
        alter.statements[0],
        AlterStatement::sql("CREATE TABLE customers (id INTEGER)")
    );
    assert!(alter.statements[1].can_fail());
    assert!(!alter.statements[2].is_dispatched());
    match &alter.statements[3] {
        AlterStatement::MigrationProc(proc) => {
            assert!(proc.can_fail);
            assert_eq!(
                proc.ids,
                MigrationIds::Range {
                    from: 1,
                    to: 10,
                    step: 4
                }
            );
            assert_eq!(
                proc.invocations(),
                vec![vec![1, 4], vec![5, 8], vec![9, 10]]
            );
        }
        other => panic!("expected migration statement, got {:?}", other),
    }
}

#[test]
fn test_statement_order_preserved() {
    let yaml = r#"
statements:
  - "SELECT 3"
  - "SELECT 1"
  - "SELECT 2"
"#;
    let alter = Alter::from_yaml("order.yml", yaml).unwrap();
    let rendered: Vec<String> = alter.statements.iter().map(|s| s.to_string()).collect();
    assert_eq!(rendered, vec!["SELECT 3", "SELECT 1", "SELECT 2"]);
}

#[test]
fn test_migration_id_list() {
    let yaml = r#"
statements:
  - migration:
      procedure: fix_rows
      ids: [7, 3, 9]
"#;
    let alter = Alter::from_yaml("list.yml", yaml).unwrap();
    let AlterStatement::MigrationProc(proc) = &alter.statements[0] else {
        panic!("expected migration statement");
    };
    assert!(!proc.can_fail);
    assert_eq!(proc.invocations(), vec![vec![7], vec![3], vec![9]]);
}

#[test]
fn test_zero_step_range_advances_one_id_at_a_time() {
    let proc = MigrationProc {
        procedure: "fix_rows".to_string(),
        ids: MigrationIds::Range {
            from: 1,
            to: 3,
            step: 0,
        },
        can_fail: false,
    };
    assert_eq!(proc.invocations(), vec![vec![1, 1], vec![2, 2], vec![3, 3]]);
}

#[test]
fn test_column_check_without_table_rejected() {
    let yaml = r#"
checks:
  - kind: column
    name: email
"#;
    let err = Alter::from_yaml("bad.yml", yaml).unwrap_err();
    assert!(matches!(err, CoreError::AlterInvalid { .. }));
    assert!(err.to_string().contains("requires a table"));
}

#[test]
fn test_empty_range_rejected() {
    let yaml = r#"
statements:
  - migration:
      procedure: backfill
      ids: { from: 10, to: 1 }
"#;
    let err = Alter::from_yaml("bad.yml", yaml).unwrap_err();
    assert!(err.to_string().contains("statement 1"));
}

#[test]
fn test_unknown_field_rejected() {
    let err = Alter::from_yaml("bad.yml", "statments: []").unwrap_err();
    assert!(matches!(err, CoreError::AlterParseError { .. }));
}

#[test]
fn test_blank_checkok_ignored() {
    let alter = Alter::from_yaml("blank.yml", "checkok: '   '").unwrap();
    assert_eq!(alter.checkok, None);
}

#[test]
fn test_builder_restricts_instances() {
    let alter = Alter::new(AlterId::new("x.yml"), vec![]).for_instances(["app"]);
    assert!(alter.applies_to("app"));
    assert!(!alter.applies_to("other"));
}
