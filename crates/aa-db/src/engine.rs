//! Engine-specific SQL and connection URLs.
//!
//! Each [`Engine`] variant decides how its URL looks, whether it supports
//! schemas and isolation levels, and how catalog probes and procedure calls
//! are spelled. Backends build their SQL from here.

use aa_core::{CheckKind, Engine, InstanceConfig, IsolationLevel};

/// Fixed audit table every successfully applied alter is recorded in.
pub const AUDIT_TABLE: &str = "applyalter_log";

/// Per-engine SQL dialect.
pub trait EngineDialect {
    /// Connection URL shown in reports (never includes the password)
    fn url(self, instance: &InstanceConfig) -> String;

    /// Schema used by checks when nothing else names one
    fn default_schema(self, instance: &InstanceConfig) -> Option<String>;

    /// Statement switching the current schema; `None` if unsupported
    fn set_schema_sql(self, schema: &str) -> Option<String>;

    /// Statement setting the isolation level; `None` if unsupported
    fn isolation_sql(self, level: IsolationLevel) -> Option<String>;

    /// Existence query for a catalog object, `None` if the engine has no such object.
    ///
    /// Placeholders bind schema, table (for kinds that require one), then name.
    fn catalog_probe_sql(self, kind: CheckKind) -> Option<&'static str>;

    /// Statement invoking a migration procedure
    fn procedure_call_sql(self, name: &str, args: &[i64]) -> String;

    /// Parameterised insert into the audit table (username, id, duration)
    fn audit_insert_sql(self) -> String;
}

impl EngineDialect for Engine {
    fn url(self, instance: &InstanceConfig) -> String {
        match self {
            Engine::DuckDb => format!("duckdb:{}", instance.path.as_deref().unwrap_or(":memory:")),
            Engine::Postgres => network_url("postgresql", instance),
            Engine::MySql => network_url("mysql", instance),
        }
    }

    fn default_schema(self, instance: &InstanceConfig) -> Option<String> {
        if let Some(schema) = &instance.schema {
            return Some(schema.clone());
        }
        match self {
            Engine::DuckDb => Some("main".to_string()),
            Engine::Postgres => Some("public".to_string()),
            // MySQL schemas are databases
            Engine::MySql => instance.database.clone(),
        }
    }

    fn set_schema_sql(self, schema: &str) -> Option<String> {
        match self {
            Engine::DuckDb => Some(format!("SET schema = '{}'", escape_literal(schema))),
            Engine::Postgres => Some(format!("SET search_path TO {}", quote_ident(schema))),
            Engine::MySql => None,
        }
    }

    fn isolation_sql(self, level: IsolationLevel) -> Option<String> {
        match self {
            // DuckDB only offers snapshot isolation
            Engine::DuckDb => None,
            Engine::Postgres => Some(format!(
                "SET SESSION CHARACTERISTICS AS TRANSACTION ISOLATION LEVEL {}",
                level.as_sql()
            )),
            Engine::MySql => Some(format!(
                "SET SESSION TRANSACTION ISOLATION LEVEL {}",
                level.as_sql()
            )),
        }
    }

    fn catalog_probe_sql(self, kind: CheckKind) -> Option<&'static str> {
        match (self, kind) {
            (Engine::DuckDb, CheckKind::Table) => Some(
                "SELECT 1 FROM information_schema.tables WHERE upper(table_schema) = ? AND upper(table_name) = ? AND table_type = 'BASE TABLE'",
            ),
            (Engine::DuckDb, CheckKind::View) => Some(
                "SELECT 1 FROM information_schema.tables WHERE upper(table_schema) = ? AND upper(table_name) = ? AND table_type = 'VIEW'",
            ),
            (Engine::DuckDb, CheckKind::Column) => Some(
                "SELECT 1 FROM information_schema.columns WHERE upper(table_schema) = ? AND upper(table_name) = ? AND upper(column_name) = ?",
            ),
            (Engine::DuckDb, CheckKind::Index) => Some(
                "SELECT 1 FROM duckdb_indexes() WHERE upper(schema_name) = ? AND upper(table_name) = ? AND upper(index_name) = ?",
            ),
            (Engine::DuckDb, CheckKind::Sequence) => Some(
                "SELECT 1 FROM duckdb_sequences() WHERE upper(schema_name) = ? AND upper(sequence_name) = ?",
            ),
            (Engine::Postgres, CheckKind::Table) => Some(
                "SELECT 1 FROM information_schema.tables WHERE upper(table_schema) = $1 AND upper(table_name) = $2 AND table_type = 'BASE TABLE'",
            ),
            (Engine::Postgres, CheckKind::View) => Some(
                "SELECT 1 FROM information_schema.views WHERE upper(table_schema) = $1 AND upper(table_name) = $2",
            ),
            (Engine::Postgres, CheckKind::Column) => Some(
                "SELECT 1 FROM information_schema.columns WHERE upper(table_schema) = $1 AND upper(table_name) = $2 AND upper(column_name) = $3",
            ),
            (Engine::Postgres, CheckKind::Index) => Some(
                "SELECT 1 FROM pg_indexes WHERE upper(schemaname) = $1 AND upper(tablename) = $2 AND upper(indexname) = $3",
            ),
            (Engine::Postgres, CheckKind::Sequence) => Some(
                "SELECT 1 FROM information_schema.sequences WHERE upper(sequence_schema) = $1 AND upper(sequence_name) = $2",
            ),
            (Engine::MySql, CheckKind::Table) => Some(
                "SELECT 1 FROM information_schema.tables WHERE upper(table_schema) = ? AND upper(table_name) = ? AND table_type = 'BASE TABLE'",
            ),
            (Engine::MySql, CheckKind::View) => Some(
                "SELECT 1 FROM information_schema.views WHERE upper(table_schema) = ? AND upper(table_name) = ?",
            ),
            (Engine::MySql, CheckKind::Column) => Some(
                "SELECT 1 FROM information_schema.columns WHERE upper(table_schema) = ? AND upper(table_name) = ? AND upper(column_name) = ?",
            ),
            (Engine::MySql, CheckKind::Index) => Some(
                "SELECT 1 FROM information_schema.statistics WHERE upper(table_schema) = ? AND upper(table_name) = ? AND upper(index_name) = ?",
            ),
            (Engine::MySql, CheckKind::Sequence) => None,
        }
    }

    fn procedure_call_sql(self, name: &str, args: &[i64]) -> String {
        let args = args
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        match self {
            // DuckDB has no stored procedures; migration procs are macros
            Engine::DuckDb => format!("SELECT {}({})", name, args),
            Engine::Postgres | Engine::MySql => format!("CALL {}({})", name, args),
        }
    }

    fn audit_insert_sql(self) -> String {
        match self {
            Engine::DuckDb => format!(
                "INSERT INTO main.{} (username, id, duration) VALUES (?, ?, ?)",
                AUDIT_TABLE
            ),
            Engine::Postgres => format!(
                "INSERT INTO public.{} (username, id, duration) VALUES ($1, $2, $3)",
                AUDIT_TABLE
            ),
            Engine::MySql => format!(
                "INSERT INTO {} (username, id, duration) VALUES (?, ?, ?)",
                AUDIT_TABLE
            ),
        }
    }
}

fn network_url(scheme: &str, instance: &InstanceConfig) -> String {
    let database = instance.database.as_deref().unwrap_or_default();
    match &instance.host {
        Some(host) => {
            let mut url = format!("{}://", scheme);
            if let Some(user) = &instance.user {
                url.push_str(user);
                url.push('@');
            }
            url.push_str(host);
            if let Some(port) = instance.port {
                url.push_str(&format!(":{}", port));
            }
            url.push('/');
            url.push_str(database);
            url
        }
        None => format!("{}:{}", scheme, database),
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network_instance(engine: Engine) -> InstanceConfig {
        let mut instance = InstanceConfig::duckdb("r1", "reporting", "unused");
        instance.engine = engine;
        instance.path = None;
        instance.host = Some("db.internal".to_string());
        instance.port = Some(5432);
        instance.database = Some("reports".to_string());
        instance.user = Some("migrator".to_string());
        instance.password = Some("secret".to_string());
        instance
    }

    #[test]
    fn test_urls() {
        let duck = InstanceConfig::duckdb("a", "app", "/data/app.duckdb");
        assert_eq!(Engine::DuckDb.url(&duck), "duckdb:/data/app.duckdb");

        let pg = network_instance(Engine::Postgres);
        assert_eq!(
            Engine::Postgres.url(&pg),
            "postgresql://migrator@db.internal:5432/reports"
        );
        assert!(!Engine::Postgres.url(&pg).contains("secret"));

        let mut my = network_instance(Engine::MySql);
        my.host = None;
        assert_eq!(Engine::MySql.url(&my), "mysql:reports");
    }

    #[test]
    fn test_default_schema() {
        let duck = InstanceConfig::duckdb("a", "app", "x");
        assert_eq!(Engine::DuckDb.default_schema(&duck).as_deref(), Some("main"));

        let my = network_instance(Engine::MySql);
        assert_eq!(Engine::MySql.default_schema(&my).as_deref(), Some("reports"));

        let mut pg = network_instance(Engine::Postgres);
        pg.schema = Some("audit".to_string());
        assert_eq!(Engine::Postgres.default_schema(&pg).as_deref(), Some("audit"));
    }

    #[test]
    fn test_mysql_has_no_schema_switch() {
        assert_eq!(Engine::MySql.set_schema_sql("x"), None);
        assert_eq!(
            Engine::Postgres.set_schema_sql("sales").as_deref(),
            Some("SET search_path TO \"sales\"")
        );
        assert_eq!(
            Engine::DuckDb.set_schema_sql("o'neil").as_deref(),
            Some("SET schema = 'o''neil'")
        );
    }

    #[test]
    fn test_isolation_support() {
        assert_eq!(Engine::DuckDb.isolation_sql(IsolationLevel::Serializable), None);
        assert_eq!(
            Engine::MySql
                .isolation_sql(IsolationLevel::ReadCommitted)
                .as_deref(),
            Some("SET SESSION TRANSACTION ISOLATION LEVEL READ COMMITTED")
        );
    }

    #[test]
    fn test_probe_placeholders_match_table_requirement() {
        for engine in [Engine::DuckDb, Engine::Postgres, Engine::MySql] {
            for kind in [
                CheckKind::Table,
                CheckKind::View,
                CheckKind::Column,
                CheckKind::Index,
                CheckKind::Sequence,
            ] {
                let Some(sql) = engine.catalog_probe_sql(kind) else {
                    continue;
                };
                let expected = if kind.requires_table() { 3 } else { 2 };
                let placeholders = match engine {
                    Engine::Postgres => sql.matches('$').count(),
                    _ => sql.matches('?').count(),
                };
                assert_eq!(placeholders, expected, "{} {}", engine, kind);
            }
        }
    }

    #[test]
    fn test_procedure_call() {
        assert_eq!(
            Engine::DuckDb.procedure_call_sql("backfill", &[1, 100]),
            "SELECT backfill(1, 100)"
        );
        assert_eq!(Engine::MySql.procedure_call_sql("fix", &[7]), "CALL fix(7)");
    }
}
