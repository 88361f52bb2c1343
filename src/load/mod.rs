//! Dependency-ordered, transactional loading into SQLite
//!
//! Every run drops and recreates the schema's tables, then inserts all rows,
//! inside one transaction. Any failure rolls the destination back to its
//! pre-run state.

pub mod connect;
pub mod ddl;
pub mod order;

pub use connect::{Connector, SqliteConnector};
pub use order::load_order;

use crate::config::LoadConfig;
use crate::error::{Error, Result};
use crate::melt::{Row, TableRows};
use crate::schema::{SchemaMap, TableSchema};
use rusqlite::{params_from_iter, Connection, Transaction};
use serde::Serialize;

/// Rows loaded into one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLoad {
    pub table: String,
    pub rows: usize,
}

/// Outcome of a successful load, tables in load order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub tables: Vec<TableLoad>,
}

impl LoadReport {
    pub fn rows_for(&self, table: &str) -> Option<usize> {
        self.tables.iter().find(|t| t.table == table).map(|t| t.rows)
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

pub struct Loader {
    config: LoadConfig,
}

impl Loader {
    pub fn new(config: LoadConfig) -> Self {
        Loader { config }
    }

    /// Connect through `connector` and load. Connection failures are returned
    /// as [`Error::Connection`] without retrying.
    pub fn load<C: Connector + ?Sized>(
        &self,
        connector: &C,
        descriptor: &str,
        schema: &SchemaMap,
        rows: &TableRows,
    ) -> Result<LoadReport> {
        let mut conn = connector.connect(descriptor).map_err(Error::Connection)?;
        self.load_into(&mut conn, schema, rows)
    }

    /// Recreate the schema's tables on `conn` and insert `rows`.
    ///
    /// Drops run in reverse load order, creates and inserts in load order, all
    /// in a single transaction.
    pub fn load_into(
        &self,
        conn: &mut Connection,
        schema: &SchemaMap,
        rows: &TableRows,
    ) -> Result<LoadReport> {
        let order = load_order(schema);
        let tx = conn.transaction()?;

        for table in order.iter().rev() {
            tx.execute(&ddl::drop_table(table), [])
                .map_err(|source| load_error(table, source))?;
        }

        for table in &order {
            tx.execute(&ddl::create_table(table), [])
                .map_err(|source| load_error(table, source))?;
        }

        let mut report = LoadReport::default();
        for table in &order {
            let table_rows = rows.get(&table.name).map(Vec::as_slice).unwrap_or(&[]);
            let inserted = self
                .insert_rows(&tx, table, table_rows)
                .map_err(|source| load_error(table, source))?;

            tracing::debug!(table = %table.name, rows = inserted, "Loaded table");
            report.tables.push(TableLoad {
                table: table.name.clone(),
                rows: inserted,
            });
        }

        tx.commit()?;

        tracing::info!(
            tables = report.tables.len(),
            rows = report.total_rows(),
            "Load committed"
        );
        Ok(report)
    }

    fn insert_rows(
        &self,
        tx: &Transaction<'_>,
        table: &TableSchema,
        rows: &[Row],
    ) -> rusqlite::Result<usize> {
        let per_statement = ddl::rows_per_statement(table, self.config.batch_size);

        for batch in rows.chunks(per_statement) {
            let mut stmt = tx.prepare_cached(&ddl::insert_rows(table, batch.len()))?;
            let params = batch.iter().flat_map(|row| ddl::row_params(table, row));
            stmt.execute(params_from_iter(params))?;
        }

        Ok(rows.len())
    }
}

fn load_error(table: &TableSchema, source: rusqlite::Error) -> Error {
    Error::Load {
        table: table.name.clone(),
        source,
    }
}

/// Load with the default configuration
pub fn load<C: Connector + ?Sized>(
    connector: &C,
    descriptor: &str,
    schema: &SchemaMap,
    rows: &TableRows,
) -> Result<LoadReport> {
    Loader::new(LoadConfig::default()).load(connector, descriptor, schema, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::flatten;
    use crate::schema::analyze;
    use serde_json::{json, Value};

    fn memory_db() -> Connection {
        SqliteConnector.connect(":memory:").unwrap()
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", ddl::quote_ident(table)),
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    fn table_exists(conn: &Connection, table: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            > 0
    }

    fn load_doc(conn: &mut Connection, doc: &Value, config: LoadConfig) -> Result<LoadReport> {
        let schema = analyze(doc, "Root");
        let rows = flatten(&schema, doc);
        Loader::new(config).load_into(conn, &schema, &rows)
    }

    #[test]
    fn test_load_flat_object() {
        let mut conn = memory_db();
        let report = load_doc(&mut conn, &json!({"sku": "A1", "qty": 2}), LoadConfig::default()).unwrap();

        assert_eq!(report.rows_for("Root"), Some(1));
        let (id, sku, qty): (i64, String, i64) = conn
            .query_row("SELECT id, sku, qty FROM Root", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!((id, sku.as_str(), qty), (1, "A1", 2));
    }

    #[test]
    fn test_load_child_field_shadowing_foreign_key() {
        let mut conn = memory_db();
        let doc = json!([{"a": 1, "kids": [{"root_id": 5, "n": "x"}]}, {"a": 2}]);
        let report = load_doc(&mut conn, &doc, LoadConfig::default()).unwrap();

        assert_eq!(report.rows_for("Root_kids"), Some(1));
        let (parent, n): (i64, String) = conn
            .query_row("SELECT Root_id, n FROM Root_kids", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!((parent, n.as_str()), (1, "x"));
    }

    #[test]
    fn test_load_nested_with_foreign_keys() {
        let mut conn = memory_db();
        let doc = json!([
            {"name": "Alice", "active": true, "posts": [{"title": "a1", "score": 1.5}, {"title": "a2"}]},
            {"name": "Bob", "active": false, "posts": [{"title": "b1", "score": 2}]}
        ]);
        let report = load_doc(&mut conn, &doc, LoadConfig::default()).unwrap();

        assert_eq!(
            report.tables,
            vec![
                TableLoad { table: "Root".to_string(), rows: 2 },
                TableLoad { table: "Root_posts".to_string(), rows: 3 },
            ]
        );
        assert_eq!(report.total_rows(), 5);

        let bob_posts: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM Root_posts p JOIN Root r ON p.Root_id = r.id WHERE r.name = 'Bob'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(bob_posts, 1);

        let fk_target: String = conn
            .query_row("SELECT \"table\" FROM pragma_foreign_key_list('Root_posts')", [], |r| r.get(0))
            .unwrap();
        assert_eq!(fk_target, "Root");
    }

    #[test]
    fn test_batches_cover_all_rows() {
        let mut conn = memory_db();
        let doc = Value::Array((0..1234).map(|i| json!({"n": i, "tags": [i, i + 1]})).collect());
        let report = load_doc(&mut conn, &doc, LoadConfig { batch_size: 500 }).unwrap();

        assert_eq!(report.rows_for("Root"), Some(1234));
        assert_eq!(report.rows_for("Root_tags"), Some(2468));
        assert_eq!(count(&conn, "Root"), 1234);
        assert_eq!(count(&conn, "Root_tags"), 2468);

        let max_id: i64 = conn.query_row("SELECT MAX(id) FROM Root", [], |r| r.get(0)).unwrap();
        assert_eq!(max_id, 1234);
    }

    #[test]
    fn test_rerun_replaces_tables() {
        let mut conn = memory_db();
        load_doc(&mut conn, &json!([{"a": 1}, {"a": 2}, {"a": 3}]), LoadConfig::default()).unwrap();
        load_doc(&mut conn, &json!([{"b": "x"}]), LoadConfig::default()).unwrap();

        assert_eq!(count(&conn, "Root"), 1);
        let columns: Vec<String> = conn
            .prepare("SELECT name FROM pragma_table_info('Root')")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(columns, vec!["id", "b"]);
    }

    #[test]
    fn test_failure_rolls_back() {
        let mut conn = memory_db();
        load_doc(&mut conn, &json!([{"a": 1}, {"a": 2}]), LoadConfig::default()).unwrap();

        // Duplicate keys make the insert fail after the drop and create succeeded
        let schema = analyze(&json!([{"b": 1}, {"b": 2}]), "Root");
        let mut rows = flatten(&schema, &json!([{"b": 1}, {"b": 2}]));
        if let Some(root_rows) = rows.get_mut("Root") {
            root_rows[1].id = 1;
        }

        let err = Loader::new(LoadConfig::default())
            .load_into(&mut conn, &schema, &rows)
            .unwrap_err();
        match err {
            Error::Load { table, .. } => assert_eq!(table, "Root"),
            other => panic!("Expected load error, got {:?}", other),
        }

        assert_eq!(count(&conn, "Root"), 2);
        let a_sum: i64 = conn.query_row("SELECT SUM(a) FROM Root", [], |r| r.get(0)).unwrap();
        assert_eq!(a_sum, 3);
    }

    #[test]
    fn test_keys_are_not_generated() {
        let mut conn = memory_db();
        load_doc(&mut conn, &json!([{"a": 1}]), LoadConfig::default()).unwrap();

        let result = conn.execute("INSERT INTO Root (a) VALUES (5)", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_connection_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("db.sqlite");
        let schema = analyze(&json!({"a": 1}), "Root");
        let rows = flatten(&schema, &json!({"a": 1}));

        let err = load(&SqliteConnector, path.to_str().unwrap(), &schema, &rows).unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_file_database_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sqlite");
        let descriptor = path.to_str().unwrap();

        let doc = json!({"tags": ["a", "b", "c"]});
        let schema = analyze(&doc, "Root");
        let rows = flatten(&schema, &doc);
        let report = load(&SqliteConnector, descriptor, &schema, &rows).unwrap();
        assert_eq!(report.rows_for("Root_tags"), Some(3));

        let conn = Connection::open(&path).unwrap();
        let values: Vec<String> = conn
            .prepare("SELECT Value FROM Root_tags ORDER BY id")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_schema_loads_nothing() {
        let mut conn = memory_db();
        let report = Loader::new(LoadConfig::default())
            .load_into(&mut conn, &SchemaMap::default(), &TableRows::new())
            .unwrap();
        assert_eq!(report, LoadReport::default());
        assert!(!table_exists(&conn, "Root"));
    }

    #[test]
    fn test_stale_child_table_is_dropped_first() {
        let mut conn = memory_db();
        let doc = json!([{"n": 1, "kids": [{"k": 1}]}, {"n": 2, "kids": [{"k": 2}]}]);
        load_doc(&mut conn, &doc, LoadConfig::default()).unwrap();
        load_doc(&mut conn, &doc, LoadConfig::default()).unwrap();

        assert!(table_exists(&conn, "Root_kids"));
        assert_eq!(count(&conn, "Root_kids"), 2);
    }
}
