//! SQL text for recreating and filling tables (SQLite dialect)

use crate::melt::Row;
use crate::schema::{ColumnSchema, TableSchema};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

/// SQLite's default limit on bound parameters per statement
pub const MAX_BOUND_PARAMETERS: usize = 32766;

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn drop_table(table: &TableSchema) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(&table.name))
}

pub fn create_table(table: &TableSchema) -> String {
    let mut parts: Vec<String> = table.columns.iter().map(column_definition).collect();

    for column in table.columns.iter().filter(|c| c.is_foreign_key) {
        if let Some(parent) = &column.foreign_table {
            let parent_column = column.foreign_column.as_deref().unwrap_or("id");
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                quote_ident(&column.name),
                quote_ident(parent),
                quote_ident(parent_column)
            ));
        }
    }

    // WITHOUT ROWID: `id` is a plain NOT NULL key, never assigned by SQLite
    format!(
        "CREATE TABLE {} ({}) WITHOUT ROWID",
        quote_ident(&table.name),
        parts.join(", ")
    )
}

fn column_definition(column: &ColumnSchema) -> String {
    let name = quote_ident(&column.name);
    if column.is_primary_key {
        format!("{} INTEGER NOT NULL PRIMARY KEY", name)
    } else if column.is_foreign_key {
        format!("{} INTEGER", name)
    } else {
        format!("{} {}", name, column.column_type.sql_type())
    }
}

/// Multi-row INSERT covering every column of `table`
pub fn insert_rows(table: &TableSchema, row_count: usize) -> String {
    let columns: Vec<String> = table.columns.iter().map(|c| quote_ident(&c.name)).collect();
    let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
    let values = vec![placeholders.as_str(); row_count].join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(&table.name),
        columns.join(", "),
        values
    )
}

/// Rows per INSERT: the configured batch, capped by the bound parameter limit
pub fn rows_per_statement(table: &TableSchema, batch_size: usize) -> usize {
    let per_row = table.columns.len().max(1);
    batch_size.min(MAX_BOUND_PARAMETERS / per_row).max(1)
}

/// Parameters for one row, in column order
pub fn row_params(table: &TableSchema, row: &Row) -> Vec<SqlValue> {
    table
        .columns
        .iter()
        .map(|column| {
            if column.is_primary_key {
                SqlValue::Integer(row.id)
            } else if column.is_foreign_key {
                row.parent_id.map(SqlValue::Integer).unwrap_or(SqlValue::Null)
            } else {
                row.fields.get(&column.name).map(to_sql).unwrap_or(SqlValue::Null)
            }
        })
        .collect()
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}
