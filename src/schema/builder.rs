//! Per-table accumulator for schema inference.
//!
//! Rows are fed one at a time; column types and child relationships are
//! accumulated and the table schema is built once at the end.

use crate::schema::types::{ColumnSchema, ColumnType, TableSchema};
use crate::traverse::{child_table_name, classify, column_name, row_fields, FieldKind};
use serde_json::Value;
use std::collections::HashMap;

/// Rows collected for one child table across all sampled parent rows
#[derive(Debug)]
pub struct ChildRows<'a> {
    pub table: String,
    pub rows: Vec<&'a Value>,
}

/// Accumulates column types and child rows for a single table
#[derive(Debug)]
pub struct TableBuilder<'a> {
    name: String,
    // Column name -> widened type, in first-seen order
    columns: Vec<(String, ColumnType)>,
    column_index: HashMap<String, usize>,
    children: Vec<ChildRows<'a>>,
    child_index: HashMap<String, usize>,
    sample_count: usize,
}

impl<'a> TableBuilder<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        TableBuilder {
            name: name.into(),
            columns: Vec::new(),
            column_index: HashMap::new(),
            children: Vec::new(),
            child_index: HashMap::new(),
            sample_count: 0,
        }
    }

    /// Add one row, accumulating statistics
    pub fn add_row(&mut self, element: &'a Value) {
        self.sample_count += 1;

        for (key, value) in row_fields(element) {
            match classify(value) {
                FieldKind::Null => {}
                FieldKind::Scalar => {
                    if let Some(column_type) = ColumnType::of(value) {
                        self.add_column_sample(column_name(key), column_type);
                    }
                }
                FieldKind::Child(rows) => {
                    self.add_child_rows(child_table_name(&self.name, key), rows);
                }
            }
        }
    }

    fn add_column_sample(&mut self, name: String, column_type: ColumnType) {
        match self.column_index.get(&name) {
            Some(&idx) => {
                let current = &mut self.columns[idx].1;
                *current = current.widen(column_type);
            }
            None => {
                self.column_index.insert(name.clone(), self.columns.len());
                self.columns.push((name, column_type));
            }
        }
    }

    fn add_child_rows(&mut self, table: String, rows: Vec<&'a Value>) {
        match self.child_index.get(&table) {
            Some(&idx) => self.children[idx].rows.extend(rows),
            None => {
                self.child_index.insert(table.clone(), self.children.len());
                self.children.push(ChildRows { table, rows });
            }
        }
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Build the table schema and hand back the child tables to visit next
    pub fn build(self, parent: Option<&str>) -> (TableSchema, Vec<ChildRows<'a>>) {
        let mut columns = Vec::with_capacity(self.columns.len() + 2);
        columns.push(ColumnSchema::primary_key());

        if let Some(parent) = parent {
            columns.push(ColumnSchema::foreign_key(parent));
        }

        for (name, column_type) in self.columns {
            // The synthetic keys own their names; identifiers compare case-insensitively
            if columns.iter().any(|c| c.name.eq_ignore_ascii_case(&name)) {
                continue;
            }
            columns.push(ColumnSchema::data(name, column_type));
        }

        let table = TableSchema {
            name: self.name,
            columns,
            is_root: parent.is_none(),
        };

        (table, self.children)
    }
}
