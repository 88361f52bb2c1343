//! Row materialization against an inferred schema.

use crate::melt::plan::{MeltPlan, TablePlan};
use crate::schema::{SchemaMap, TableSchema};
use crate::traverse::{
    child_table_name, classify, column_name, root_rows, row_fields, FieldKind, WorkQueue,
    PRIMARY_KEY,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One row of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Synthetic key, 1-based and contiguous within the table
    pub id: i64,

    /// Synthetic key of the parent row
    pub parent_id: Option<i64>,

    /// Non-null scalar fields keyed by column name
    pub fields: Map<String, Value>,
}

impl Row {
    /// The row as a flat record keyed by the table's column names
    pub fn to_record(&self, table: &TableSchema) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert(PRIMARY_KEY.to_string(), Value::from(self.id));
        if let Some(fk) = table.foreign_key() {
            let parent = self.parent_id.map(Value::from).unwrap_or(Value::Null);
            record.insert(fk.name.clone(), parent);
        }
        for (name, value) in &self.fields {
            record.insert(name.clone(), value.clone());
        }
        record
    }
}

/// Rows per table name
pub type TableRows = HashMap<String, Vec<Row>>;

/// Per-run traversal state
struct FlattenState {
    counters: HashMap<String, i64>,
    rows: TableRows,
}

impl FlattenState {
    fn next_id(&mut self, table: &str) -> i64 {
        let counter = self.counters.entry(table.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}

/// Produces rows for every table of a schema from a matching document
pub struct Flattener {
    plan: MeltPlan,
}

impl Flattener {
    pub fn new(schema: &SchemaMap) -> Self {
        Flattener {
            plan: MeltPlan::from_schema(schema),
        }
    }

    /// Walk `document` in the same breadth-first order as schema inference and
    /// emit one row per table occurrence.
    ///
    /// Fields without a matching column and children without a matching table
    /// are dropped without error. Every schema table appears in the result,
    /// possibly with no rows.
    pub fn flatten(&self, document: &Value) -> TableRows {
        let mut state = FlattenState {
            counters: HashMap::new(),
            rows: self
                .plan
                .tables
                .keys()
                .map(|name| (name.clone(), Vec::new()))
                .collect(),
        };

        let (Some(entry), Some(root)) = (self.plan.entry_table.as_deref(), root_rows(document))
        else {
            return state.rows;
        };

        let mut queue: WorkQueue<'_, Option<i64>> = WorkQueue::new();
        queue.push(entry.to_string(), root.rows, None);

        while let Some(item) = queue.pop() {
            if let Some(table_plan) = self.plan.get_plan(&item.table) {
                for &element in &item.rows {
                    let id = state.next_id(&item.table);
                    let parent_id = table_plan.foreign_key.as_ref().and(item.parent);
                    let fields = self.split_fields(
                        &item.table,
                        element,
                        Some(table_plan),
                        Some(id),
                        &mut queue,
                    );
                    state
                        .rows
                        .entry(item.table.clone())
                        .or_default()
                        .push(Row { id, parent_id, fields });
                }
            } else if self.plan.is_collapsed_root(&item.table) {
                // No row for the elided root; its children start without a parent
                for &element in &item.rows {
                    self.split_fields(&item.table, element, None, None, &mut queue);
                }
            } else {
                tracing::trace!(table = %item.table, "Skipping table absent from schema");
            }
        }

        state.rows
    }

    /// Collect the scalar fields `plan` accepts and enqueue child tables
    fn split_fields<'a>(
        &self,
        table: &str,
        element: &'a Value,
        plan: Option<&TablePlan>,
        id: Option<i64>,
        queue: &mut WorkQueue<'a, Option<i64>>,
    ) -> Map<String, Value> {
        let mut fields = Map::new();

        for (key, value) in row_fields(element) {
            match classify(value) {
                FieldKind::Null => {}
                FieldKind::Scalar => {
                    let column = column_name(key);
                    match plan {
                        Some(plan) if plan.accepts(&column) => {
                            fields.insert(column, value.clone());
                        }
                        _ => tracing::trace!(%table, %column, "Dropping field absent from schema"),
                    }
                }
                FieldKind::Child(rows) => {
                    let child = child_table_name(table, key);
                    if self.plan.is_walkable(&child) {
                        queue.push(child, rows, id);
                    } else {
                        tracing::trace!(%table, %child, "Dropping child table absent from schema");
                    }
                }
            }
        }

        fields
    }
}

/// Flatten `document` against `schema`
pub fn flatten(schema: &SchemaMap, document: &Value) -> TableRows {
    Flattener::new(schema).flatten(document)
}
