//! Naming and value-classification rules shared by schema inference and row
//! flattening.
//!
//! Both passes walk the document breadth-first and must derive exactly the same
//! table and column names, otherwise rows silently miss their tables. Every
//! naming decision therefore lives here and nowhere else.

use crate::sanitize::sanitize;
use serde_json::Value;
use std::collections::VecDeque;

/// Name of the synthetic primary key column
pub const PRIMARY_KEY: &str = "id";

/// Column holding the elements of a list of scalars
pub const VALUE_COLUMN: &str = "Value";

/// Replacement name for a source field called `id`
pub const ORIGINAL_ID_COLUMN: &str = "original_id";

/// Table name for the child reached through `key` from `parent`.
pub fn child_table_name(parent: &str, key: &str) -> String {
    sanitize(&format!("{}_{}", parent, key))
}

/// Column name for a source field.
pub fn column_name(key: &str) -> String {
    if key.eq_ignore_ascii_case(PRIMARY_KEY) {
        ORIGINAL_ID_COLUMN.to_string()
    } else {
        sanitize(key)
    }
}

/// Foreign key column name in a child of `parent`.
pub fn foreign_key_name(parent: &str) -> String {
    sanitize(&format!("{}_{}", parent, PRIMARY_KEY))
}

/// How a field value is stored
#[derive(Debug)]
pub enum FieldKind<'a> {
    /// Omitted entirely
    Null,
    /// Stored in a column of the current table
    Scalar,
    /// Stored as rows of a child table, one row per element
    Child(Vec<&'a Value>),
}

/// Classify a field value. Objects become a single child row, lists one child
/// row per element.
pub fn classify(value: &Value) -> FieldKind<'_> {
    match value {
        Value::Null => FieldKind::Null,
        Value::Object(_) => FieldKind::Child(vec![value]),
        Value::Array(items) => FieldKind::Child(items.iter().collect()),
        _ => FieldKind::Scalar,
    }
}

/// Iterator over the `(key, value)` fields of one row.
///
/// Objects yield their own fields; any other element is presented as the
/// single field `Value`.
pub enum RowFields<'a> {
    Object(serde_json::map::Iter<'a>),
    Wrapped(Option<&'a Value>),
}

impl<'a> Iterator for RowFields<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RowFields::Object(iter) => iter.next().map(|(k, v)| (k.as_str(), v)),
            RowFields::Wrapped(value) => value.take().map(|v| (VALUE_COLUMN, v)),
        }
    }
}

pub fn row_fields(element: &Value) -> RowFields<'_> {
    match element {
        Value::Object(map) => RowFields::Object(map.iter()),
        other => RowFields::Wrapped(Some(other)),
    }
}

/// Rows of the root table
#[derive(Debug)]
pub struct RootRows<'a> {
    pub rows: Vec<&'a Value>,
    /// The document is one object (bare, or the only element of a list)
    pub single_object: bool,
}

/// Split the document into root rows. Scalars produce no rows at all.
pub fn root_rows(document: &Value) -> Option<RootRows<'_>> {
    match document {
        Value::Object(_) => Some(RootRows {
            rows: vec![document],
            single_object: true,
        }),
        Value::Array(items) => {
            let single_object = items.len() == 1 && items[0].is_object();
            Some(RootRows {
                rows: items.iter().collect(),
                single_object,
            })
        }
        _ => None,
    }
}

/// One pending table occurrence
#[derive(Debug)]
pub struct WorkItem<'a, P> {
    pub table: String,
    pub rows: Vec<&'a Value>,
    pub parent: P,
}

/// FIFO of pending table occurrences. Breadth-first order keeps stack usage
/// flat regardless of nesting depth.
#[derive(Debug)]
pub struct WorkQueue<'a, P> {
    items: VecDeque<WorkItem<'a, P>>,
}

impl<'a, P> WorkQueue<'a, P> {
    pub fn new() -> Self {
        WorkQueue {
            items: VecDeque::new(),
        }
    }

    pub fn push(&mut self, table: String, rows: Vec<&'a Value>, parent: P) {
        self.items.push_back(WorkItem { table, rows, parent });
    }

    pub fn pop(&mut self) -> Option<WorkItem<'a, P>> {
        self.items.pop_front()
    }
}

impl<'a, P> Default for WorkQueue<'a, P> {
    fn default() -> Self {
        Self::new()
    }
}
