//! Lookup tables derived from a `SchemaMap` once per flatten run

use crate::schema::{SchemaMap, TableSchema};
use std::collections::{HashMap, HashSet};

/// What the flattener needs to know about one table
#[derive(Debug, Clone)]
pub struct TablePlan {
    /// Foreign key column, if the table has a parent
    pub foreign_key: Option<String>,

    /// Columns that receive source fields
    pub data_columns: HashSet<String>,
}

impl TablePlan {
    fn from_table(table: &TableSchema) -> Self {
        TablePlan {
            foreign_key: table.foreign_key().map(|c| c.name.clone()),
            data_columns: table.data_columns().map(|c| c.name.clone()).collect(),
        }
    }

    pub fn accepts(&self, column: &str) -> bool {
        let shadows_key = self
            .foreign_key
            .as_deref()
            .is_some_and(|fk| fk.eq_ignore_ascii_case(column));
        !shadows_key && self.data_columns.contains(column)
    }
}

/// Pre-computed flatten plan for a whole schema
#[derive(Debug, Clone)]
pub struct MeltPlan {
    pub tables: HashMap<String, TablePlan>,

    /// Table the walk starts from
    pub entry_table: Option<String>,

    /// The entry table was elided by root-collapsing
    pub entry_collapsed: bool,
}

impl MeltPlan {
    pub fn from_schema(schema: &SchemaMap) -> Self {
        let tables = schema
            .tables
            .iter()
            .map(|t| (t.name.clone(), TablePlan::from_table(t)))
            .collect();

        MeltPlan {
            tables,
            entry_table: schema.entry_table().map(str::to_string),
            entry_collapsed: schema.root_collapsed,
        }
    }

    pub fn get_plan(&self, table: &str) -> Option<&TablePlan> {
        self.tables.get(table)
    }

    /// Whether rows for `table` should be walked at all
    pub fn is_walkable(&self, table: &str) -> bool {
        self.tables.contains_key(table) || self.is_collapsed_root(table)
    }

    pub fn is_collapsed_root(&self, table: &str) -> bool {
        self.entry_collapsed && self.entry_table.as_deref() == Some(table)
    }
}
