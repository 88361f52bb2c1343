use crate::traverse::{foreign_key_name, PRIMARY_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage type of a column.
///
/// Variants are ordered by width: a column that sees samples of two types
/// takes the wider one, so `Boolean < Integer < Float < Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Text,
}

impl ColumnType {
    /// Type of a scalar sample. Nulls, objects and arrays have none.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(_) => Some(ColumnType::Boolean),
            Value::Number(n) if n.is_i64() => Some(ColumnType::Integer),
            Value::Number(_) => Some(ColumnType::Float),
            Value::String(_) => Some(ColumnType::Text),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Join of two sample types
    pub fn widen(self, other: ColumnType) -> ColumnType {
        self.max(other)
    }

    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub column_type: ColumnType,

    #[serde(default)]
    pub is_primary_key: bool,

    #[serde(default)]
    pub is_foreign_key: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_table: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_column: Option<String>,
}

impl ColumnSchema {
    pub fn primary_key() -> Self {
        ColumnSchema {
            name: PRIMARY_KEY.to_string(),
            column_type: ColumnType::Integer,
            is_primary_key: true,
            is_foreign_key: false,
            foreign_table: None,
            foreign_column: None,
        }
    }

    /// `<parent>_id` referencing `parent.id`
    pub fn foreign_key(parent: &str) -> Self {
        ColumnSchema {
            name: foreign_key_name(parent),
            column_type: ColumnType::Integer,
            is_primary_key: false,
            is_foreign_key: true,
            foreign_table: Some(parent.to_string()),
            foreign_column: Some(PRIMARY_KEY.to_string()),
        }
    }

    pub fn data(name: impl Into<String>, column_type: ColumnType) -> Self {
        ColumnSchema {
            name: name.into(),
            column_type,
            is_primary_key: false,
            is_foreign_key: false,
            foreign_table: None,
            foreign_column: None,
        }
    }

    /// Neither the primary nor the foreign key
    pub fn is_data(&self) -> bool {
        !self.is_primary_key && !self.is_foreign_key
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,

    /// Primary key first, then the foreign key if any, then data columns
    pub columns: Vec<ColumnSchema>,

    #[serde(default)]
    pub is_root: bool,
}

impl TableSchema {
    pub fn foreign_key(&self) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.is_foreign_key)
    }

    /// Table referenced by this table's foreign key
    pub fn parent(&self) -> Option<&str> {
        self.foreign_key().and_then(|c| c.foreign_table.as_deref())
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn data_columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|c| c.is_data())
    }
}

/// The inferred relational schema of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMap {
    /// Tables in discovery order
    pub tables: Vec<TableSchema>,

    /// Sanitized name of the synthetic root table
    #[serde(default)]
    pub root_table: String,

    /// The root table was elided and its children promoted
    #[serde(default)]
    pub root_collapsed: bool,
}

impl SchemaMap {
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn roots(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.iter().filter(|t| t.is_root)
    }

    /// Name the flattener starts walking from.
    ///
    /// Schemas written by hand may omit `root_table`; the first root table is
    /// used then.
    pub fn entry_table(&self) -> Option<&str> {
        if !self.root_table.is_empty() {
            return Some(&self.root_table);
        }
        self.roots().next().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
