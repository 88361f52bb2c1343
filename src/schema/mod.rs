//! Relational schema inference
//!
//! Walks a JSON document and derives one table per distinct key path, with
//! synthetic integer keys linking children to their parents.

pub mod analyzer;
pub mod builder;
pub mod types;

pub use analyzer::{analyze, SchemaAnalyzer};
pub use builder::TableBuilder;
pub use types::{ColumnSchema, ColumnType, SchemaMap, TableSchema};
