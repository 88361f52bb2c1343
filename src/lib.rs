//! # Smelter - JSON to relational tables
//!
//! Infers a normalized relational schema from an arbitrary nested JSON
//! document, flattens the document into rows with synthetic keys, and loads
//! those rows into SQLite, recreating the tables on every run.
//!
//! ## Modules
//!
//! - **schema**: infer tables, columns and key relationships from a document
//! - **melt**: flatten a document into per-table rows against a schema
//! - **load**: recreate the tables and bulk-insert rows in one transaction
//!
//! ## Quick Start
//!
//! ```rust
//! use smelter::{analyze, flatten, Loader, LoadConfig};
//! use serde_json::json;
//!
//! # fn main() -> smelter::Result<()> {
//! let doc = json!([
//!     {"name": "Alice", "posts": [{"title": "First"}, {"title": "Second"}]},
//!     {"name": "Bob", "posts": [{"title": "Hello"}]}
//! ]);
//!
//! let schema = analyze(&doc, "users");
//! let rows = flatten(&schema, &doc);
//!
//! let mut conn = rusqlite::Connection::open_in_memory()?;
//! let report = Loader::new(LoadConfig::default()).load_into(&mut conn, &schema, &rows)?;
//!
//! assert_eq!(report.rows_for("users"), Some(2));
//! assert_eq!(report.rows_for("users_posts"), Some(3));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod load;
pub mod melt;
pub mod sanitize;
pub mod schema;
pub mod traverse;

pub use config::{InferConfig, LoadConfig};
pub use error::{Error, Result};
pub use load::{load, Connector, LoadReport, Loader, SqliteConnector, TableLoad};
pub use melt::{flatten, Flattener, Row, TableRows, TableWriter};
pub use sanitize::sanitize;
pub use schema::{analyze, ColumnSchema, ColumnType, SchemaAnalyzer, SchemaMap, TableSchema};

use serde_json::Value;

/// Run the whole pipeline: infer, flatten and load `document`
pub fn sync<C: Connector + ?Sized>(
    document: &Value,
    connector: &C,
    descriptor: &str,
    infer: InferConfig,
    load: LoadConfig,
) -> Result<(SchemaMap, LoadReport)> {
    let schema = SchemaAnalyzer::new(infer).analyze(document);
    let rows = flatten(&schema, document);
    let report = Loader::new(load).load(connector, descriptor, &schema, &rows)?;
    Ok((schema, report))
}
