//! JSON melting - turn a document into relational rows
//!
//! Rows are produced against an already inferred `SchemaMap`: each table
//! occurrence gets the next synthetic key of its table and children carry
//! their parent's key.

pub mod flatten;
pub mod plan;
pub mod writer;

pub use flatten::{flatten, Flattener, Row, TableRows};
pub use plan::{MeltPlan, TablePlan};
pub use writer::TableWriter;
