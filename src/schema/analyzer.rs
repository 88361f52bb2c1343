use crate::config::InferConfig;
use crate::sanitize::sanitize;
use crate::schema::builder::TableBuilder;
use crate::schema::types::{SchemaMap, TableSchema};
use crate::traverse::{root_rows, WorkQueue};
use serde_json::Value;
use std::collections::HashSet;

/// Infers a relational schema from a JSON document
pub struct SchemaAnalyzer {
    config: InferConfig,
}

impl SchemaAnalyzer {
    pub fn new(config: InferConfig) -> Self {
        SchemaAnalyzer { config }
    }

    /// Walk `document` breadth-first and build one table per distinct key path.
    ///
    /// Each table name is analyzed once, on its first non-empty occurrence,
    /// from at most `sample_size` rows. When the document is a single object
    /// with nested children, its synthetic root table is dropped and the
    /// children become roots.
    pub fn analyze(&self, document: &Value) -> SchemaMap {
        let root_table = sanitize(&self.config.root_name);

        let Some(root) = root_rows(document) else {
            tracing::debug!("Document is a bare scalar, no tables inferred");
            return SchemaMap {
                tables: Vec::new(),
                root_table,
                root_collapsed: false,
            };
        };

        let mut queue: WorkQueue<'_, Option<String>> = WorkQueue::new();
        queue.push(root_table.clone(), root.rows, None);

        let mut processed: HashSet<String> = HashSet::new();
        let mut tables: Vec<TableSchema> = Vec::new();

        while let Some(item) = queue.pop() {
            if item.rows.is_empty() {
                continue;
            }
            if !processed.insert(item.table.clone()) {
                continue;
            }

            let mut builder = TableBuilder::new(item.table);
            for &element in item.rows.iter().take(self.config.sample_size) {
                builder.add_row(element);
            }

            let (table, children) = builder.build(item.parent.as_deref());
            tracing::debug!(
                table = %table.name,
                columns = table.columns.len(),
                children = children.len(),
                "Inferred table"
            );

            for child in children {
                queue.push(child.table, child.rows, Some(table.name.clone()));
            }
            tables.push(table);
        }

        let mut schema = SchemaMap {
            tables,
            root_table,
            root_collapsed: false,
        };

        if root.single_object {
            collapse_root(&mut schema);
        }

        schema
    }
}

/// Drop the synthetic root table and promote its direct children.
///
/// The root's own scalar fields are not kept anywhere. A root without child
/// tables is left alone, otherwise the schema would be empty.
fn collapse_root(schema: &mut SchemaMap) {
    let root = schema.root_table.clone();
    let has_children = schema
        .tables
        .iter()
        .any(|t| t.parent() == Some(root.as_str()));
    if !has_children {
        return;
    }

    if let Some(dropped) = schema.table(&root) {
        let lost = dropped.data_columns().count();
        if lost > 0 {
            tracing::debug!(table = %root, columns = lost, "Collapsed root drops its scalar columns");
        }
    }

    schema.tables.retain(|t| t.name != root);
    for table in schema.tables.iter_mut() {
        if table.parent() == Some(root.as_str()) {
            table.columns.retain(|c| !c.is_foreign_key);
            table.is_root = true;
        }
    }
    schema.root_collapsed = true;
}

/// Infer a schema with the given root label and default sampling
pub fn analyze(document: &Value, root_name: &str) -> SchemaMap {
    let config = InferConfig {
        root_name: root_name.to_string(),
        ..InferConfig::default()
    };
    SchemaAnalyzer::new(config).analyze(document)
}
