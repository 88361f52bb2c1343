use crate::schema::{SchemaMap, TableSchema};
use std::collections::HashSet;

/// Order tables so that every table comes after the table its foreign key
/// references.
///
/// Tables are placed in repeated passes over the remaining set. A table is
/// ready when it has no foreign key, its parent is already placed, or its
/// parent is not part of the schema. If a pass places nothing the remaining
/// tables form a cycle and are appended in discovery order.
pub fn load_order(schema: &SchemaMap) -> Vec<&TableSchema> {
    let known: HashSet<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
    let mut placed: HashSet<&str> = HashSet::with_capacity(schema.len());
    let mut order: Vec<&TableSchema> = Vec::with_capacity(schema.len());
    let mut pending: Vec<&TableSchema> = schema.tables.iter().collect();

    while !pending.is_empty() {
        let before = pending.len();

        pending.retain(|&table| {
            let ready = match table.parent() {
                None => true,
                Some(parent) => placed.contains(parent) || !known.contains(parent),
            };
            if ready {
                placed.insert(table.name.as_str());
                order.push(table);
            }
            !ready
        });

        if pending.len() == before {
            tracing::warn!(
                tables = pending.len(),
                "Foreign key cycle, appending remaining tables in discovery order"
            );
            order.append(&mut pending);
        }
    }

    order
}
