use crate::error::Result;
use crate::melt::flatten::{Row, TableRows};
use crate::schema::{SchemaMap, TableSchema};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes rows to JSON Lines files, one `<table>.jsonl` per table
pub struct TableWriter {
    output_dir: PathBuf,
    writers: HashMap<String, BufWriter<File>>,
}

impl TableWriter {
    /// Create a writer rooted at `output_dir`, creating the directory if needed
    pub fn new_file_writer<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        std::fs::create_dir_all(&output_dir)?;

        Ok(TableWriter {
            output_dir: output_dir.as_ref().to_path_buf(),
            writers: HashMap::new(),
        })
    }

    /// Write the rows of one table to its file.
    ///
    /// The file is truncated the first time this writer touches a table, so a
    /// rerun replaces earlier output; later calls append.
    pub fn write_table(&mut self, table: &TableSchema, rows: &[Row]) -> Result<()> {
        if !self.writers.contains_key(&table.name) {
            let path = self.output_dir.join(format!("{}.jsonl", table.name));
            let file = File::create(&path)?;
            self.writers.insert(table.name.clone(), BufWriter::new(file));
        }

        if let Some(writer) = self.writers.get_mut(&table.name) {
            for row in rows {
                serde_json::to_writer(&mut *writer, &row.to_record(table))?;
                writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    /// Write every table of `schema`, in schema order. Returns rows written per table.
    pub fn write_tables(&mut self, schema: &SchemaMap, rows: &TableRows) -> Result<Vec<(String, usize)>> {
        let mut written = Vec::with_capacity(schema.len());
        for table in &schema.tables {
            let table_rows = rows.get(&table.name).map(Vec::as_slice).unwrap_or(&[]);
            self.write_table(table, table_rows)?;
            written.push((table.name.clone(), table_rows.len()));
        }
        Ok(written)
    }

    /// Flush all writers
    pub fn flush(&mut self) -> Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::flatten;
    use crate::schema::analyze;
    use serde_json::{json, Value};

    #[test]
    fn test_writes_one_file_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let doc = json!([
            {"name": "Alice", "tags": ["a", "b"]},
            {"name": "Bob", "tags": ["c"]}
        ]);
        let schema = analyze(&doc, "users");
        let rows = flatten(&schema, &doc);

        let mut writer = TableWriter::new_file_writer(dir.path()).unwrap();
        let written = writer.write_tables(&schema, &rows).unwrap();
        writer.flush().unwrap();

        assert_eq!(
            written,
            vec![("users".to_string(), 2), ("users_tags".to_string(), 3)]
        );

        let tags = std::fs::read_to_string(dir.path().join("users_tags.jsonl")).unwrap();
        let lines: Vec<Value> = tags
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], json!({"id": 3, "users_id": 2, "Value": "c"}));
    }

    #[test]
    fn test_rerun_replaces_output() {
        let dir = tempfile::tempdir().unwrap();
        let doc = json!([{"a": 1}, {"a": 2}]);
        let schema = analyze(&doc, "Root");
        let rows = flatten(&schema, &doc);

        for _ in 0..2 {
            let mut writer = TableWriter::new_file_writer(dir.path()).unwrap();
            writer.write_tables(&schema, &rows).unwrap();
            writer.flush().unwrap();
        }

        let root = std::fs::read_to_string(dir.path().join("Root.jsonl")).unwrap();
        let lines: Vec<Value> = root
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines, vec![json!({"id": 1, "a": 1}), json!({"id": 2, "a": 2})]);
    }

    #[test]
    fn test_same_writer_appends_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let doc = json!([{"a": 1}]);
        let schema = analyze(&doc, "Root");
        let rows = flatten(&schema, &doc);
        let table = schema.table("Root").unwrap();

        let mut writer = TableWriter::new_file_writer(dir.path()).unwrap();
        writer.write_table(table, &rows["Root"]).unwrap();
        writer.write_table(table, &rows["Root"]).unwrap();
        writer.flush().unwrap();

        let root = std::fs::read_to_string(dir.path().join("Root.jsonl")).unwrap();
        assert_eq!(root.lines().count(), 2);
    }
}
