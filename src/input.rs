use crate::error::Result;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parse the JSON document stored at `path`.
///
/// SIMD parsing is tried first. It rewrites the buffer in place, so on
/// failure the file is read again and parsed with serde_json, whose error
/// carries line and column.
pub fn parse_file(path: &Path) -> Result<Value> {
    let mut content = std::fs::read(path)?;
    match simd_json::serde::from_slice::<Value>(&mut content) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::debug!(error = %err, "SIMD parse failed, retrying with serde_json");
            drop(content);
            let reader = BufReader::new(File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
    }
}

/// Parse a document from a stream that cannot be read twice
pub fn parse_reader<R: Read>(reader: R) -> Result<Value> {
    Ok(serde_json::from_reader(BufReader::new(reader))?)
}

/// Read a document from `path`, or from stdin when no path is given
pub fn read_document(path: Option<&Path>) -> Result<Value> {
    match path {
        Some(path) => parse_file(path),
        None => parse_reader(std::io::stdin().lock()),
    }
}
