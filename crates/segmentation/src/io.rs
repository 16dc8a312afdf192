//! CSV and JSON-lines file helpers.

use launch_core::LaunchResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Read every row of a headered CSV file.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> LaunchResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Write `rows` under an explicit header line. The header is written even
/// when there are no rows, so an empty wing still imports cleanly.
pub fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> LaunchResult<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a warehouse export: one JSON document per line, or a single JSON
/// array. Blank lines are skipped.
pub fn read_json_lines(path: &Path) -> LaunchResult<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(&content)?);
    }
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(Into::into))
        .collect()
}
