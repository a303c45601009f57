//! Flattens job-order records into a table with a stable column order.
//!
//! Nested objects become dotted column names (`employer.address.city`).
//! Columns are the union across all records, sorted lexicographically, so an
//! export diffs cleanly between runs even when the API changes the order in
//! which it emits keys.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::fetch::RawRecord;

/// Separator used to join nested key paths.
pub const PATH_SEPARATOR: char = '.';

/// Tabular projection of a row set.
///
/// Missing fields are stored as [`Value::Null`] and render as empty cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl FlatTable {
    /// Column names in ascending order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in input order; each row has one cell per column.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there is nothing to write: no rows, or rows without any column.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Looks up a cell by row index and column name.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.columns.binary_search_by(|c| c.as_str().cmp(column)).ok()?;
        self.rows.get(row)?.get(index)
    }
}

/// Builds a [`FlatTable`] from records, one row per record.
///
/// The column set is computed from all records before any row is laid out.
#[must_use]
pub fn normalize(records: &[RawRecord]) -> FlatTable {
    if records.is_empty() {
        return FlatTable::default();
    }

    let flattened: Vec<BTreeMap<String, Value>> = records.iter().map(flatten_record).collect();

    let columns: Vec<String> = flattened
        .iter()
        .flat_map(BTreeMap::keys)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = flattened
        .into_iter()
        .map(|mut flat| {
            columns
                .iter()
                .map(|column| flat.remove(column).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    FlatTable { columns, rows }
}

/// Flattens one record into `path -> leaf value`.
///
/// Arrays and empty objects are leaves. When a literal dotted key collides
/// with a nested path, the later one in key order wins.
#[must_use]
pub fn flatten_record(record: &RawRecord) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    flatten_into(&mut out, None, record);
    out
}

fn flatten_into(out: &mut BTreeMap<String, Value>, prefix: Option<&str>, map: &Map<String, Value>) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_into(out, Some(&path), nested),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

/// Renders a cell for text formats: null is empty, strings are unquoted,
/// arrays and objects are compact JSON.
#[must_use]
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
