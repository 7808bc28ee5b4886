//! Driver results: rows, result sets and typed row mapping.

use crate::error::{DbError, DbResult};
use crate::value::Value;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A single result row.
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row. `columns` is shared between the rows of one result.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of the named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Value at a column index.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// The row as a JSON object keyed by column name.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| (column.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Deserialize the row into `T` (columns map to fields by name).
    pub fn to_typed<T: DeserializeOwned>(&self) -> DbResult<T> {
        serde_json::from_value(self.to_json()).map_err(|e| {
            let column = missing_field(&e.to_string()).unwrap_or("*").to_string();
            DbError::decode(column, e.to_string())
        })
    }
}

/// Extract `x` from serde's "missing field `x`" message.
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

/// Rows returned by a SELECT, with a cursor.
///
/// The cursor starts on the first row. [`get`](ResultSet::get) reads from the
/// current row; [`next_row`](ResultSet::next_row) returns the current row and
/// advances.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    rows: Vec<Row>,
    position: usize,
    cached: bool,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            position: 0,
            cached: false,
        }
    }

    /// A result set served from the result cache.
    pub fn cached(rows: Vec<Row>) -> Self {
        Self {
            cached: true,
            ..Self::new(rows)
        }
    }

    /// Whether these rows came from the result cache.
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_vec(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    // ==================== Cursor ====================

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The row under the cursor.
    pub fn current(&self) -> Option<&Row> {
        self.rows.get(self.position)
    }

    /// Move the cursor. Returns `false` (and leaves the cursor alone) when
    /// `position` is out of range.
    pub fn seek(&mut self, position: usize) -> bool {
        if position < self.rows.len() {
            self.position = position;
            true
        } else {
            false
        }
    }

    /// Return the current row and advance the cursor.
    pub fn next_row(&mut self) -> Option<&Row> {
        let index = self.position;
        if index < self.rows.len() {
            self.position += 1;
        }
        self.rows.get(index)
    }

    /// Move the cursor back to the first row.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Value of `column` in the current row.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.current().and_then(|row| row.get(column))
    }

    // ==================== Collections ====================

    /// All values of one column.
    pub fn column(&self, column: &str) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or_default())
            .collect()
    }

    /// Map `key` column to `value` column. Later rows overwrite earlier ones
    /// with the same key.
    pub fn as_map(&self, key: &str, value: &str) -> BTreeMap<String, Value> {
        self.rows
            .iter()
            .filter_map(|row| {
                let k = row.get(key).map(key_string)?;
                Some((k, row.get(value).cloned().unwrap_or_default()))
            })
            .collect()
    }

    /// Deserialize every row into `T`.
    pub fn rows_as<T: DeserializeOwned>(&self) -> DbResult<Vec<T>> {
        self.rows.iter().map(Row::to_typed).collect()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn key_string(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_json().to_string(),
    }
}

/// What a driver returns for an executed statement.
#[derive(Debug, Clone)]
pub enum QueryOutput {
    /// Rows of a SELECT.
    Rows(ResultSet),
    /// INSERT result. `insert_id` is `None` when the backend has no
    /// last-insert-id concept.
    Inserted {
        insert_id: Option<i64>,
        affected_rows: u64,
    },
    /// Affected row count of UPDATE, DELETE and other statements.
    Affected(u64),
}

impl QueryOutput {
    /// The result rows, or an error for statements that return none.
    pub fn into_rows(self) -> DbResult<ResultSet> {
        match self {
            QueryOutput::Rows(rows) => Ok(rows),
            other => Err(DbError::Other(format!(
                "statement returned no rows ({} affected)",
                other.affected_rows()
            ))),
        }
    }

    /// Affected row count; the row count for SELECT.
    pub fn affected_rows(&self) -> u64 {
        match self {
            QueryOutput::Rows(rows) => rows.len() as u64,
            QueryOutput::Inserted { affected_rows, .. } => *affected_rows,
            QueryOutput::Affected(n) => *n,
        }
    }

    pub fn insert_id(&self) -> Option<i64> {
        match self {
            QueryOutput::Inserted { insert_id, .. } => *insert_id,
            _ => None,
        }
    }
}
