use std::sync::Arc;

use serde::{
    Deserialize, Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};

/// One positional row as returned by the query service; `None` marks a null cell.
pub type RawRow = Vec<Option<String>>;

/// Raw tabular response of a succeeded query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResults {
    /// Column names in the order declared by the service.
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Ordered mapping from column name to string value.
///
/// Rows of one [`ResultSet`] share a single column list, so every row has the
/// same keys in the same order. Serializes as a JSON object in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl ResultRow {
    /// Build a row over `columns`.
    ///
    /// Missing trailing values become empty strings and surplus values are dropped.
    pub fn new(columns: Arc<[String]>, mut values: Vec<String>) -> Self {
        values.resize(columns.len(), String::new());
        Self { columns, values }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i].as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys().zip(self.values())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Materialized rows of a succeeded query.
///
/// The row count is bounded by the query's own `LIMIT`, never truncated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    columns: Arc<[String]>,
    rows: Vec<ResultRow>,
}

impl ResultSet {
    pub fn new(columns: Arc<[String]>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row built from positional `values` over this set's columns.
    pub fn push(&mut self, values: Vec<String>) {
        self.rows
            .push(ResultRow::new(Arc::clone(&self.columns), values));
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}
