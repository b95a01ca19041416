use crate::error::QueryError;

/// Hard row cap written into every search query.
pub const ROW_LIMIT: usize = 100;

/// Columns selected by a search, in result order.
pub const COLUMNS: [&str; 9] = [
    "timestamp",
    "machine_id",
    "error_code",
    "status",
    "message",
    "start_time",
    "end_time",
    "machine_runtime",
    "resolved",
];

/// Fields a search term is matched against (OR-combined).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Status,
    MachineId,
    ErrorCode,
    Timestamp,
}

impl MatchField {
    pub const ALL: [MatchField; 4] = [
        MatchField::Status,
        MatchField::MachineId,
        MatchField::ErrorCode,
        MatchField::Timestamp,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            MatchField::Status => "status",
            MatchField::MachineId => "machine_id",
            MatchField::ErrorCode => "error_code",
            MatchField::Timestamp => "timestamp",
        }
    }

    /// Filter clause for this field; `literal` must already be escaped.
    fn clause(&self, literal: &str) -> String {
        match self {
            MatchField::Timestamp => {
                format!("CAST({} AS VARCHAR) LIKE '%{literal}%'", self.column())
            }
            _ => format!("LOWER({}) LIKE '%{literal}%'", self.column()),
        }
    }
}

/// Escape a value for embedding inside a single-quoted SQL literal.
///
/// Only the quote delimiter is handled (`'` becomes `''`). `%` and `_` keep
/// their `LIKE` wildcard meaning. This doubling is the only protection the
/// templated filter has against injection; the query service offers no
/// parameter binding for it.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Case-insensitive substring search over the telemetry table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    table: String,
    keyword: String,
}

impl SearchQuery {
    /// Normalize `term` (trimmed, lowercased) into a query against `table`.
    ///
    /// Fails with [`QueryError::InvalidInput`] when nothing is left after trimming.
    pub fn new(table: impl Into<String>, term: &str) -> Result<Self, QueryError> {
        let keyword = term.trim();
        if keyword.is_empty() {
            return Err(QueryError::InvalidInput("keyword is required".into()));
        }
        Ok(Self {
            table: table.into(),
            keyword: keyword.to_lowercase(),
        })
    }

    /// Normalized, unescaped keyword.
    #[inline]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Render the query text submitted to the service.
    pub fn render(&self) -> String {
        let literal = escape_literal(&self.keyword);
        let filter = MatchField::ALL
            .iter()
            .map(|f| f.clause(&literal))
            .collect::<Vec<_>>()
            .join(" OR\n    ");

        format!(
            "SELECT\n    {}\nFROM {}\nWHERE\n    {}\nLIMIT {};",
            COLUMNS.join(",\n    "),
            self.table,
            filter,
            ROW_LIMIT
        )
    }

    /// Evaluate the filter locally with the same semantics the rendered text has.
    pub fn matches(&self, field: MatchField, value: &str) -> bool {
        match field {
            MatchField::Timestamp => value.contains(&self.keyword),
            _ => value.to_lowercase().contains(&self.keyword),
        }
    }

    /// `true` when any of the given field values matches.
    pub fn matches_any<'a>(&self, values: impl IntoIterator<Item = (MatchField, &'a str)>) -> bool {
        values.into_iter().any(|(field, value)| self.matches(field, value))
    }
}
