use std::sync::Arc;

use mnt_model::{RawRow, ResultSet};

/// Zip positional rows against `columns` into named-field records.
///
/// Null or missing cells become empty strings. No type coercion happens;
/// every value stays a string. Output row count equals input row count.
pub fn materialize(columns: Vec<String>, rows: Vec<RawRow>) -> ResultSet {
    let columns: Arc<[String]> = columns.into();
    let width = columns.len();

    let mut set = ResultSet::new(columns);
    for row in rows {
        let mut cells = row.into_iter();
        let values = (0..width)
            .map(|_| cells.next().flatten().unwrap_or_default())
            .collect();
        set.push(values);
    }
    set
}
