use std::fmt;

use serde_json::Value;

use crate::errors::ExportError;

/// One fetched record, keyed by column key.
pub type Row = serde_json::Map<String, Value>;

/// Paged fetcher: `fetch(cursor, page_size)`; an empty batch signals no more data.
pub type FetchFn = Box<dyn FnMut(u64, u64) -> Result<Vec<Row>, ExportError> + Send>;

/// Where the rows come from.
pub enum Source {
    /// Fixed ordered rows, written value-by-value with no column-key filtering.
    Rows(Vec<Vec<Value>>),
    /// Lazy fetcher driven by the pagination loop.
    Paged(FetchFn),
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows(rows) => f.debug_tuple("Rows").field(&rows.len()).finish(),
            Self::Paged(_) => f.write_str("Paged(..)"),
        }
    }
}

/// Renders a JSON value as a CSV cell.
#[must_use]
pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
