use serde::{Deserialize, Serialize};

use crate::errors::ExportError;
use crate::source::{Row, Source};

/// Rows fetched per callback invocation unless overridden.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// Cursor is a page number: starts at 1, advances by 1 per fetch.
    Page,
    /// Cursor is a row offset: starts at 0, advances by `page_size` per fetch.
    Offset,
}

impl PaginationMode {
    #[must_use]
    pub const fn initial_cursor(self) -> u64 {
        match self {
            Self::Page => 1,
            Self::Offset => 0,
        }
    }

    #[must_use]
    pub const fn advance(self, cursor: u64, page_size: u64) -> u64 {
        match self {
            Self::Page => cursor + 1,
            Self::Offset => cursor + page_size,
        }
    }
}

/// One output column: `key` selects a field from fetched rows, `label` is the header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self { key: key.into(), label: label.into() }
    }
}

/// A fully configured export. Single-use: streaming consumes the job.
#[derive(Debug)]
pub struct ExportJob {
    pub columns: Vec<Column>,
    pub source: Source,
    pub mode: PaginationMode,
    pub page_size: u64,
    pub include_header: bool,
    pub file_name: String,
    /// Starting cursor; initialized lazily from `mode` when unset.
    pub cursor: Option<u64>,
}

impl ExportJob {
    #[must_use]
    pub fn builder() -> ExportJobBuilder {
        ExportJobBuilder::new()
    }
}

/// Builds an [`ExportJob`]. Setters are last-write-wins and order-independent.
#[derive(Debug)]
pub struct ExportJobBuilder {
    columns: Vec<Column>,
    source: Option<Source>,
    mode: PaginationMode,
    page_size: u64,
    include_header: bool,
    file_name: Option<String>,
    cursor: Option<u64>,
}

impl Default for ExportJobBuilder {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            source: None,
            mode: PaginationMode::Page,
            page_size: DEFAULT_PAGE_SIZE,
            include_header: true,
            file_name: None,
            cursor: None,
        }
    }
}

impl ExportJobBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one output column.
    #[must_use]
    pub fn column(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.columns.push(Column::new(key, label));
        self
    }

    /// Replaces the column set.
    #[must_use]
    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        self.columns = columns.into_iter().collect();
        self
    }

    /// Uses a fixed in-memory row set; values are emitted in the order given.
    #[must_use]
    pub fn rows(mut self, rows: Vec<Vec<serde_json::Value>>) -> Self {
        self.source = Some(Source::Rows(rows));
        self
    }

    /// Uses a paged fetch callback invoked as `fetch(cursor, page_size)`.
    #[must_use]
    pub fn fetch_with<F>(mut self, fetch: F) -> Self
    where
        F: FnMut(u64, u64) -> Result<Vec<Row>, ExportError> + Send + 'static,
    {
        self.source = Some(Source::Paged(Box::new(fetch)));
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: PaginationMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn include_header(mut self, include_header: bool) -> Self {
        self.include_header = include_header;
        self
    }

    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Overrides the starting cursor; by default it is derived from the mode.
    #[must_use]
    pub fn cursor(mut self, cursor: u64) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Finalizes the configuration.
    ///
    /// # Errors
    /// Returns `ExportError::Config` when no row source was supplied, when a
    /// paged source has no columns to select, or when `page_size` is zero.
    pub fn build(self) -> Result<ExportJob, ExportError> {
        let Some(source) = self.source else {
            return Err(ExportError::Config("no row source configured".to_string()));
        };
        if self.page_size == 0 {
            return Err(ExportError::Config("page_size must be at least 1".to_string()));
        }
        if matches!(source, Source::Paged(_)) && self.columns.is_empty() {
            return Err(ExportError::Config(
                "paged export requires at least one column".to_string(),
            ));
        }
        let file_name = self.file_name.unwrap_or_else(default_file_name);
        Ok(ExportJob {
            columns: self.columns,
            source,
            mode: self.mode,
            page_size: self.page_size,
            include_header: self.include_header,
            file_name,
            cursor: self.cursor,
        })
    }
}

fn default_file_name() -> String {
    chrono::Local::now().format("export_%Y-%m-%d_%H%M%S.csv").to_string()
}

/// Counters reported back after a completed export.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ExportReport {
    pub rows_written: u64,
    pub fetches: u64,
}
